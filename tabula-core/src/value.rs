use rust_decimal::Decimal;
use std::{
    cmp::Ordering,
    fmt::{self, Display},
};
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

/// Dynamically typed column value.
///
/// Every typed variant carries an `Option`: `None` is a null of that type, while
/// [`Value::Null`] is a null whose type is unknown.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    List(Option<Vec<Value>>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::List(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// Name of the variant, used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "BIGINT",
            Value::Float64(..) => "DOUBLE",
            Value::Decimal(..) => "DECIMAL",
            Value::Varchar(..) => "VARCHAR",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "DATE",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::TimestampWithTimezone(..) => "TIMESTAMP WITH TIME ZONE",
            Value::Uuid(..) => "UUID",
            Value::List(..) => "LIST",
        }
    }

    /// Widens the integer variants to `Int64`, leaves everything else untouched.
    pub fn into_int64(self) -> Value {
        match self {
            Value::Int32(v) => Value::Int64(v.map(Into::into)),
            Value::List(Some(values)) => {
                Value::List(Some(values.into_iter().map(Value::into_int64).collect()))
            }
            v => v,
        }
    }

    /// Compares two values of compatible types, nulls never compare.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (self, other) {
            (Value::Boolean(Some(l)), Value::Boolean(Some(r))) => l.partial_cmp(r),
            (Value::Int32(Some(l)), Value::Int32(Some(r))) => l.partial_cmp(r),
            (Value::Int64(Some(l)), Value::Int64(Some(r))) => l.partial_cmp(r),
            (Value::Int32(Some(l)), Value::Int64(Some(r))) => i64::from(*l).partial_cmp(r),
            (Value::Int64(Some(l)), Value::Int32(Some(r))) => l.partial_cmp(&i64::from(*r)),
            (Value::Float64(Some(l)), Value::Float64(Some(r))) => l.partial_cmp(r),
            (Value::Decimal(Some(l)), Value::Decimal(Some(r))) => l.partial_cmp(r),
            (Value::Varchar(Some(l)), Value::Varchar(Some(r))) => l.partial_cmp(r),
            (Value::Blob(Some(l)), Value::Blob(Some(r))) => l.partial_cmp(r),
            (Value::Date(Some(l)), Value::Date(Some(r))) => l.partial_cmp(r),
            (Value::Timestamp(Some(l)), Value::Timestamp(Some(r))) => l.partial_cmp(r),
            (Value::TimestampWithTimezone(Some(l)), Value::TimestampWithTimezone(Some(r))) => {
                l.partial_cmp(r)
            }
            (Value::Uuid(Some(l)), Value::Uuid(Some(r))) => l.partial_cmp(r),
            (Value::List(Some(l)), Value::List(Some(r))) => {
                for (l, r) in l.iter().zip(r.iter()) {
                    match l.compare(r)? {
                        Ordering::Equal => continue,
                        v => return Some(v),
                    }
                }
                l.len().partial_cmp(&r.len())
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::List(l), Self::List(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Decimal(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => write!(f, "'{}'", v),
            Value::Blob(Some(v)) => write!(f, "<{} bytes>", v.len()),
            Value::Date(Some(v)) => write!(f, "{}", v),
            Value::Timestamp(Some(v)) => write!(f, "{}", v),
            Value::TimestampWithTimezone(Some(v)) => write!(f, "{}", v),
            Value::Uuid(Some(v)) => write!(f, "{}", v),
            Value::List(Some(v)) => {
                f.write_str("[")?;
                for (i, v) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            _ => f.write_str("NULL"),
        }
    }
}
