use crate::Value;
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
        }
    }
}

/// A backend independent filter passed to `Collection::find`.
///
/// Adapters receive these through `PartialCollection::filter_conditions` and may
/// rewrite them into whatever shape their backend understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A bare identifier, as returned by an insert. Composite keys are a `Value::List`.
    Key(Value),
    Compare(Cow<'static, str>, CompareOp, Value),
    IsNull(Cow<'static, str>),
    IsNotNull(Cow<'static, str>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn equal(column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Condition::Compare(column.into(), CompareOp::Equal, value.into())
    }
    pub fn not_equal(column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Condition::Compare(column.into(), CompareOp::NotEqual, value.into())
    }
    pub fn less(column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Condition::Compare(column.into(), CompareOp::Less, value.into())
    }
    pub fn less_equal(column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Condition::Compare(column.into(), CompareOp::LessEqual, value.into())
    }
    pub fn greater(column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Condition::Compare(column.into(), CompareOp::Greater, value.into())
    }
    pub fn greater_equal(column: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Condition::Compare(column.into(), CompareOp::GreaterEqual, value.into())
    }
    pub fn key(value: impl Into<Value>) -> Self {
        Condition::Key(value.into())
    }

    /// Rewrites every value in place, used by adapters to normalize literals.
    pub fn map_values(self, f: &impl Fn(Value) -> Value) -> Self {
        match self {
            Condition::Key(v) => Condition::Key(f(v)),
            Condition::Compare(column, op, v) => Condition::Compare(column, op, f(v)),
            Condition::And(v) => Condition::And(v.into_iter().map(|c| c.map_values(f)).collect()),
            Condition::Or(v) => Condition::Or(v.into_iter().map(|c| c.map_values(f)).collect()),
            c => c,
        }
    }
}

/// Replaces every `Condition::Key` with equality checks on the primary key columns.
///
/// A single key column compares against the value directly, a composite key
/// expects a `Value::List` with one element per column. Keys that do not fit the
/// primary key are left untouched for the backend to reject.
pub fn resolve_primary_key(primary_keys: &[String], conditions: Vec<Condition>) -> Vec<Condition> {
    conditions
        .into_iter()
        .map(|condition| resolve_condition(primary_keys, condition))
        .collect()
}

fn resolve_condition(primary_keys: &[String], condition: Condition) -> Condition {
    match condition {
        Condition::Key(value) => match (primary_keys, value) {
            ([column], value) => Condition::equal(column.clone(), value),
            (columns, Value::List(Some(values)))
                if columns.len() > 1 && columns.len() == values.len() =>
            {
                Condition::And(
                    columns
                        .iter()
                        .zip(values)
                        .map(|(c, v)| Condition::equal(c.clone(), v))
                        .collect(),
                )
            }
            (_, value) => Condition::Key(value),
        },
        Condition::And(v) => Condition::And(resolve_primary_key(primary_keys, v)),
        Condition::Or(v) => Condition::Or(resolve_primary_key(primary_keys, v)),
        c => c,
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Key(v) => write!(f, "KEY = {}", v),
            Condition::Compare(column, op, v) => write!(f, "{} {} {}", column, op.as_sql(), v),
            Condition::IsNull(column) => write!(f, "{} IS NULL", column),
            Condition::IsNotNull(column) => write!(f, "{} IS NOT NULL", column),
            Condition::And(v) | Condition::Or(v) => {
                let separator = if matches!(self, Condition::And(..)) {
                    " AND "
                } else {
                    " OR "
                };
                f.write_str("(")?;
                for (i, c) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str(")")
            }
        }
    }
}
