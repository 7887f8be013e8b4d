use crate::{Result, RowLabeled, Value};

/// Named field access on a caller owned structured record.
///
/// This is what lets the collection copy column values into arbitrary structs
/// by name. Usually derived with `#[derive(Record)]`.
///
/// `Default` provides the zero valued instance a readback is decoded into, so
/// the caller's own instance is only touched once the row was read.
pub trait Record: Default + Send + Sync {
    /// Column names of the fields, in declaration order.
    fn field_names() -> &'static [&'static str];

    /// Current value of every field, keyed by column name.
    fn describe_fields(&self) -> Vec<(&'static str, Value)>;

    /// Assigns a single field by column name.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// Builds a record from a row, columns without a matching field are ignored.
    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized,
    {
        let mut result = Self::default();
        for (name, value) in row.labels.iter().zip(row.values.into_vec()) {
            if Self::field_names().iter().any(|v| *v == name.as_str()) {
                result.set_field(name, value)?;
            }
        }
        Ok(result)
    }
}
