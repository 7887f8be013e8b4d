use crate::Table;
use std::cmp::Ordering;
use tabula_core::{CompareOp, Condition, Error, Result, Value};

/// Whether `row` of `table` satisfies `condition`. Comparisons involving a null are false.
pub(crate) fn evaluate(table: &Table, row: &[Value], condition: &Condition) -> Result<bool> {
    Ok(match condition {
        Condition::Key(value) => {
            return Err(Error::msg(format!(
                "Cannot match key {} against the primary key of `{}`",
                value, table.def.name
            )));
        }
        Condition::Compare(column, op, value) => {
            let current = &row[table.position(column)?];
            let value = value.clone().into_int64();
            match current.compare(&value) {
                Some(ordering) => match op {
                    CompareOp::Equal => ordering == Ordering::Equal,
                    CompareOp::NotEqual => ordering != Ordering::Equal,
                    CompareOp::Less => ordering == Ordering::Less,
                    CompareOp::LessEqual => ordering != Ordering::Greater,
                    CompareOp::Greater => ordering == Ordering::Greater,
                    CompareOp::GreaterEqual => ordering != Ordering::Less,
                },
                None => false,
            }
        }
        Condition::IsNull(column) => row[table.position(column)?].is_null(),
        Condition::IsNotNull(column) => !row[table.position(column)?].is_null(),
        Condition::And(conditions) => {
            for condition in conditions {
                if !evaluate(table, row, condition)? {
                    return Ok(false);
                }
            }
            true
        }
        Condition::Or(conditions) => {
            for condition in conditions {
                if evaluate(table, row, condition)? {
                    return Ok(true);
                }
            }
            false
        }
    })
}
