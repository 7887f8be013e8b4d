use crate::evaluate;
use tabula_core::{
    ColumnDef, ColumnDefault, Condition, Error, Result, Row, RowLabeled, RowNames, TableDef,
    Value,
};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Rows and schema of one in-memory table.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    pub(crate) def: TableDef,
    labels: RowNames,
    rows: Vec<Row>,
    /// Next auto increment value, `None` once `i64::MAX` was used.
    sequence: Option<i64>,
}

impl Table {
    pub(crate) fn new(def: TableDef, sequence_start: i64) -> Self {
        let labels = def.columns.iter().map(|c| c.name.to_string()).collect();
        Self {
            def,
            labels,
            rows: Vec::new(),
            sequence: Some(sequence_start),
        }
    }

    /// Checks a table definition before it is created.
    pub(crate) fn validate(def: &TableDef) -> Result<()> {
        if def.columns.is_empty() {
            return Err(Error::msg(format!(
                "Table `{}` must have at least one column",
                def.name
            )));
        }
        for (i, column) in def.columns.iter().enumerate() {
            if def.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::msg(format!(
                    "Duplicate column `{}` in table `{}`",
                    column.name, def.name
                )));
            }
            if column.auto_increment && !matches!(column_type(column), Value::Int64(..)) {
                return Err(Error::msg(format!(
                    "Column `{}.{}` is auto increment but has type {}",
                    def.name,
                    column.name,
                    column.value.type_name()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn position(&self, column: &str) -> Result<usize> {
        self.def.column_position(column).ok_or_else(|| {
            Error::msg(format!(
                "Table `{}` has no column `{}`",
                self.def.name, column
            ))
        })
    }

    /// Removes every row, the auto increment sequence keeps going.
    pub(crate) fn clear(&mut self) -> u64 {
        let removed = self.rows.len() as u64;
        self.rows.clear();
        removed
    }

    /// Stores a new row and returns its primary key.
    ///
    /// Missing and null columns are filled from auto increment and defaults.
    /// Returns `None` when the table has no primary key, a `Value::List` when
    /// the key spans several columns.
    pub(crate) fn insert(&mut self, fields: Vec<(&str, Value)>) -> Result<Option<Value>> {
        let mut values: Vec<Option<Value>> = vec![None; self.def.columns.len()];
        for (name, value) in fields {
            let position = self.position(name)?;
            let column = &self.def.columns[position];
            let value = value.into_int64();
            if !value.is_null() && !value.same_type(&column_type(column)) {
                return Err(Error::msg(format!(
                    "Column `{}.{}` expects {}, got {}",
                    self.def.name,
                    column.name,
                    column.value.type_name(),
                    value.type_name()
                )));
            }
            values[position] = Some(value);
        }
        let mut row = Vec::with_capacity(values.len());
        let mut sequence = self.sequence;
        for (column, value) in self.def.columns.iter().zip(values) {
            let value = match value {
                Some(v) if !v.is_null() => {
                    if column.auto_increment
                        && let Value::Int64(Some(n)) = v
                        && let Some(next) = sequence
                        && n >= next
                    {
                        sequence = n.checked_add(1);
                    }
                    v
                }
                _ if column.auto_increment => {
                    let Some(next) = sequence else {
                        return Err(Error::msg(format!(
                            "database or disk is full: no auto increment value left for {}.{}",
                            self.def.name, column.name
                        )));
                    };
                    sequence = next.checked_add(1);
                    Value::Int64(Some(next))
                }
                _ => match &column.default {
                    Some(ColumnDefault::Value(v)) => v.clone().into_int64(),
                    Some(ColumnDefault::CurrentTimestamp) => current_timestamp(column),
                    None => column_type(column),
                },
            };
            if value.is_null() && !column.nullable {
                return Err(Error::msg(format!(
                    "NOT NULL constraint failed: {}.{}",
                    self.def.name, column.name
                )));
            }
            row.push(value);
        }
        let key = self.key_of(&row);
        if let Some(key) = &key
            && self.rows.iter().any(|r| self.key_of(r).as_ref() == Some(key))
        {
            return Err(Error::msg(format!(
                "UNIQUE constraint failed: {} ({})",
                self.def.name, key
            )));
        }
        self.sequence = sequence;
        self.rows.push(row.into());
        Ok(key)
    }

    fn key_of(&self, row: &[Value]) -> Option<Value> {
        let mut keys = self
            .def
            .columns
            .iter()
            .zip(row)
            .filter(|(c, _)| c.primary_key)
            .map(|(_, v)| v.clone())
            .collect::<Vec<_>>();
        match keys.len() {
            0 => None,
            1 => keys.pop(),
            _ => Some(Value::List(Some(keys))),
        }
    }

    pub(crate) fn select(
        &self,
        conditions: &[Condition],
        limit: Option<u32>,
    ) -> Result<Vec<RowLabeled>> {
        let mut result = Vec::new();
        for row in &self.rows {
            if limit.is_some_and(|limit| result.len() >= limit as usize) {
                break;
            }
            let mut matches = true;
            for condition in conditions {
                if !evaluate(self, row, condition)? {
                    matches = false;
                    break;
                }
            }
            if matches {
                result.push(RowLabeled::new(self.labels.clone(), row.clone()));
            }
        }
        Ok(result)
    }
}

/// The typed null of the column, integers widened to `Int64` as stored.
fn column_type(column: &ColumnDef) -> Value {
    column.value.clone().into_int64()
}

fn current_timestamp(column: &ColumnDef) -> Value {
    let now = OffsetDateTime::now_utc();
    match column.value {
        Value::Timestamp(..) => Value::Timestamp(Some(PrimitiveDateTime::new(now.date(), now.time()))),
        Value::Date(..) => Value::Date(Some(now.date())),
        _ => Value::TimestampWithTimezone(Some(now)),
    }
}
