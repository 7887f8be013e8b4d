use crate::{
    ColumnDef, ColumnDefault, Condition, Statement, TableDef, Value, separated_by,
};
use std::fmt::Write;
use time::{Date, Time};

/// Renders statements, conditions and values into SQL text.
///
/// Every method has a default implementation producing ANSI-ish SQL, dialects
/// override only the fragments that differ.
pub trait SqlWriter {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    fn write_column_type(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("VARCHAR"),
            Value::List(..) => out.push_str("VARCHAR[]"),
            v => out.push_str(v.type_name()),
        }
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        if value.is_null() {
            self.write_value_none(out);
            return;
        }
        match value {
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int32(Some(v)) => drop(write!(out, "{}", v)),
            Value::Int64(Some(v)) => drop(write!(out, "{}", v)),
            Value::Float64(Some(v)) => drop(write!(out, "{:?}", v)),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push('T');
                self.write_value_time(out, &v.time());
                out.push('\'');
            }
            Value::TimestampWithTimezone(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push('T');
                self.write_value_time(out, &v.time());
                let _ = write!(
                    out,
                    "{:+03}:{:02}",
                    v.offset().whole_hours(),
                    v.offset().minutes_past_hour().abs()
                );
                out.push('\'');
            }
            Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
            Value::List(Some(v)) => {
                out.push('[');
                separated_by(out, v, |out, v| self.write_value(out, v), ",");
                out.push(']');
            }
            _ => self.write_value_none(out),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL")
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize])
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push('\'');
        for b in value {
            let _ = write!(out, "\\x{:02X}", b);
        }
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second(),
        );
        let mut subsecond = value.nanosecond();
        if subsecond > 0 {
            let mut width = 9;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }

    /// Writes the condition, a `Condition::Key` still unresolved here is written as `KEY`.
    fn write_condition(&self, out: &mut String, condition: &Condition) {
        match condition {
            Condition::Key(v) => {
                out.push_str("KEY = ");
                self.write_value(out, v);
            }
            Condition::Compare(column, op, v) => {
                self.write_identifier_quoted(out, column);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                self.write_value(out, v);
            }
            Condition::IsNull(column) => {
                self.write_identifier_quoted(out, column);
                out.push_str(" IS NULL");
            }
            Condition::IsNotNull(column) => {
                self.write_identifier_quoted(out, column);
                out.push_str(" IS NOT NULL");
            }
            Condition::And(v) | Condition::Or(v) => {
                if v.is_empty() {
                    out.push_str(if matches!(condition, Condition::And(..)) {
                        "true"
                    } else {
                        "false"
                    });
                    return;
                }
                let separator = if matches!(condition, Condition::And(..)) {
                    " AND "
                } else {
                    " OR "
                };
                out.push('(');
                separated_by(out, v, |out, c| self.write_condition(out, c), separator);
                out.push(')');
            }
        }
    }

    fn write_conditions(&self, out: &mut String, conditions: &[Condition]) {
        if conditions.is_empty() {
            out.push_str("true");
            return;
        }
        separated_by(
            out,
            conditions,
            |out, c| self.write_condition(out, c),
            " AND ",
        );
    }

    fn write_create_table(&self, out: &mut String, table: &TableDef, if_not_exists: bool) {
        out.push_str("CREATE TABLE ");
        if if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        self.write_identifier_quoted(out, &table.name);
        out.push_str(" (\n");
        let primary_key = table.primary_keys().collect::<Vec<_>>();
        separated_by(
            out,
            &table.columns,
            |out, v| self.write_create_table_column_fragment(out, v, primary_key.len() == 1),
            ",\n",
        );
        if primary_key.len() > 1 {
            out.push_str(",\nPRIMARY KEY (");
            separated_by(
                out,
                primary_key,
                |out, v| self.write_identifier_quoted(out, v),
                ", ",
            );
            out.push(')');
        }
        out.push_str("\n);");
    }

    fn write_create_table_column_fragment(
        &self,
        out: &mut String,
        column: &ColumnDef,
        single_primary_key: bool,
    ) {
        self.write_identifier_quoted(out, &column.name);
        out.push(' ');
        self.write_column_type(out, &column.value);
        if !column.nullable && !column.primary_key {
            out.push_str(" NOT NULL");
        }
        match &column.default {
            Some(ColumnDefault::Value(v)) => {
                out.push_str(" DEFAULT ");
                self.write_value(out, v);
            }
            Some(ColumnDefault::CurrentTimestamp) => out.push_str(" DEFAULT CURRENT_TIMESTAMP"),
            None => {}
        }
        if column.auto_increment {
            self.write_auto_increment(out);
        }
        if column.primary_key && single_primary_key {
            // Composite primary key will be printed elsewhere
            out.push_str(" PRIMARY KEY");
        }
    }

    fn write_auto_increment(&self, out: &mut String) {
        out.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }

    fn write_drop_table(&self, out: &mut String, name: &str, if_exists: bool) {
        out.push_str("DROP TABLE ");
        if if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_identifier_quoted(out, name);
        out.push(';');
    }

    fn write_truncate(&self, out: &mut String, name: &str) {
        out.push_str("TRUNCATE TABLE ");
        self.write_identifier_quoted(out, name);
        out.push(';');
    }

    fn write_statement(&self, out: &mut String, statement: &Statement<'_>) {
        match statement {
            Statement::CreateTable {
                table,
                if_not_exists,
            } => self.write_create_table(out, table, *if_not_exists),
            Statement::DropTable { name, if_exists } => {
                self.write_drop_table(out, name, *if_exists)
            }
            Statement::Truncate { name } => self.write_truncate(out, name),
        }
    }

    fn write_select(
        &self,
        out: &mut String,
        table: &str,
        conditions: &[Condition],
        limit: Option<u32>,
    ) {
        out.push_str("SELECT *\nFROM ");
        self.write_identifier_quoted(out, table);
        out.push_str("\nWHERE ");
        self.write_conditions(out, conditions);
        if let Some(limit) = limit {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
        out.push(';');
    }

    fn write_insert(&self, out: &mut String, table: &str, row: &[(&str, Value)]) {
        out.push_str("INSERT INTO ");
        self.write_identifier_quoted(out, table);
        if row.is_empty() {
            out.push_str(" DEFAULT VALUES;");
            return;
        }
        out.push_str(" (");
        separated_by(
            out,
            row,
            |out, (name, _)| self.write_identifier_quoted(out, name),
            ", ",
        );
        out.push_str(") VALUES (");
        separated_by(out, row, |out, (_, value)| self.write_value(out, value), ", ");
        out.push_str(");");
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN;");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT;");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK;");
    }
}

#[derive(Default)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {}
