use crate::{GenericSqlWriter, SqlWriter, TableDef};
use std::fmt::{self, Display};

/// Schema and maintenance statements issued through `Database::exec`.
///
/// Backends speaking SQL render it with their [`SqlWriter`], other backends
/// interpret it directly.
#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    CreateTable {
        table: &'a TableDef,
        if_not_exists: bool,
    },
    DropTable {
        name: &'a str,
        if_exists: bool,
    },
    Truncate {
        name: &'a str,
    },
}

impl Statement<'_> {
    /// Name of the table the statement targets.
    pub fn table_name(&self) -> &str {
        match self {
            Statement::CreateTable { table, .. } => table.name.as_ref(),
            Statement::DropTable { name, .. } | Statement::Truncate { name } => *name,
        }
    }
}

impl Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        GenericSqlWriter::new().write_statement(&mut out, self);
        f.write_str(&out)
    }
}
