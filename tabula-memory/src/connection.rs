use crate::{
    MemoryCollection, MemoryConfig, MemoryDriver, MemorySqlWriter, Operation, Stats, Table,
    stats::Instrumentation,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tabula_core::{
    Collection, Condition, Connection, Database, Driver, Error, Result, RowLabeled,
    RowsAffected, SqlWriter, Statement, Value,
    stream::{self, Stream},
    truncate_long,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub(crate) type Tables = BTreeMap<String, Table>;

pub(crate) struct Shared {
    config: MemoryConfig,
    tables: Mutex<Tables>,
    /// Held by the open transaction, autocommit writes need it briefly.
    gate: Arc<AsyncMutex<()>>,
    instrumentation: Instrumentation,
}

pub(crate) struct OpenTransaction {
    pub(crate) tables: Mutex<Tables>,
    pub(crate) gate: OwnedMutexGuard<()>,
}

/// A session on an in-memory database.
///
/// Sessions created with [`MemoryDatabase::new_session`] share the same tables.
/// A session returned by `begin` works on a private snapshot until it commits.
/// While a transaction is open, writes and `begin` from any other session fail
/// with "database is locked", reads see the last committed state.
pub struct MemoryDatabase {
    pub(crate) shared: Arc<Shared>,
    pub(crate) transaction: Option<OpenTransaction>,
}

impl MemoryDatabase {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                tables: Default::default(),
                gate: Default::default(),
                instrumentation: Default::default(),
            }),
            transaction: None,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.shared.config
    }

    /// Another session on the same tables, outside of any transaction.
    pub fn new_session(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            transaction: None,
        }
    }

    /// Shared collection behavior over `name`, bound to this session.
    pub async fn table(&self, name: &str) -> Collection<MemoryCollection<'_>> {
        Collection::new(self.collection(name)).await
    }

    /// Calls received so far by all the sessions of this database.
    pub fn stats(&self) -> Stats {
        self.shared.instrumentation.snapshot()
    }

    pub fn reset_stats(&self) {
        self.shared.instrumentation.reset()
    }

    /// Makes the next call of `operation`, from any session, fail with `message`.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        self.shared
            .instrumentation
            .fail_next(operation, message.into())
    }

    pub(crate) fn record(&self, operation: Operation) -> Result<()> {
        self.shared.instrumentation.record(operation)
    }

    pub(crate) fn publish(&self, tables: Tables) -> Result<()> {
        *lock(&self.shared.tables)? = tables;
        Ok(())
    }

    pub(crate) fn log_sql(&self, write: impl FnOnce(&MemorySqlWriter, &mut String)) {
        if log::log_enabled!(log::Level::Debug) {
            let mut out = String::new();
            write(&self.driver().sql_writer(), &mut out);
            log::debug!("[{}] {}", self.shared.config.name, truncate_long(&out));
        }
    }

    fn locked(&self) -> Error {
        let error = Error::msg("database is locked").context(format!(
            "A transaction is open on the memory database `{}`",
            self.shared.config.name
        ));
        log::error!("{:#}", error);
        error
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> Result<T>) -> Result<T> {
        match &self.transaction {
            Some(transaction) => f(&*lock(&transaction.tables)?),
            None => f(&*lock(&self.shared.tables)?),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        if let Some(transaction) = &self.transaction {
            return f(&mut *lock(&transaction.tables)?);
        }
        let Ok(_gate) = self.shared.gate.try_lock() else {
            return Err(self.locked());
        };
        f(&mut *lock(&self.shared.tables)?)
    }

    pub(crate) fn insert_row(
        &self,
        table: &str,
        fields: Vec<(&'static str, Value)>,
    ) -> Result<Option<Value>> {
        self.record(Operation::Insert)?;
        self.log_sql(|writer, out| writer.write_insert(out, table, &fields));
        self.write(|tables| find_mut(tables, table)?.insert(fields))
            .inspect_err(|e| log::error!("{:#}", e))
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::msg("The memory database was poisoned by a panicking thread"))
}

fn no_such_table(name: &str) -> Error {
    Error::msg(format!("no such table: {}", name))
}

fn find<'t>(tables: &'t Tables, name: &str) -> Result<&'t Table> {
    tables.get(name).ok_or_else(|| no_such_table(name))
}

fn find_mut<'t>(tables: &'t mut Tables, name: &str) -> Result<&'t mut Table> {
    tables.get_mut(name).ok_or_else(|| no_such_table(name))
}

impl Database for MemoryDatabase {
    type Driver = MemoryDriver;
    type Transaction = MemoryDatabase;
    type Partial<'s>
        = MemoryCollection<'s>
    where
        Self: 's;

    fn driver(&self) -> &Self::Driver {
        &MemoryDriver {}
    }

    fn collection(&self, name: &str) -> Self::Partial<'_> {
        MemoryCollection::new(self, name)
    }

    fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    async fn begin(&self) -> Result<MemoryDatabase> {
        self.record(Operation::Begin)?;
        if self.transaction.is_some() {
            let error = Error::msg("Nested transactions are not supported by the memory database");
            log::error!("{:#}", error);
            return Err(error);
        }
        let Ok(gate) = self.shared.gate.clone().try_lock_owned() else {
            return Err(self.locked());
        };
        let tables = lock(&self.shared.tables)?.clone();
        self.log_sql(|writer, out| writer.write_transaction_begin(out));
        Ok(MemoryDatabase {
            shared: self.shared.clone(),
            transaction: Some(OpenTransaction {
                tables: Mutex::new(tables),
                gate,
            }),
        })
    }

    async fn primary_keys(&self, table: &str) -> Result<Vec<String>> {
        self.record(Operation::PrimaryKeys)?;
        self.read(|tables| {
            Ok(find(tables, table)?
                .def
                .primary_keys()
                .map(String::from)
                .collect())
        })
    }

    async fn table_exists(&self, table: &str) -> Result<()> {
        self.record(Operation::TableExists)?;
        self.read(|tables| find(tables, table).map(|_| ()))
    }

    async fn exec(&self, statement: &Statement<'_>) -> Result<RowsAffected> {
        self.record(Operation::Exec)?;
        self.log_sql(|writer, out| writer.write_statement(out, statement));
        let sequence_start = self.shared.config.sequence_start;
        self.write(|tables| match *statement {
            Statement::CreateTable {
                table,
                if_not_exists,
            } => {
                if tables.contains_key(table.name.as_ref()) {
                    if if_not_exists {
                        return Ok(RowsAffected::default());
                    }
                    return Err(Error::msg(format!("table {} already exists", table.name)));
                }
                Table::validate(table)?;
                tables.insert(
                    table.name.to_string(),
                    Table::new(table.clone(), sequence_start),
                );
                Ok(RowsAffected::default())
            }
            Statement::DropTable { name, if_exists } => {
                if tables.remove(name).is_none() && !if_exists {
                    return Err(no_such_table(name));
                }
                Ok(RowsAffected::default())
            }
            Statement::Truncate { name } => Ok(RowsAffected {
                rows_affected: find_mut(tables, name)?.clear(),
            }),
        })
        .inspect_err(|e| log::error!("{:#}", e))
    }

    fn select(
        &self,
        table: &str,
        conditions: &[Condition],
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        let rows = self.record(Operation::Select).and_then(|_| {
            self.log_sql(|writer, out| writer.write_select(out, table, conditions, limit));
            self.read(|tables| find(tables, table)?.select(conditions, limit))
        });
        let rows = match rows {
            Ok(rows) => rows.into_iter().map(Ok).collect(),
            Err(error) => {
                log::error!("{:#}", error);
                vec![Err(error)]
            }
        };
        stream::iter(rows)
    }
}

impl Connection for MemoryDatabase {
    async fn connect(url: &str) -> Result<MemoryDatabase> {
        let config = MemoryConfig::from_url(url)?;
        log::debug!("Opening the memory database `{}`", config.name);
        Ok(MemoryDatabase::new(config))
    }
}
