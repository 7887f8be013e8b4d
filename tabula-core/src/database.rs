use crate::{
    Condition, Driver, PartialCollection, Result, RowLabeled, RowsAffected, Statement,
    Transaction, stream::Stream,
};
use std::future::Future;

/// A session on a backend, either plain or inside a transaction.
///
/// Collections borrow a `Database`, they never own it.
pub trait Database: Send + Sync + Sized {
    type Driver: Driver;
    /// The session type `begin` returns.
    type Transaction: Transaction<Driver = Self::Driver>;
    /// The adapter supplied part of a collection, scoped to this session.
    type Partial<'s>: PartialCollection<Database = Self> + 's
    where
        Self: 's;

    fn driver(&self) -> &Self::Driver;

    /// Adapter capability for the table `name`, bound to this session.
    fn collection(&self, name: &str) -> Self::Partial<'_>;

    /// Whether this session is already inside a transaction.
    fn in_transaction(&self) -> bool;

    /// Start a new transaction owned by the caller.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction>> + Send;

    /// Ordered primary key column names of `table`, empty when it has none.
    fn primary_keys(&self, table: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Succeeds if `table` exists.
    fn table_exists(&self, table: &str) -> impl Future<Output = Result<()>> + Send;

    /// Execute a schema or maintenance statement.
    fn exec(
        &self,
        statement: &Statement<'_>,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Rows of `table` matching all of `conditions`.
    fn select(
        &self,
        table: &str,
        conditions: &[Condition],
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send;
}
