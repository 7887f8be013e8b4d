use crate::{
    CollectionError, Condition, Database, Error, FieldMapper, Record, Result, ResultSet,
    Statement, Transaction, Value,
};
use std::{any, future::Future, ops::Deref, sync::Arc};

/// The part of a collection each adapter implements.
pub trait PartialCollection: Send + Sync {
    type Database: Database;

    /// The session this collection is bound to.
    fn database(&self) -> &Self::Database;

    /// Name of the table.
    fn name(&self) -> &str;

    /// Translates generic conditions into the shape the backend understands.
    ///
    /// `primary_keys` are the table's cached primary key columns, used to resolve
    /// `Condition::Key` (see [`crate::resolve_primary_key`]).
    fn filter_conditions(&self, primary_keys: &[String], conditions: Vec<Condition>)
    -> Vec<Condition>;

    /// Inserts one row and returns its identifier, `None` when the backend has
    /// no identifier to give (typically a table without a primary key).
    fn insert<R: Record>(&self, item: &R) -> impl Future<Output = Result<Option<Value>>> + Send;
}

/// A table handle: wraps the adapter's [`PartialCollection`] and adds the
/// behavior shared by every backend.
///
/// Derefs to the wrapped adapter, so its own methods stay reachable.
pub struct Collection<P: PartialCollection> {
    partial: P,
    primary_keys: Arc<[String]>,
    mapper: Arc<FieldMapper>,
}

impl<P: PartialCollection> Collection<P> {
    /// Wraps the adapter capability and caches the table's primary keys.
    pub async fn new(partial: P) -> Self {
        Self::with_mapper(partial, Default::default()).await
    }

    /// Like `new`, sharing an existing field mapper.
    pub async fn with_mapper(partial: P, mapper: Arc<FieldMapper>) -> Self {
        let primary_keys = match partial.database().primary_keys(partial.name()).await {
            Ok(v) => v.into(),
            Err(e) => {
                // A table that does not exist yet still gets a collection
                log::warn!(
                    "Could not get the primary keys of `{}`: {:#}",
                    partial.name(),
                    e
                );
                Vec::new().into()
            }
        };
        Self {
            partial,
            primary_keys,
            mapper,
        }
    }

    /// Primary key columns, looked up once when the collection was created.
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn mapper(&self) -> &Arc<FieldMapper> {
        &self.mapper
    }

    pub fn find(
        &self,
        conditions: impl IntoIterator<Item = Condition>,
    ) -> ResultSet<'_, P::Database> {
        let conditions = self
            .partial
            .filter_conditions(&self.primary_keys, conditions.into_iter().collect());
        ResultSet::new(
            self.partial.database(),
            self.partial.name(),
            conditions,
            self.mapper.clone(),
        )
    }

    /// Whether the table exists. A failing lookup counts as "does not exist".
    pub async fn exists(&self) -> bool {
        match self
            .partial
            .database()
            .table_exists(self.partial.name())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Table `{}` does not exist: {:#}", self.partial.name(), e);
                false
            }
        }
    }

    pub async fn truncate(&self) -> Result<()> {
        self.partial
            .database()
            .exec(&Statement::Truncate {
                name: self.partial.name(),
            })
            .await
            .map(|_| ())
    }

    /// Inserts `item` and updates it with the row as stored by the database,
    /// including generated keys and column defaults.
    ///
    /// Runs inside the session's transaction when there is one, leaving commit
    /// and rollback to its owner. Otherwise a transaction is opened, committed
    /// on success and rolled back on failure. `item` is modified only when the
    /// whole operation succeeds.
    pub async fn insert_returning<R: Record + 'static>(&self, item: &mut R) -> Result<()> {
        if R::field_names().is_empty() {
            let error = Error::new(CollectionError::InvalidArgument {
                type_name: any::type_name::<R>(),
            });
            log::error!("{:#}", error);
            return Err(error);
        }
        let database = self.partial.database();
        if database.in_transaction() {
            let stored = self.insert_and_read_back(database, item).await?;
            return self.mapper.merge(item, &stored);
        }
        let transaction = database.begin().await?;
        log::debug!("Transaction started to insert into `{}`", self.partial.name());
        match self.insert_and_read_back(&transaction, item).await {
            Ok(stored) => {
                transaction.commit().await.inspect_err(|e| {
                    log::error!(
                        "Could not commit the insert into `{}`: {:#}",
                        self.partial.name(),
                        e
                    )
                })?;
                self.mapper.merge(item, &stored)
            }
            Err(error) => {
                if let Err(e) = transaction.rollback().await {
                    log::error!(
                        "Could not roll back the insert into `{}`: {:#}",
                        self.partial.name(),
                        e
                    );
                }
                Err(error)
            }
        }
    }

    /// Inserts through `session` and reads the new row back into a fresh record.
    async fn insert_and_read_back<D: Database, R: Record + 'static>(
        &self,
        session: &D,
        item: &R,
    ) -> Result<R> {
        let collection = session.collection(self.partial.name());
        let Some(id) = collection.insert(item).await? else {
            let error = Error::new(CollectionError::MissingKey {
                table: self.partial.name().into(),
            });
            log::error!("{:#}", error);
            return Err(error);
        };
        let mut stored = R::default();
        let conditions = collection.filter_conditions(&self.primary_keys, vec![Condition::Key(id)]);
        ResultSet::new(session, collection.name(), conditions, self.mapper.clone())
            .one(&mut stored)
            .await?;
        Ok(stored)
    }
}

impl<P: PartialCollection> Deref for Collection<P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.partial
    }
}
