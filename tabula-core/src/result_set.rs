use crate::{
    CollectionError, Condition, Database, Error, FieldMapper, Record, Result, RowLabeled,
    stream::{Stream, StreamExt, TryStreamExt},
};
use futures::future;
use std::{pin::pin, sync::Arc};

/// Rows of one table matching a set of conditions, created by `Collection::find`.
///
/// Nothing is read until one of the async methods is awaited.
pub struct ResultSet<'d, D: Database> {
    database: &'d D,
    table: String,
    conditions: Vec<Condition>,
    limit: Option<u32>,
    mapper: Arc<FieldMapper>,
}

impl<'d, D: Database> ResultSet<'d, D> {
    pub fn new(
        database: &'d D,
        table: impl Into<String>,
        conditions: Vec<Condition>,
        mapper: Arc<FieldMapper>,
    ) -> Self {
        Self {
            database,
            table: table.into(),
            conditions,
            limit: None,
            mapper,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Conditions as they will be sent, after the adapter filtered them.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn rows(&self) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.database
            .select(&self.table, &self.conditions, self.limit)
    }

    /// Decodes the first row into `target`.
    pub async fn one<R: Record + 'static>(&self, target: &mut R) -> Result<()> {
        let stream = pin!(self.database.select(&self.table, &self.conditions, Some(1)));
        let Some(row) = stream.into_future().await.0.transpose()? else {
            return Err(Error::new(CollectionError::NoMoreRows {
                table: self.table.clone(),
            }));
        };
        self.mapper.assign_row(target, row)
    }

    pub async fn all<R: Record + 'static>(&self) -> Result<Vec<R>> {
        self.rows()
            .and_then(|row| {
                let mut record = R::default();
                future::ready(self.mapper.assign_row(&mut record, row).map(|_| record))
            })
            .try_collect()
            .await
    }

    pub async fn count(&self) -> Result<u64> {
        self.rows()
            .try_fold(0, |count, _| future::ready(Ok(count + 1)))
            .await
    }
}
