use crate::{MemoryDatabase, Operation, OpenTransaction};
use tabula_core::{Error, Result, SqlWriter, Transaction};

impl MemoryDatabase {
    fn take_transaction(&mut self, action: &str) -> Result<OpenTransaction> {
        self.transaction.take().ok_or_else(|| {
            let error = Error::msg(format!("Cannot {} outside of a transaction", action));
            log::error!("{:#}", error);
            error
        })
    }
}

impl Transaction for MemoryDatabase {
    async fn commit(mut self) -> Result<()> {
        self.record(Operation::Commit)?;
        let OpenTransaction { tables, gate } = self.take_transaction("commit")?;
        let tables = tables
            .into_inner()
            .map_err(|_| Error::msg("The transaction was poisoned by a panicking thread"))?;
        self.publish(tables)?;
        drop(gate);
        self.log_sql(|writer, out| writer.write_transaction_commit(out));
        Ok(())
    }

    async fn rollback(mut self) -> Result<()> {
        self.record(Operation::Rollback)?;
        drop(self.take_transaction("rollback")?);
        self.log_sql(|writer, out| writer.write_transaction_rollback(out));
        Ok(())
    }
}
