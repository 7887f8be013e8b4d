use crate::{Database, Result};
use std::future::Future;

/// A database session that owns an open transaction.
///
/// Both methods consume the session. Dropping it without calling either must
/// discard the work done and release the transaction.
pub trait Transaction: Database {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}
