use crate::{Database, Result};
use std::future::Future;

pub trait Connection: Database {
    /// Open a session configured by the given URL, the scheme selects the driver.
    fn connect(url: &str) -> impl Future<Output = Result<Self>>;
}
