mod collection;
mod config;
mod connection;
mod driver;
mod evaluate;
mod sql_writer;
mod stats;
mod table;
mod transaction;

pub use collection::*;
pub use config::*;
pub use connection::MemoryDatabase;
pub use driver::*;
pub use sql_writer::*;
pub use stats::{Operation, Stats};

pub(crate) use connection::OpenTransaction;
pub(crate) use evaluate::evaluate;
pub(crate) use table::Table;
