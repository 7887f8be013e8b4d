mod as_value;
mod collection;
mod column_def;
mod condition;
mod connection;
mod database;
mod driver;
mod error;
mod field_mapper;
mod record;
mod result_set;
mod row;
mod sql_writer;
mod statement;
mod transaction;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use collection::*;
pub use column_def::*;
pub use condition::*;
pub use connection::*;
pub use database::*;
pub use driver::*;
pub use error::*;
pub use field_mapper::*;
pub use record::*;
pub use result_set::*;
pub use row::*;
pub use sql_writer::*;
pub use statement::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
