use crate::SqlWriter;

pub trait Driver: Send + Sync {
    type SqlWriter: SqlWriter;

    const NAME: &'static str;
    fn sql_writer(&self) -> Self::SqlWriter;
}
