use std::fmt::{self, Display};

/// Conditions raised by the shared collection behavior itself.
///
/// They travel inside [`crate::Error`], use `downcast_ref::<CollectionError>()`
/// to tell them apart from backend failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// The item is not a structured record.
    InvalidArgument { type_name: &'static str },
    /// The insert succeeded but the backend returned no identifier.
    MissingKey { table: String },
    /// The result set has no (more) rows.
    NoMoreRows { table: String },
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::InvalidArgument { type_name } => write!(
                f,
                "Expecting a mutable reference to a structured record but got `{}`, which has no fields",
                type_name
            ),
            CollectionError::MissingKey { table } => write!(
                f,
                "Could not get a valid ID after inserting. Does the `{}` table have a primary key?",
                table
            ),
            CollectionError::NoMoreRows { table } => {
                write!(f, "No more rows in the result set of table `{}`", table)
            }
        }
    }
}

impl std::error::Error for CollectionError {}
