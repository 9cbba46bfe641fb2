use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by fallible [`ByteTrie`](crate::ByteTrie) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Error {
    /// A value cannot be stored under the zero-length key.
    #[error("inserting an empty key is not allowed")]
    EmptyKey,
}
