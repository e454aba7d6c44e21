use beans_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown session, or the caller lacks a role the operation needs.
    #[error("{0}")]
    AccessDenied(String),
    /// Bad argument, unknown entity or a state conflict.
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Storage(#[from] DbError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
