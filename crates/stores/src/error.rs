use thiserror::Error;

use shipdesk_client::ApiError;
use shipdesk_core::DomainError;
use shipdesk_expeditions::ReceiveError;
use shipdesk_tariffs::ImportError;

use crate::forms::FormErrors;
use crate::session::PersistenceError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Why a store action did not change state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The service answered with an error, or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid form")]
    Form(FormErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Receive(#[from] ReceiveError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl StoreError {
    /// Underlying API error, if the service was involved.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            StoreError::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&FormErrors> {
        match self {
            StoreError::Form(f) => Some(f),
            _ => None,
        }
    }
}
