//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Issues and verifies user tokens
    pub signer: Arc<TokenSigner>,
}

impl AppState {
    /// Create a new application state with the given repository and signer.
    pub fn new(repository: Arc<dyn FullRepository>, signer: TokenSigner) -> Self {
        Self {
            repository,
            signer: Arc::new(signer),
        }
    }
}
