//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    middleware::JwtVerifier,
    store::{UserStore, ViewLedger},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub view_ledger: Arc<dyn ViewLedger>,
    pub jwt_verifier: JwtVerifier,
}
