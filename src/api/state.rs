//! Application state for the API server

use crate::{Config, PinResolver};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the resolver instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The shared PinResolver instance (owns the session cache)
    pub resolver: Arc<PinResolver>,

    /// Configuration (read access for handlers; e.g. the development flag)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(resolver: Arc<PinResolver>, config: Arc<Config>) -> Self {
        Self { resolver, config }
    }
}
