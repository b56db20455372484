//! Application state shared by all handlers.

use std::sync::Arc;

use crate::services::{GenerationService, SessionHistory};

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
  /// External generation service (webhook in production)
  pub generator: Arc<dyn GenerationService>,

  /// Sessions generated since startup
  pub history: SessionHistory,
}

impl AppState {
  pub fn new(generator: Arc<dyn GenerationService>) -> Self {
    Self {
      generator,
      history: SessionHistory::new(),
    }
  }
}
