//! Application services.
//!
//! Collaborators the handlers orchestrate: the generation webhook client,
//! the session history and the dashboard aggregation.

pub mod dashboard;
pub mod generation;
pub mod history;

pub use generation::{GenerationError, GenerationService, WebhookGenerator};
pub use history::{HistoryError, SavedSession, SessionHistory};
