pub mod config;
pub mod domain;
pub mod handlers;
pub mod normalizer;
pub mod prompt;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
