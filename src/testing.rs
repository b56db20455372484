//! Test utilities for handler tests.
//!
//! Provides a canned generation service so the full router can be exercised
//! without reaching an external webhook.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

use crate::domain::SessionRequest;
use crate::services::{GenerationError, GenerationService};
use crate::state::AppState;

/// Plain-text lesson as returned by the legacy generator
pub const SAMPLE_LESSON_TEXT: &str = "📘 Sesión de Fracciones
Tema: Fracciones equivalentes
Competencia: Resuelve problemas de cantidad
Duración: 45 minutos
Contexto: Rural
1. Inicio
- Presentar el problema
- Activar saberes previos
2. Desarrollo
- Aplicar estrategias
✅ Criterios
- Identifica fracciones equivalentes
- Resuelve con material concreto";

/// Generation service that always answers the same way and records prompts
pub struct CannedGenerator {
  reply: Result<String, GenerationError>,
  prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedGenerator {
  pub fn replying(text: &str) -> Self {
    Self {
      reply: Ok(text.to_string()),
      prompts: Arc::default(),
    }
  }

  pub fn failing(error: GenerationError) -> Self {
    Self {
      reply: Err(error),
      prompts: Arc::default(),
    }
  }

  /// Handle to the prompts received so far
  pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
    Arc::clone(&self.prompts)
  }
}

#[async_trait]
impl GenerationService for CannedGenerator {
  async fn generate(
    &self,
    message: &str,
    _request: &SessionRequest,
  ) -> Result<String, GenerationError> {
    if let Ok(mut prompts) = self.prompts.lock() {
      prompts.push(message.to_string());
    }
    self.reply.clone()
  }
}

/// Application state backed by a canned generator and empty history
pub fn test_state(generator: CannedGenerator) -> AppState {
  AppState::new(Arc::new(generator))
}

/// A valid session form as the browser would post it
pub fn sample_request_json() -> Value {
  json!({
    "tema": "Fracciones equivalentes",
    "competenciasSeleccionadas": ["Resuelve problemas de cantidad"],
    "ciclo": "VI",
    "contexto": "Rural",
    "horasClase": 2,
    "materialesDisponibles": "pizarra, plumones, material concreto"
  })
}
