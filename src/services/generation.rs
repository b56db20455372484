//! Client for the external generation webhook.
//!
//! The service is reached through the [`GenerationService`] trait so handlers
//! can be exercised against a canned implementation.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::GenerationConfig;
use crate::domain::SessionRequest;

/// Generation failures, all raised before any text reaches the normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
  /// No webhook URL configured
  NotConfigured,
  Timeout,
  Transport(String),
  /// Webhook answered with a non-success status
  Status(u16),
  /// Webhook answered with a blank body
  EmptyBody,
}

impl std::fmt::Display for GenerationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      GenerationError::NotConfigured => write!(f, "Generation webhook is not configured"),
      GenerationError::Timeout => write!(f, "Generation webhook timed out"),
      GenerationError::Transport(err) => write!(f, "Generation request failed: {}", err),
      GenerationError::Status(code) => write!(f, "Generation webhook returned status {}", code),
      GenerationError::EmptyBody => write!(f, "Generation webhook returned an empty body"),
    }
  }
}

impl GenerationError {
  /// Returns a user-facing error message without exposing the webhook URL.
  pub fn user_message(&self) -> &'static str {
    match self {
      GenerationError::NotConfigured => "El servicio de generación no está disponible",
      GenerationError::Timeout => "La IA tardó demasiado en responder. Intenta nuevamente.",
      GenerationError::Transport(_) | GenerationError::Status(_) => {
        "No se pudo contactar al servicio de IA. Intenta nuevamente."
      }
      GenerationError::EmptyBody => "La IA no devolvió contenido. Intenta nuevamente.",
    }
  }

  fn from_reqwest(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      GenerationError::Timeout
    } else {
      GenerationError::Transport(err.to_string())
    }
  }
}

impl std::error::Error for GenerationError {}

/// Produces the raw lesson text for a prompt message
#[async_trait]
pub trait GenerationService: Send + Sync {
  async fn generate(
    &self,
    message: &str,
    request: &SessionRequest,
  ) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
  message: &'a str,
  session: &'a SessionRequest,
}

/// Posts the prompt to a configured HTTP webhook and returns the body as text
pub struct WebhookGenerator {
  http_client: reqwest::Client,
  webhook_url: Option<String>,
}

impl WebhookGenerator {
  /// Fails if the HTTP client cannot be built with the configured timeout
  pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
    let http_client = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(|e| GenerationError::Transport(format!("cannot build HTTP client: {}", e)))?;

    Ok(Self {
      http_client,
      webhook_url: config.webhook_url.clone(),
    })
  }
}

#[async_trait]
impl GenerationService for WebhookGenerator {
  async fn generate(
    &self,
    message: &str,
    request: &SessionRequest,
  ) -> Result<String, GenerationError> {
    let url = self
      .webhook_url
      .as_deref()
      .ok_or(GenerationError::NotConfigured)?;

    tracing::info!(
      "Requesting session generation for '{}' ({} chars)",
      request.tema,
      message.len()
    );

    let response = self
      .http_client
      .post(url)
      .json(&WebhookPayload {
        message,
        session: request,
      })
      .send()
      .await
      .map_err(GenerationError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
      tracing::warn!("Generation webhook returned {}", status);
      return Err(GenerationError::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(GenerationError::from_reqwest)?;
    if body.trim().is_empty() {
      return Err(GenerationError::EmptyBody);
    }

    tracing::debug!("Generation webhook returned {} bytes", body.len());
    Ok(body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Ciclo;
  use axum::{Json, Router, http::StatusCode, routing::post};
  use serde_json::Value;
  use std::time::Duration;

  fn request() -> SessionRequest {
    SessionRequest {
      tema: "Fracciones".into(),
      competencias_seleccionadas: vec!["Resuelve problemas de cantidad".into()],
      ciclo: Ciclo::VI,
      contexto: "Rural".into(),
      horas_clase: 1,
      materiales_disponibles: "pizarra".into(),
    }
  }

  /// Serve `app` on an ephemeral local port and return its `/hook` URL
  async fn spawn_webhook(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/hook", addr)
  }

  fn generator(url: String, timeout_secs: u64) -> WebhookGenerator {
    WebhookGenerator::new(&GenerationConfig {
      webhook_url: Some(url),
      timeout_secs,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn test_unconfigured_webhook_fails_without_network() {
    let generator = WebhookGenerator::new(&GenerationConfig {
      webhook_url: None,
      timeout_secs: 5,
    })
    .unwrap();
    let result = generator.generate("Genera", &request()).await;
    assert_eq!(result, Err(GenerationError::NotConfigured));
  }

  #[tokio::test]
  async fn test_webhook_body_returned_as_text() {
    let app = Router::new().route(
      "/hook",
      post(|Json(payload): Json<Value>| async move {
        format!(
          "📘 {}\nTema: {}",
          payload["message"].as_str().unwrap_or_default(),
          payload["session"]["tema"].as_str().unwrap_or_default()
        )
      }),
    );
    let url = spawn_webhook(app).await;

    let body = generator(url, 5).generate("Sesión", &request()).await.unwrap();
    assert_eq!(body, "📘 Sesión\nTema: Fracciones");
  }

  #[tokio::test]
  async fn test_blank_webhook_body_is_empty_body() {
    let app = Router::new().route("/hook", post(|| async { "  \n " }));
    let url = spawn_webhook(app).await;

    let result = generator(url, 5).generate("Genera", &request()).await;
    assert_eq!(result, Err(GenerationError::EmptyBody));
  }

  #[tokio::test]
  async fn test_server_error_maps_to_status() {
    let app = Router::new().route(
      "/hook",
      post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "workflow crashed") }),
    );
    let url = spawn_webhook(app).await;

    let result = generator(url, 5).generate("Genera", &request()).await;
    assert_eq!(result, Err(GenerationError::Status(500)));
  }

  #[tokio::test]
  async fn test_slow_webhook_times_out() {
    let app = Router::new().route(
      "/hook",
      post(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        "📘 Demasiado tarde"
      }),
    );
    let url = spawn_webhook(app).await;

    let result = generator(url, 1).generate("Genera", &request()).await;
    assert_eq!(result, Err(GenerationError::Timeout));
  }

  #[test]
  fn test_payload_shape() {
    let request = request();
    let payload = WebhookPayload {
      message: "Genera una sesión",
      session: &request,
    };
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["message"], "Genera una sesión");
    assert_eq!(json["session"]["horasClase"], 1);
    assert_eq!(json["session"]["ciclo"], "VI");
  }

  #[test]
  fn test_user_messages_hide_details() {
    let err = GenerationError::Transport("dns error for hooks.internal".into());
    assert!(!err.user_message().contains("hooks.internal"));
    assert!(err.to_string().contains("hooks.internal"));
  }
}
