//! Memory request client.
//!
//! A "memory" is a few sentences of holiday prose generated for a photo,
//! optionally shaped by a message the user typed. Generation goes through a
//! [`MemoryService`]; [`GeminiService`] is the production implementation.
//!
//! Requests never block the frame loop. [`MemoryClient::submit`] runs the
//! service call on a worker thread and the result comes back through a
//! channel that the UI thread drains once per frame:
//!
//! ```ignore
//! if let Some(request) = controller.begin_request() {
//!     client.submit(request);
//! }
//!
//! // every frame
//! while let Some(response) = client.poll() {
//!     controller.resolve(response);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::MemoryError;
use crate::selection::RequestToken;

/// Shown in place of a memory when generation fails.
pub const DEFAULT_FALLBACK: &str =
    "The magic of Christmas lives in moments like this one: warm lights, kind hearts, and a memory worth keeping forever.";

/// A memory request ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRequest {
    pub token: RequestToken,
    /// Context typed by the user; may be empty.
    pub user_message: String,
}

impl MemoryRequest {
    #[inline]
    pub fn photo_id(&self) -> u32 {
        self.token.photo_id
    }
}

/// Outcome of a request, tagged with the token it was issued under.
#[derive(Debug)]
pub struct MemoryResponse {
    pub token: RequestToken,
    pub result: Result<String, MemoryError>,
}

/// Something that can write a memory for a photo.
///
/// Implementations may block; they are always called off the UI thread.
pub trait MemoryService: Send + Sync {
    fn generate(&self, photo_id: u32, user_message: &str) -> Result<String, MemoryError>;
}

/// Build the prompt sent to the text model.
pub fn build_prompt(photo_id: u32, user_message: &str) -> String {
    let mut prompt = format!(
        "Write a short, heartfelt Christmas memory (two or three sentences) inspired by \
         photo #{photo_id} hanging on a glowing holiday wishing tree."
    );
    let context = user_message.trim();
    if !context.is_empty() {
        prompt.push_str(&format!(
            " The person who shared the photo says: \"{context}\". Weave that moment into the memory."
        ));
    }
    prompt.push_str(" Write it warmly in the second person, with no title and no quotation marks.");
    prompt
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}

fn default_timeout_secs() -> f32 {
    20.0
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK.into()
}

/// Settings for the generative text service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Base URL of the Generative Language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Upper bound on one request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f32,
    /// Text shown when generation fails.
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            fallback: default_fallback(),
        }
    }
}

// ========== Gemini wire format ==========

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the generated text out of a `generateContent` reply body.
fn extract_text(body: &str) -> Result<String, MemoryError> {
    let reply: GenerateReply =
        serde_json::from_str(body).map_err(|e| MemoryError::Malformed(e.to_string()))?;
    let text: String = reply
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        Err(MemoryError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiService {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl GeminiService {
    /// Build a client from config, reading the API key from the environment.
    ///
    /// A missing key is not an error here; requests will fail with
    /// [`MemoryError::MissingApiKey`] and fall back.
    pub fn from_config(config: &MemoryConfig) -> Result<Self, MemoryError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "${} is not set; memories will use the fallback text",
                config.api_key_env
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit key.
    pub fn with_api_key(config: &MemoryConfig, api_key: Option<String>) -> Result<Self, MemoryError> {
        let timeout = Duration::from_secs_f32(config.timeout_secs.max(1.0));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MemoryError::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl MemoryService for GeminiService {
    fn generate(&self, photo_id: u32, user_message: &str) -> Result<String, MemoryError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MemoryError::MissingApiKey(self.api_key_env.clone()))?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(photo_id, user_message) }] }]
        });

        let response = self
            .client
            .post(self.url())
            .query(&[("key", key)])
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemoryError::Status(status.as_u16()));
        }

        let text = response.text()?;
        extract_text(&text)
    }
}

/// Runs memory requests off the UI thread and collects their responses.
pub struct MemoryClient {
    service: Arc<dyn MemoryService>,
    tx: Sender<MemoryResponse>,
    rx: Receiver<MemoryResponse>,
    in_flight: usize,
}

impl MemoryClient {
    pub fn new(service: Arc<dyn MemoryService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Dispatch a request. The response arrives later through [`poll`](Self::poll).
    pub fn submit(&mut self, request: MemoryRequest) {
        let MemoryRequest { token, user_message } = request;
        tracing::info!(
            "requesting memory for photo {} (generation {})",
            token.photo_id,
            token.generation
        );

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("memory-{}", token.generation))
            .spawn(move || {
                let result = service.generate(token.photo_id, &user_message);
                // The receiver only goes away when the session is torn down
                let _ = tx.send(MemoryResponse { token, result });
            });

        self.in_flight += 1;
        if let Err(e) = spawned {
            tracing::error!("failed to start memory request worker: {e}");
            let _ = self.tx.send(MemoryResponse {
                token,
                result: Err(MemoryError::Malformed(format!("worker did not start: {e}"))),
            });
        }
    }

    /// Next finished response, without blocking.
    pub fn poll(&mut self) -> Option<MemoryResponse> {
        let response = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(response)
    }

    /// Block up to `timeout` for the next response.
    pub fn wait(&mut self, timeout: Duration) -> Option<MemoryResponse> {
        match self.rx.recv_timeout(timeout) {
            Ok(response) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(response)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Requests submitted whose responses have not been collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl MemoryService for Echo {
        fn generate(&self, photo_id: u32, user_message: &str) -> Result<String, MemoryError> {
            Ok(format!("{photo_id}: {user_message}"))
        }
    }

    #[test]
    fn test_prompt_includes_context() {
        let plain = build_prompt(3, "   ");
        assert!(plain.contains("photo #3"));
        assert!(!plain.contains("says"));

        let with_context = build_prompt(3, "ski trip to Hokkaido");
        assert!(with_context.contains("\"ski trip to Hokkaido\""));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "A snowy " }, { "text": "memory." } ], "role": "model" } }
            ]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "A snowy memory.");
    }

    #[test]
    fn test_extract_text_errors() {
        assert!(matches!(extract_text(r#"{"candidates": []}"#), Err(MemoryError::EmptyResponse)));
        assert!(matches!(
            extract_text(r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#),
            Err(MemoryError::EmptyResponse)
        ));
        assert!(matches!(extract_text("not json"), Err(MemoryError::Malformed(_))));
    }

    #[test]
    fn test_missing_key_fails_without_network() {
        let config = MemoryConfig {
            api_key_env: "WISHTREE_TEST_UNSET_KEY".into(),
            ..MemoryConfig::default()
        };
        let service = GeminiService::with_api_key(&config, None).unwrap();
        match service.generate(1, "hello") {
            Err(MemoryError::MissingApiKey(var)) => assert_eq!(var, "WISHTREE_TEST_UNSET_KEY"),
            other => panic!("expected MissingApiKey, got {other:?}"),
        }
    }

    #[test]
    fn test_client_round_trip() {
        let mut client = MemoryClient::new(Arc::new(Echo));
        let token = RequestToken {
            photo_id: 8,
            generation: 1,
        };
        client.submit(MemoryRequest {
            token,
            user_message: "hi".into(),
        });
        assert_eq!(client.in_flight(), 1);

        let response = client.wait(Duration::from_secs(5)).expect("response");
        assert_eq!(response.token, token);
        assert_eq!(response.result.unwrap(), "8: hi");
        assert_eq!(client.in_flight(), 0);
        assert!(client.poll().is_none());
    }
}
