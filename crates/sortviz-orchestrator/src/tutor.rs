//! The tutor collaborator and its integration with the driver.
//!
//! The tutor is an external chat service that answers each learner message
//! with a follow-up question and, optionally, a visualizer update. Any fault
//! on the tutor's side is recovered locally with a neutral fallback response,
//! so a learner never sees a transport error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sortviz_engine::Algorithm;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::TutorConfig;
use crate::driver::Driver;
use crate::error::{Result, SortvizError, TutorErrorKind};
use crate::playback::OverrideOutcome;
use crate::visualizer::VisualizerUpdate;

/// Path of the chat endpoint, relative to the tutor's base URL.
pub const CHAT_PATH: &str = "/api/v1/chat";

/// Local hints, from gentle nudges to near-answers. Served without the tutor.
const HINTS: [&str; 9] = [
    "Think about what happens when you compare two adjacent elements.",
    "Consider the loop structure - what does the outer loop represent?",
    "What condition determines if elements should be swapped?",
    "In Bubble Sort, each pass moves the largest unsorted element to its final position.",
    "The inner loop performs comparisons, while the outer loop counts passes.",
    "After each complete pass, one more element is in its sorted position.",
    "Here's a key insight: You need two nested loops. The outer loop runs n-1 times, and the inner loop compares adjacent pairs.",
    "The swap condition is: if arr[j] > arr[j+1], then swap them.",
    "You can optimize by reducing the inner loop range after each pass, since the last elements are already sorted.",
];

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The learner.
    User,
    /// The tutor.
    Ai,
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a learner message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates a tutor message.
    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

/// Body sent to the tutor for each learner message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    /// Most recent turns, oldest first, ending with the new learner message.
    pub chat_history: Vec<ChatMessage>,
    /// Algorithm currently selected.
    pub algorithm: Algorithm,
    /// Mastery score per concept.
    pub learner_mastery: HashMap<String, f64>,
    /// Array currently on screen.
    pub current_array: Vec<f64>,
}

/// What the tutor answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorResponse {
    /// Follow-up question shown to the learner.
    pub socratic_question: String,
    /// The tutor's verdict on the learner's answer.
    #[serde(default = "default_analysis")]
    pub analysis_of_user_answer: String,
    /// Mastery changes to merge into the session.
    #[serde(default)]
    pub learner_mastery_update: HashMap<String, f64>,
    /// Update submitted to the visualizer.
    #[serde(default)]
    pub visualizer_state_update: VisualizerUpdate,
    /// Experience points, passed through untouched. Negative values are
    /// penalties.
    #[serde(default)]
    pub xp_awarded: i32,
    /// Badges, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_badges: Option<Vec<String>>,
}

fn default_analysis() -> String {
    "continuing".to_string()
}

impl TutorResponse {
    /// The response used when the tutor cannot answer.
    #[must_use]
    pub fn fallback(algorithm: Algorithm) -> Self {
        Self {
            socratic_question: format!(
                "I'm experiencing a technical issue. Let's continue with {} - what would you like to explore about this algorithm?",
                algorithm.info().name
            ),
            analysis_of_user_answer: default_analysis(),
            learner_mastery_update: HashMap::new(),
            visualizer_state_update: VisualizerUpdate::idle(),
            xp_awarded: 0,
            new_badges: None,
        }
    }
}

/// A chat service that answers learner messages.
pub trait TutorService: Send + Sync {
    /// Sends one request and waits for the answer.
    fn respond(&self, request: TutorRequest) -> BoxFuture<'_, Result<TutorResponse>>;
}

/// [`TutorService`] backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTutor {
    /// Creates a client for the tutor at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SortvizError::tutor_unavailable(TutorErrorKind::Network, e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Returns the full chat endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: TutorRequest) -> Result<TutorResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SortvizError::tutor_unavailable(TutorErrorKind::Network, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SortvizError::tutor_unavailable(
                TutorErrorKind::from_status(status.as_u16()),
                format!("{} returned {status}", self.endpoint),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SortvizError::tutor_unavailable(TutorErrorKind::Network, e.to_string()))?;
        parse_response(&body)
    }
}

impl TutorService for HttpTutor {
    fn respond(&self, request: TutorRequest) -> BoxFuture<'_, Result<TutorResponse>> {
        Box::pin(self.post(request))
    }
}

/// Parses a tutor body, tolerating prose or code fences around the object.
pub fn parse_response(body: &str) -> Result<TutorResponse> {
    let object = extract_json_object(body)
        .ok_or_else(|| SortvizError::tutor_response_invalid("no JSON object in response body"))?;
    serde_json::from_str(object).map_err(|e| SortvizError::tutor_response_invalid(e.to_string()))
}

/// Returns the slice from the first `{` to the last `}`.
fn extract_json_object(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

/// Result of one learner message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorExchange {
    /// The tutor's answer, or the fallback.
    pub response: TutorResponse,
    /// Whether `response` is the fallback.
    pub fallback: bool,
    /// What happened to the response's visualizer update.
    pub outcome: OverrideOutcome,
}

/// A hint from the local ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorHint {
    /// Hint text.
    pub hint: String,
    /// Ladder level the hint was taken from, starting at 0.
    pub level: usize,
}

#[derive(Debug, Default)]
struct Conversation {
    history: Vec<ChatMessage>,
    mastery: HashMap<String, f64>,
    hint_level: usize,
}

impl Conversation {
    /// Drops turns older than the last `window`.
    fn trim(&mut self, window: usize) {
        let excess = self.history.len().saturating_sub(window);
        self.history.drain(..excess);
    }
}

/// Conversation state plus the tutor round trip.
pub struct TutorSession {
    service: Arc<dyn TutorService>,
    driver: Driver,
    conversation: Mutex<Conversation>,
    timeout: Duration,
    history_window: usize,
}

impl std::fmt::Debug for TutorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorSession")
            .field("timeout", &self.timeout)
            .field("history_window", &self.history_window)
            .finish_non_exhaustive()
    }
}

impl TutorSession {
    /// Creates a session around `service`.
    #[must_use]
    pub fn new(service: Arc<dyn TutorService>, driver: Driver, config: &TutorConfig) -> Self {
        Self {
            service,
            driver,
            conversation: Mutex::new(Conversation::default()),
            timeout: Duration::from_secs(config.timeout_secs),
            history_window: config.history_window,
        }
    }

    /// Creates a session talking HTTP to `config.base_url`, or `None` when
    /// the tutor is disabled.
    pub fn from_config(driver: Driver, config: &TutorConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let tutor = HttpTutor::new(&config.base_url)?;
        info!(endpoint = tutor.endpoint(), "Tutor enabled");
        Ok(Some(Self::new(Arc::new(tutor), driver, config)))
    }

    /// Sends a learner message and applies the tutor's visualizer update.
    ///
    /// Tutor faults never surface here; they produce the fallback response.
    pub async fn send_message(&self, message: &str) -> TutorExchange {
        let snapshot = self.driver.snapshot().await;

        let request = {
            let mut conversation = self.conversation.lock().await;
            conversation.history.push(ChatMessage::user(message));
            let skip = conversation.history.len().saturating_sub(self.history_window);
            TutorRequest {
                chat_history: conversation.history[skip..].to_vec(),
                algorithm: snapshot.algorithm,
                learner_mastery: conversation.mastery.clone(),
                current_array: snapshot.visualizer.data,
            }
        };

        let (response, fallback) =
            match tokio::time::timeout(self.timeout, self.service.respond(request)).await {
                Ok(Ok(response)) => (response, false),
                Ok(Err(e)) => {
                    warn!(error = %e, "Tutor request failed, using fallback");
                    (TutorResponse::fallback(snapshot.algorithm), true)
                }
                Err(_) => {
                    let e = SortvizError::tutor_timeout(self.timeout.as_secs());
                    warn!(error = %e, "Tutor request timed out, using fallback");
                    (TutorResponse::fallback(snapshot.algorithm), true)
                }
            };

        {
            let mut conversation = self.conversation.lock().await;
            for (concept, score) in &response.learner_mastery_update {
                if score.is_finite() {
                    conversation.mastery.insert(concept.clone(), *score);
                } else {
                    warn!(concept = %concept, "Ignoring non-finite mastery score");
                }
            }
            conversation
                .history
                .push(ChatMessage::ai(response.socratic_question.clone()));
            conversation.trim(self.history_window);
        }

        let outcome = self
            .driver
            .submit_external_step(response.visualizer_state_update.clone())
            .await;
        debug!(%outcome, fallback, "Tutor exchange complete");

        TutorExchange {
            response,
            fallback,
            outcome,
        }
    }

    /// Returns the retained conversation, at most `history_window` turns.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.conversation.lock().await.history.clone()
    }

    /// Returns the next local hint and moves one level up the ladder.
    ///
    /// Past the last level the last hint repeats.
    pub async fn hint(&self) -> TutorHint {
        let mut conversation = self.conversation.lock().await;
        let level = conversation.hint_level.min(HINTS.len() - 1);
        conversation.hint_level = conversation.hint_level.saturating_add(1);
        debug!(level, "Serving local hint");
        TutorHint {
            hint: HINTS[level].to_string(),
            level,
        }
    }

    /// Starts the hint ladder over.
    pub async fn reset_hints(&self) {
        self.conversation.lock().await.hint_level = 0;
    }

    /// Returns the learner's mastery scores.
    pub async fn mastery(&self) -> HashMap<String, f64> {
        self.conversation.lock().await.mastery.clone()
    }
}
