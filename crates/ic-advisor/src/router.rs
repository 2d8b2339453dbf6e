//! Two-way intent router for free-form chat.
//!
//! A short classification call picks CHAT or RECOMMEND. Anything that does
//! not clearly name the recommendation token routes to CHAT, the path that
//! never mutates the store. CHAT answers with a domain-scoped persona;
//! RECOMMEND triggers a cycle through the [`Advisor`].

use std::sync::Arc;

use ic_protocol::{Intent, RecommendationResult, StoreState};

use crate::error::AdvisorResult;
use crate::model::GenerativeModel;
use crate::refresh::{Advisor, CycleOutcome};

/// Fixed answer for off-topic questions and empty model replies.
pub const REFUSAL: &str =
    "Sorry, I can only answer questions related to weather, pollution, or health impacts.";

const NO_ENVIRONMENT: &str =
    "I can't suggest appliance settings until room and sensor data have been submitted.";

/// Result of a RECOMMEND dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendAction {
    /// Freshly generated result, or the latest stored one when no cycle ran.
    pub recommendation: Option<RecommendationResult>,
    /// Whether this dispatch ran a cycle.
    pub refreshed: bool,
}

/// What a routed message produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Chat { reply: String },
    Recommend(RecommendAction),
}

impl RouteOutcome {
    pub fn intent(&self) -> Intent {
        match self {
            RouteOutcome::Chat { .. } => Intent::Chat,
            RouteOutcome::Recommend(_) => Intent::Recommend,
        }
    }

    /// Text to show the user.
    pub fn reply(&self) -> &str {
        match self {
            RouteOutcome::Chat { reply } => reply,
            RouteOutcome::Recommend(action) => action
                .recommendation
                .as_ref()
                .map(|r| r.recommendation.reason.as_str())
                .unwrap_or(NO_ENVIRONMENT),
        }
    }

    pub fn recommendation(&self) -> Option<&RecommendationResult> {
        match self {
            RouteOutcome::Chat { .. } => None,
            RouteOutcome::Recommend(action) => action.recommendation.as_ref(),
        }
    }
}

/// Classifier prompt for `message`.
pub fn classifier_prompt(message: &str) -> String {
    format!(
        "You are an intent classifier for an indoor environment and health assistant.\n\
         \n\
         Decide which action to call:\n\
         - {chat}: greetings, general questions, or informational topics \
         (weather, air quality, pollution, health advice, the environment).\n\
         - {rec}: only when the user expresses physical discomfort, illness, or \
         environmental distress (e.g. \"I feel dizzy\", \"I have a headache\", \
         \"my room feels suffocating\", feeling too hot or too cold).\n\
         \n\
         Answer with exactly one of these words and nothing else:\n\
         {chat}\n\
         {rec}\n\
         \n\
         User: {message}",
        chat = Intent::Chat.token(),
        rec = Intent::Recommend.token(),
    )
}

/// Map a classifier answer to an intent.
///
/// Case-insensitive search for the recommendation keyword; everything else,
/// including unrecognised answers, is CHAT.
pub fn parse_intent(answer: &str) -> Intent {
    let normalized = answer.trim().to_uppercase();
    if normalized.contains("RECOMMENDATION") {
        Intent::Recommend
    } else {
        if !normalized.contains(Intent::Chat.token()) {
            tracing::debug!(answer = %answer.trim(), "ambiguous classification, defaulting to chat");
        }
        Intent::Chat
    }
}

/// Persona prompt for the CHAT path, with the latest recommendation as context.
pub fn chat_prompt(message: &str, state: &StoreState) -> String {
    let mut prompt = String::from(
        "You are a friendly and knowledgeable indoor environment and health assistant.\n\
         You specialize in:\n\
         - Weather and air quality\n\
         - Pollutants (PM2.5, CO2, NOx, etc.)\n\
         - Health effects of pollution and poor air quality\n\
         - Ways to stay healthy and comfortable indoors\n\
         \n\
         Behavior guidelines:\n\
         1. If the user greets you, reply with a short friendly greeting and invite \
         them to ask about weather, air quality, or health.\n\
         2. If the user asks about weather, air, or pollution, answer naturally and informatively.\n",
    );
    prompt.push_str(&format!(
        "3. If the question is unrelated (math, technology, sports, jokes, etc.), reply exactly:\n   \"{REFUSAL}\"\n"
    ));
    prompt.push_str("4. Keep replies concise (1-2 sentences) and empathetic.\n");

    if let Some(latest) = &state.latest_recommendation {
        if let Ok(settings) = serde_json::to_string(&latest.recommendation) {
            prompt.push_str("\nCurrent appliance recommendation for the room");
            if let Some(updated) = state.last_updated {
                prompt.push_str(&format!(" (updated {})", updated.to_rfc3339()));
            }
            prompt.push_str(&format!(":\n{settings}\n"));
        }
    }

    prompt.push_str(&format!("\nUser: {message}"));
    prompt
}

/// Classifies chat messages and dispatches them.
#[derive(Clone)]
pub struct IntentRouter {
    model: Arc<dyn GenerativeModel>,
    advisor: Advisor,
}

impl IntentRouter {
    pub fn new(model: Arc<dyn GenerativeModel>, advisor: Advisor) -> Self {
        Self { model, advisor }
    }

    /// One classification call. Transport failures propagate.
    pub async fn classify(&self, message: &str) -> AdvisorResult<Intent> {
        let answer = self.model.generate(&classifier_prompt(message), None).await?;
        let intent = parse_intent(&answer);
        tracing::info!(intent = %intent, "message classified");
        Ok(intent)
    }

    /// Classify `message` and dispatch it.
    pub async fn route(&self, message: &str) -> AdvisorResult<RouteOutcome> {
        match self.classify(message).await? {
            Intent::Chat => self.chat(message).await,
            Intent::Recommend => self.recommend().await,
        }
    }

    async fn chat(&self, message: &str) -> AdvisorResult<RouteOutcome> {
        let state = self.advisor.store().snapshot().await;
        let reply = match self.model.generate(&chat_prompt(message, &state), None).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => REFUSAL.to_string(),
            Err(e) if e.is_empty_response() => REFUSAL.to_string(),
            Err(e) => return Err(e),
        };
        Ok(RouteOutcome::Chat { reply })
    }

    async fn recommend(&self) -> AdvisorResult<RouteOutcome> {
        let action = match self.advisor.trigger().await {
            CycleOutcome::Updated(rec) => RecommendAction {
                recommendation: Some(rec),
                refreshed: true,
            },
            CycleOutcome::Skipped => RecommendAction {
                recommendation: self.advisor.store().snapshot().await.latest_recommendation,
                refreshed: false,
            },
            CycleOutcome::Failed(e) => return Err(e),
        };
        Ok(RouteOutcome::Recommend(action))
    }
}
