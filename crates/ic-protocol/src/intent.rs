use serde::{Deserialize, Serialize};

/// Route chosen for an incoming chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Conversational reply, never touches the recommendation store.
    #[default]
    Chat,
    /// Recommendation action (discomfort, illness, environmental distress).
    Recommend,
}

impl Intent {
    /// Token the classifier model is asked to answer with.
    pub fn token(self) -> &'static str {
        match self {
            Intent::Chat => "CALL_NORMAL_CHAT",
            Intent::Recommend => "CALL_RECOMMENDATION",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Chat => f.write_str("CHAT"),
            Intent::Recommend => f.write_str("RECOMMEND"),
        }
    }
}
