//! StageEvent — A stage occurrence with presentation metadata
//!
//! Wraps a Stage with the message line, its tone and the payout text that
//! the renderer shows next to the reels.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Color hint for the message line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Neutral status text
    #[default]
    Muted,
    /// Positive outcome
    Win,
    /// Negative outcome or failure
    Lose,
}

impl Tone {
    /// Hex color used by the shipped stylesheet
    pub fn color_hex(&self) -> &'static str {
        match self {
            Tone::Muted => "#6a7a90",
            Tone::Win => "#34d399",
            Tone::Lose => "#fb7185",
        }
    }
}

/// A stage event with presentation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The canonical stage
    pub stage: Stage,

    /// Message line to display, if this stage changes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Tone of the message line
    #[serde(default)]
    pub tone: Tone,

    /// Payout line to display (empty string clears it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_text: Option<String>,

    /// Custom tags for filtering/routing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl StageEvent {
    /// Create a bare stage event
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            message: None,
            tone: Tone::Muted,
            payout_text: None,
            tags: Vec::new(),
        }
    }

    /// Attach a message line with its tone
    pub fn with_message(mut self, message: impl Into<String>, tone: Tone) -> Self {
        self.message = Some(message.into());
        self.tone = tone;
        self
    }

    /// Attach payout text
    pub fn with_payout_text(mut self, text: impl Into<String>) -> Self {
        self.payout_text = Some(text.into());
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

impl From<Stage> for StageEvent {
    fn from(stage: Stage) -> Self {
        Self::new(stage)
    }
}

/// Find the last message line in a batch of events
pub fn last_message(events: &[StageEvent]) -> Option<&str> {
    events.iter().rev().find_map(|e| e.message.as_deref())
}
