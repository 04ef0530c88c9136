use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A billable generation modality. Video has no quota column of its own:
/// its entitlement rides the voice subscription flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Voice,
    Image,
    Video,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Voice => "voice",
            Feature::Image => "image",
            Feature::Video => "video",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "voice" => Some(Feature::Voice),
            "image" => Some(Feature::Image),
            "video" => Some(Feature::Video),
            _ => None,
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
