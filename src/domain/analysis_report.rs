use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output of the primary analysis. Its success or failure alone decides
/// whether the job completes or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub tag: String,
    pub score: f32,
}

/// Best-effort analyses run after the primary one. Their failures are
/// recorded but never fail the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryKind {
    TextExtraction,
    Captioning,
}

impl SecondaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecondaryKind::TextExtraction => "text_extraction",
            SecondaryKind::Captioning => "captioning",
        }
    }
}

impl FromStr for SecondaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text_extraction" => Ok(SecondaryKind::TextExtraction),
            "captioning" => Ok(SecondaryKind::Captioning),
            _ => Err(format!("Invalid secondary analysis kind: {}", s)),
        }
    }
}

impl fmt::Display for SecondaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one secondary analysis. `content` is present iff the call
/// succeeded; a failed call keeps its error text here instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRecord {
    pub kind: SecondaryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SecondaryRecord {
    pub fn succeeded(kind: SecondaryKind, content: String) -> Self {
        Self {
            kind,
            content: Some(content),
            error: None,
        }
    }

    pub fn failed(kind: SecondaryKind, error: String) -> Self {
        Self {
            kind,
            content: None,
            error: Some(error),
        }
    }
}

/// Aggregated output of all analysis calls made for one job. The presence
/// of `error_message` is the failure signal; there is no separate flag
/// that could disagree with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondaries: Vec<SecondaryRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AnalysisReport {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            classification: None,
            secondaries: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn secondary(&self, kind: SecondaryKind) -> Option<&SecondaryRecord> {
        self.secondaries.iter().find(|r| r.kind == kind)
    }
}
