use serde::{Deserialize, Serialize};

/// Number of bullet points every parsed chapter carries.
pub const BULLETS_PER_CHAPTER: usize = 5;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub bullet_points: [String; BULLETS_PER_CHAPTER],
}

impl Chapter {
    /// Builds a chapter only when exactly five non-empty bullets are given.
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Option<Self> {
        let title = title.into();
        if title.is_empty() || bullets.iter().any(|b| b.is_empty()) {
            return None;
        }
        let bullet_points: [String; BULLETS_PER_CHAPTER] = bullets.try_into().ok()?;
        Some(Self {
            title,
            bullet_points,
        })
    }
}

/// Result of one prompt sent through the retrying generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    Failed,
}

impl Generation {
    /// Empty completions count as failures.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Generation::Failed
        } else {
            Generation::Text(text)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Generation::Failed)
    }

    pub fn text_or(self, placeholder: &str) -> String {
        match self {
            Generation::Text(text) => text,
            Generation::Failed => placeholder.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Completed {
        chapters: usize,
        failed_sections: usize,
    },
    Aborted {
        reason: String,
    },
}
