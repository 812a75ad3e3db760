//! Diff line model used by the review view.

use serde::{Deserialize, Serialize};

/// Kind of a unified diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffLineKind {
    Addition,
    Deletion,
    Context,
    ChunkHeader,
}

impl From<&str> for DiffLineKind {
    fn from(line: &str) -> Self {
        if line.starts_with("@@") {
            Self::ChunkHeader
        } else if line.starts_with('+') {
            Self::Addition
        } else if line.starts_with('-') {
            Self::Deletion
        } else {
            Self::Context
        }
    }
}

impl std::fmt::Display for DiffLineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Addition => write!(f, "addition"),
            Self::Deletion => write!(f, "deletion"),
            Self::Context => write!(f, "context"),
            Self::ChunkHeader => write!(f, "chunk-header"),
        }
    }
}

/// A display line of a diff, numbered from 1 in text order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffLine {
    pub number: u32,
    pub content: String,

    #[serde(rename = "type")]
    pub kind: DiffLineKind,
}

/// Split raw diff text into numbered, typed lines.
///
/// Numbering is positional over the whole text, so bug line numbers refer
/// to these positions rather than to old/new file lines.
pub fn format_diff_lines(diff_content: &str) -> Vec<DiffLine> {
    if diff_content.is_empty() {
        return Vec::new();
    }
    diff_content
        .split('\n')
        .enumerate()
        .map(|(index, line)| DiffLine {
            number: index as u32 + 1,
            content: line.to_string(),
            kind: DiffLineKind::from(line),
        })
        .collect()
}
