use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// First data row of the sheet. Row 1 holds the column headers.
pub const FIRST_DATA_ROW: u32 = 2;

/// Number of adjacent input columns read per project (challenge, needs).
pub const PROJECT_COLUMN_WIDTH: u32 = 2;

/// One project's challenge/needs pair, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    pub challenge: String,
    pub needs: String,
}

impl Row {
    pub fn new(challenge: impl Into<String>, needs: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            needs: needs.into(),
        }
    }

    /// Builds a row from raw sheet cells. Missing trailing cells read as empty.
    pub fn from_cells(cells: &[String]) -> Self {
        Self::new(
            cells.first().cloned().unwrap_or_default(),
            cells.get(1).cloned().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// The model's answer once both JSON layers have been decoded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategoryAssignment {
    pub rows: Vec<String>,
}

/// What to do when the model returns a different number of categories
/// than there are input rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Write exactly the categories that came back, starting at the first data row.
    #[default]
    WriteReturned,
    /// Refuse to write anything.
    Strict,
}

impl FromStr for MismatchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write-returned" | "write_returned" => Ok(Self::WriteReturned),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::Invalid {
                name: "CATEGORIZER_MISMATCH_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
    pub expected: usize,
    pub returned: usize,
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub started_at: DateTime<Utc>,
    pub rows_read: usize,
    pub categories_written: usize,
    pub first_row: u32,
    pub category_column: u32,
    pub mismatch: Option<CountMismatch>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} is a one-based column index and cannot be 0")]
    ZeroColumn(&'static str),

    #[error("Category column {category} overlaps project columns {first}..={last}")]
    OverlappingColumns { category: u32, first: u32, last: u32 },

    #[error("Model name cannot be empty")]
    EmptyModel,
}

/// Static settings for one categorizer deployment.
///
/// Column indices are one-based (column A = 1), the sheet index is zero-based.
#[derive(Debug, Clone)]
pub struct CategorizerConfig {
    pub sheet_index: usize,
    pub project_column: u32,
    pub category_column: u32,
    pub mismatch_policy: MismatchPolicy,
    pub model: ModelConfig,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            sheet_index: 0,
            project_column: 10,
            category_column: 13,
            mismatch_policy: MismatchPolicy::default(),
            model: ModelConfig::default(),
        }
    }
}

impl CategorizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_column == 0 {
            return Err(ConfigError::ZeroColumn("project_column"));
        }
        if self.category_column == 0 {
            return Err(ConfigError::ZeroColumn("category_column"));
        }

        // Writing into the input columns would also re-trigger the edit watcher.
        let first = self.project_column;
        let last = self.project_column + PROJECT_COLUMN_WIDTH - 1;
        if (first..=last).contains(&self.category_column) {
            return Err(ConfigError::OverlappingColumns {
                category: self.category_column,
                first,
                last,
            });
        }

        if self.model.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        Ok(())
    }
}
