// Categorizer service - core business logic for labelling sheet rows.
//
// One run is a straight line:
// - read the project rows below the header
// - format them into a single prompt
// - make one chat completion call
// - decode the JSON answer (the content is itself JSON inside JSON)
// - write the categories back next to the rows
//
// NO Google or OpenAI dependencies here - the sheet and the model are ports.

use super::categorizer_models::{
    CategorizerConfig, CategoryAssignment, ChatMessage, CountMismatch, MismatchPolicy,
    ModelConfig, Row, WriteSummary, FIRST_DATA_ROW, PROJECT_COLUMN_WIDTH,
};
use super::prompt::build_messages;
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Sheet transport error: {0}")]
    Transport(String),

    #[error("Sheet authentication error: {0}")]
    Auth(String),

    #[error("Sheet API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("No sheet at index {0}")]
    SheetNotFound(usize),

    #[error("Unexpected sheet response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model transport error: {0}")]
    Transport(String),

    #[error("Model API error: {status} - {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No data rows below the header")]
    NoDataRows,

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model response body is not valid JSON: {0}")]
    MalformedResponse(serde_json::Error),

    #[error("Model response has no choices[0].message.content string")]
    MissingContent,

    #[error("Model content is not valid JSON: {0}")]
    MalformedContent(serde_json::Error),

    #[error("Model content has no `rows` array of strings: {0}")]
    MissingRows(serde_json::Error),

    #[error("Model returned {returned} categories for {expected} rows")]
    CategoryCountMismatch { expected: usize, returned: usize },
}

// ============================================================================
// PORTS
// ============================================================================

/// Access to a spreadsheet made of several sheets.
///
/// Rows and columns are one-based, the sheet index is zero-based.
#[async_trait]
pub trait SheetAccessor: Send + Sync {
    /// Reads `width` columns starting at `first_column`, from `first_row` down to
    /// the last row holding data. Rows may be shorter than `width` when trailing
    /// cells are empty.
    async fn read_rows(
        &self,
        sheet_index: usize,
        first_row: u32,
        first_column: u32,
        width: u32,
    ) -> Result<Vec<Vec<String>>, SheetError>;

    /// Writes `values` down a single column, one value per row from `first_row`.
    async fn write_column(
        &self,
        sheet_index: usize,
        first_row: u32,
        column: u32,
        values: &[String],
    ) -> Result<(), SheetError>;
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends a chat completion request asking for a JSON object reply.
    ///
    /// Returns the raw body of a successful (2xx) response. Decoding is left to
    /// the caller so each layer of the payload can fail on its own.
    async fn chat_complete(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
    ) -> Result<String, ModelError>;
}

// Lets the composition root pick a client at runtime.
#[async_trait]
impl ModelClient for Box<dyn ModelClient> {
    async fn chat_complete(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
    ) -> Result<String, ModelError> {
        (**self).chat_complete(messages, config).await
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decodes a chat completion body into the category list.
///
/// Stage one reads `choices[0].message.content` from the body, stage two
/// parses that content string as `{ "rows": [...] }`.
pub fn decode_categories(body: &str) -> Result<CategoryAssignment, PipelineError> {
    let response: serde_json::Value =
        serde_json::from_str(body).map_err(PipelineError::MalformedResponse)?;

    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(PipelineError::MissingContent)?;

    tracing::debug!(content, "Model content");

    let content: serde_json::Value =
        serde_json::from_str(content).map_err(PipelineError::MalformedContent)?;

    serde_json::from_value(content).map_err(PipelineError::MissingRows)
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct CategorizerService {
    config: CategorizerConfig,
}

impl CategorizerService {
    pub fn new(config: CategorizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    /// Read phase: every project row below the header, in sheet order.
    pub async fn read_rows<S>(&self, sheet: &S) -> Result<Vec<Row>, PipelineError>
    where
        S: SheetAccessor + ?Sized,
    {
        let cells = sheet
            .read_rows(
                self.config.sheet_index,
                FIRST_DATA_ROW,
                self.config.project_column,
                PROJECT_COLUMN_WIDTH,
            )
            .await?;

        Ok(cells.iter().map(|row| Row::from_cells(row)).collect())
    }

    /// Runs the whole pipeline once.
    ///
    /// Nothing is written unless every earlier phase succeeded.
    pub async fn run<S, M>(&self, sheet: &S, model: &M) -> Result<WriteSummary, PipelineError>
    where
        S: SheetAccessor + ?Sized,
        M: ModelClient + ?Sized,
    {
        let started_at = Utc::now();

        let rows = self.read_rows(sheet).await?;
        tracing::debug!(?rows, "Read project rows");

        if rows.is_empty() {
            return Err(PipelineError::NoDataRows);
        }

        let messages = build_messages(&rows);
        tracing::debug!(projects = %messages[1].content, "Formatted projects");

        let body = model.chat_complete(&messages, &self.config.model).await?;
        tracing::debug!(%body, "Model response");

        let assignment = decode_categories(&body)?;

        let mismatch = (assignment.rows.len() != rows.len()).then(|| CountMismatch {
            expected: rows.len(),
            returned: assignment.rows.len(),
        });

        if let Some(mismatch) = mismatch {
            tracing::warn!(
                expected = mismatch.expected,
                returned = mismatch.returned,
                "Category count does not match row count"
            );

            if self.config.mismatch_policy == MismatchPolicy::Strict {
                return Err(PipelineError::CategoryCountMismatch {
                    expected: mismatch.expected,
                    returned: mismatch.returned,
                });
            }
        }

        tracing::debug!(categories = ?assignment.rows, "Writing categories");

        if !assignment.rows.is_empty() {
            sheet
                .write_column(
                    self.config.sheet_index,
                    FIRST_DATA_ROW,
                    self.config.category_column,
                    &assignment.rows,
                )
                .await?;
        }

        Ok(WriteSummary {
            started_at,
            rows_read: rows.len(),
            categories_written: assignment.rows.len(),
            first_row: FIRST_DATA_ROW,
            category_column: self.config.category_column,
            mismatch,
        })
    }
}
