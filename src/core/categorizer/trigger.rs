// Edit trigger adapter.
//
// `handle_edit_event` is the top-level boundary of a run: it never fails,
// outcomes end up in the log. `EditWatcher` turns sheet edits into runs by
// polling the project columns and firing whenever their contents change.

use super::categorizer_models::{Row, WriteSummary};
use super::categorizer_service::{CategorizerService, ModelClient, SheetAccessor};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Runs the pipeline once and logs the outcome.
///
/// Returns the summary on success so callers can inspect it, `None` otherwise.
pub async fn handle_edit_event<S, M>(
    service: &CategorizerService,
    sheet: &S,
    model: &M,
) -> Option<WriteSummary>
where
    S: SheetAccessor + ?Sized,
    M: ModelClient + ?Sized,
{
    match service.run(sheet, model).await {
        Ok(summary) => {
            tracing::info!(
                rows_read = summary.rows_read,
                categories_written = summary.categories_written,
                first_row = summary.first_row,
                category_column = summary.category_column,
                started_at = %summary.started_at,
                "Categories written"
            );
            Some(summary)
        }
        Err(e) => {
            tracing::error!("Categorization failed: {}", e);
            None
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum PollOutcome {
    /// Project columns are the same as on the previous poll.
    Unchanged,
    /// Project columns changed and the pipeline ran.
    Fired(Option<WriteSummary>),
    /// The sheet could not be read; the next poll tries again.
    ReadFailed,
}

/// Polls the project columns and runs the pipeline on every change.
pub struct EditWatcher {
    interval: Duration,
    last_fingerprint: Option<u64>,
}

impl EditWatcher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fingerprint: None,
        }
    }

    /// Checks the sheet once. The first successful poll always fires.
    pub async fn poll_once<S, M>(
        &mut self,
        service: &CategorizerService,
        sheet: &S,
        model: &M,
    ) -> PollOutcome
    where
        S: SheetAccessor + ?Sized,
        M: ModelClient + ?Sized,
    {
        let rows = match service.read_rows(sheet).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Failed to read project columns: {}", e);
                return PollOutcome::ReadFailed;
            }
        };

        let fingerprint = fingerprint(&rows);
        if self.last_fingerprint == Some(fingerprint) {
            return PollOutcome::Unchanged;
        }

        tracing::info!(rows = rows.len(), "Project columns changed");
        self.last_fingerprint = Some(fingerprint);
        PollOutcome::Fired(handle_edit_event(service, sheet, model).await)
    }

    /// Polls forever, sleeping `interval` between checks.
    pub async fn watch<S, M>(&mut self, service: &CategorizerService, sheet: &S, model: &M)
    where
        S: SheetAccessor + ?Sized,
        M: ModelClient + ?Sized,
    {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Watching sheet for edits"
        );

        loop {
            self.poll_once(service, sheet, model).await;
            tokio::time::sleep(self.interval).await;
        }
    }
}

fn fingerprint(rows: &[Row]) -> u64 {
    let mut hasher = DefaultHasher::new();
    rows.hash(&mut hasher);
    hasher.finish()
}
