// This is the entry point of the sheet categorizer.
//
// **Architecture Overview:**
// - `core/` = Business logic (no Google or OpenAI specifics)
// - `infra/` = Implementations of core traits (Google Sheets, OpenAI)
//
// This file's job is to:
// 1. Load and validate configuration
// 2. Initialize clients and the service (dependency injection)
// 3. Run the pipeline once, or watch the sheet and run it on every edit

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::categorizer::{
    handle_edit_event, CategorizerConfig, CategorizerService, ConfigError, EditWatcher,
    MismatchPolicy, ModelConfig,
};
use crate::infra::ai::{OpenAiClient, OPENAI_CHAT_COMPLETIONS_URL};
use crate::infra::sheets::{GoogleSheetsClient, SheetsAuth};
use anyhow::Context;
use std::str::FromStr;
use std::time::Duration;

/// Everything read from the environment at startup.
#[derive(Debug)]
struct AppConfig {
    api_url: String,
    api_key: String,
    spreadsheet_id: String,
    categorizer: CategorizerConfig,
    /// `None` runs the pipeline once and exits.
    watch_interval: Option<Duration>,
}

impl AppConfig {
    /// Builds and validates the configuration from a variable lookup
    /// (the process environment in production).
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let api_key = required("OPENAI_API_KEY")?;

        let api_url = lookup("OPENAI_API_URL")
            .unwrap_or_else(|| OPENAI_CHAT_COMPLETIONS_URL.to_string());
        if reqwest::Url::parse(&api_url).is_err() {
            return Err(ConfigError::Invalid {
                name: "OPENAI_API_URL",
                value: api_url,
            });
        }

        let spreadsheet = required("GOOGLE_SPREADSHEET_ID")?;
        let spreadsheet_id = GoogleSheetsClient::extract_spreadsheet_id(&spreadsheet).ok_or(
            ConfigError::Invalid {
                name: "GOOGLE_SPREADSHEET_ID",
                value: spreadsheet,
            },
        )?;

        let defaults = CategorizerConfig::default();
        let categorizer = CategorizerConfig {
            sheet_index: parse_var(&lookup, "CATEGORIZER_SHEET_INDEX", defaults.sheet_index)?,
            project_column: parse_var(
                &lookup,
                "CATEGORIZER_PROJECT_COLUMN",
                defaults.project_column,
            )?,
            category_column: parse_var(
                &lookup,
                "CATEGORIZER_CATEGORY_COLUMN",
                defaults.category_column,
            )?,
            mismatch_policy: parse_var(
                &lookup,
                "CATEGORIZER_MISMATCH_POLICY",
                MismatchPolicy::default(),
            )?,
            model: ModelConfig {
                model: lookup("OPENAI_MODEL").unwrap_or(defaults.model.model),
            },
        };
        categorizer.validate()?;

        let watch_interval = match lookup("CATEGORIZER_WATCH_INTERVAL_SECS") {
            None => None,
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "CATEGORIZER_WATCH_INTERVAL_SECS",
                        value,
                    })
                }
            },
        };

        Ok(Self {
            api_url,
            api_key,
            spreadsheet_id,
            categorizer,
            watch_interval,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_lookup(|name| std::env::var(name).ok())
        .context("Invalid configuration")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let auth = SheetsAuth::from_env()
        .await
        .context("Failed to set up Google Sheets authentication")?;
    if let SheetsAuth::ServiceAccount(account) = &auth {
        tracing::info!(
            "Using service account {} (share the spreadsheet with it as Editor)",
            account.client_email()
        );
    }

    let sheet = GoogleSheetsClient::new(config.spreadsheet_id.clone(), auth);
    let model = OpenAiClient::new(config.api_url.clone(), config.api_key.clone());
    let service = CategorizerService::new(config.categorizer);

    tracing::info!(
        spreadsheet_id = %config.spreadsheet_id,
        sheet_index = service.config().sheet_index,
        project_column = service.config().project_column,
        category_column = service.config().category_column,
        model = %service.config().model.model,
        "Categorizer ready"
    );

    match config.watch_interval {
        Some(interval) => {
            EditWatcher::new(interval)
                .watch(&service, &sheet, &model)
                .await
        }
        None => {
            handle_edit_event(&service, &sheet, &model).await;
        }
    }

    Ok(())
}
