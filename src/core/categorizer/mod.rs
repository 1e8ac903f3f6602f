// Core categorizer module - labels project rows with one-word categories.
// The sheet and the model are reached only through the traits defined here.

pub mod categorizer_models;
pub mod categorizer_service;
pub mod prompt;
pub mod trigger;

pub use categorizer_models::{CategorizerConfig, ConfigError, MismatchPolicy, ModelConfig};
pub use categorizer_service::{
    CategorizerService, ModelClient, ModelError, PipelineError, SheetAccessor, SheetError,
};
pub use trigger::{handle_edit_event, EditWatcher};
