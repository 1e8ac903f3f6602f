// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "categorizer/mod.rs"]
pub mod categorizer;
