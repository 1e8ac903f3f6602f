//! Prompt building for the categorization request.
//!
//! Turns sheet rows into the chat messages sent to the model: a fixed system
//! instruction plus one user message listing every project.

use super::categorizer_models::{ChatMessage, Row};

/// System instruction sent with every request.
pub const PROMPT: &str = r#"Based on the provided projects information, return the categories to which the projects belongs in JSON format.
**Please ensure that you strictly adhere to the following constraints when creating the output**.

## Constraints

- The category should be created as a single English word.
- **Group the projects into the same category as much as possible**.
- Match the number of output categories with the number of provided project information.

example:

{
  rows: [category1, category2, ...]
}
"#;

/// Renders one row as a project description.
///
/// # Example Output
/// ```text
/// project: { challenge: reduce waste, needs: compost bins }
/// ```
pub fn describe_project(row: &Row) -> String {
    format!(
        "project: {{ challenge: {}, needs: {} }}",
        row.challenge, row.needs
    )
}

/// Joins every row into a single `projects: [...]` block, keeping sheet order.
pub fn format_projects(rows: &[Row]) -> String {
    let projects: Vec<String> = rows.iter().map(describe_project).collect();
    format!("projects: [{}]", projects.join(","))
}

pub fn build_messages(rows: &[Row]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(PROMPT),
        ChatMessage::user(format_projects(rows)),
    ]
}
