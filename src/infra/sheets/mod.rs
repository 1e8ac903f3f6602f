// Spreadsheet implementations of the core SheetAccessor trait.

pub mod google_sheets_client;
#[cfg(test)]
pub mod in_memory;

pub use google_sheets_client::{GoogleSheetsClient, SheetsAuth};
#[cfg(test)]
pub use in_memory::InMemorySheet;
