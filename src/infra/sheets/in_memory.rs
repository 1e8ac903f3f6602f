// In-memory implementation of SheetAccessor.
//
// Cells live in a DashMap keyed by (sheet, row, column). Reads follow the
// spreadsheet convention that a sheet's data ends at its last non-empty row,
// whichever column that row's content is in.

use crate::core::categorizer::{SheetAccessor, SheetError};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
struct CellKey {
    sheet_index: usize,
    row: u32,
    column: u32,
}

pub struct InMemorySheet {
    sheet_count: usize,
    cells: DashMap<CellKey, String>,
}

impl InMemorySheet {
    /// Create a spreadsheet with `sheet_count` empty sheets.
    pub fn new(sheet_count: usize) -> Self {
        Self {
            sheet_count,
            cells: DashMap::new(),
        }
    }

    pub fn set_cell(&self, sheet_index: usize, row: u32, column: u32, value: &str) {
        let key = CellKey {
            sheet_index,
            row,
            column,
        };
        if value.is_empty() {
            self.cells.remove(&key);
        } else {
            self.cells.insert(key, value.to_string());
        }
    }

    pub fn cell(&self, sheet_index: usize, row: u32, column: u32) -> Option<String> {
        self.cells
            .get(&CellKey {
                sheet_index,
                row,
                column,
            })
            .map(|entry| entry.value().clone())
    }

    fn last_row(&self, sheet_index: usize) -> u32 {
        self.cells
            .iter()
            .filter(|entry| entry.key().sheet_index == sheet_index)
            .map(|entry| entry.key().row)
            .max()
            .unwrap_or(0)
    }

    fn check_sheet(&self, sheet_index: usize) -> Result<(), SheetError> {
        if sheet_index >= self.sheet_count {
            return Err(SheetError::SheetNotFound(sheet_index));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetAccessor for InMemorySheet {
    async fn read_rows(
        &self,
        sheet_index: usize,
        first_row: u32,
        first_column: u32,
        width: u32,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        self.check_sheet(sheet_index)?;

        let last_row = self.last_row(sheet_index);
        let rows = (first_row..=last_row)
            .map(|row| {
                let mut cells: Vec<String> = (first_column..first_column + width)
                    .map(|column| self.cell(sheet_index, row, column).unwrap_or_default())
                    .collect();
                // Match the Sheets API, which drops trailing empty cells
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        Ok(rows)
    }

    async fn write_column(
        &self,
        sheet_index: usize,
        first_row: u32,
        column: u32,
        values: &[String],
    ) -> Result<(), SheetError> {
        self.check_sheet(sheet_index)?;

        for (offset, value) in values.iter().enumerate() {
            self.set_cell(sheet_index, first_row + offset as u32, column, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_rows_stops_at_last_row() {
        let sheet = InMemorySheet::new(1);
        sheet.set_cell(0, 1, 1, "header");
        sheet.set_cell(0, 2, 1, "a");
        sheet.set_cell(0, 2, 2, "b");
        sheet.set_cell(0, 3, 1, "c");
        // Row 4 only has data outside the read span
        sheet.set_cell(0, 4, 5, "elsewhere");

        let rows = sheet.read_rows(0, 2, 1, 2).await.unwrap();

        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
                vec![],
            ]
        );
    }

    #[tokio::test]
    async fn test_read_rows_of_empty_sheet() {
        let sheet = InMemorySheet::new(1);
        sheet.set_cell(0, 1, 1, "header only");

        assert!(sheet.read_rows(0, 2, 1, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_column() {
        let sheet = InMemorySheet::new(2);
        sheet
            .write_column(1, 2, 3, &["x".to_string(), "y".to_string()])
            .await
            .unwrap();

        assert_eq!(sheet.cell(1, 2, 3), Some("x".to_string()));
        assert_eq!(sheet.cell(1, 3, 3), Some("y".to_string()));
        assert_eq!(sheet.cell(0, 2, 3), None);
    }

    #[tokio::test]
    async fn test_unknown_sheet_index() {
        let sheet = InMemorySheet::new(1);

        assert!(matches!(
            sheet.read_rows(1, 2, 1, 2).await,
            Err(SheetError::SheetNotFound(1))
        ));
        assert!(matches!(
            sheet.write_column(5, 2, 1, &[]).await,
            Err(SheetError::SheetNotFound(5))
        ));
    }
}
