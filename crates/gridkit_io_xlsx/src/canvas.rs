//! Staged target sheet.
//!
//! `rust_xlsxwriter` formats cannot be edited once a cell is written, so the
//! resolution passes build the final value/style of each cell here first and
//! [`crate::writer::XlsxWriter`] flushes the canvas exactly once on close.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::spec::{EnumCellValue, SpecCellStyle, SpecMergeRange};

/// Value and flattened style of one staged cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCanvasCell {
    /// Literal value.
    pub value: EnumCellValue,
    /// Resolved style.
    pub style: SpecCellStyle,
}

/// In-memory sheet the style engine writes into.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetCanvas {
    /// Unique workbook sheet name.
    pub sheet_name: String,
    /// Cells keyed by zero-based `(row, col)`.
    pub cells: BTreeMap<(u32, u16), SpecCanvasCell>,
    /// Column widths in workbook units.
    pub col_widths: BTreeMap<u16, f64>,
    /// Row heights in points.
    pub row_heights: BTreeMap<u32, f64>,
    /// Registered merged regions, in declaration order.
    pub merges: Vec<SpecMergeRange>,
}

impl SpecSheetCanvas {
    /// Create an empty canvas for `sheet_name`.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..Default::default()
        }
    }

    /// Staged cell at `(row, col)`, if any.
    pub fn cell(&self, row: u32, col: u16) -> Option<&SpecCanvasCell> {
        self.cells.get(&(row, col))
    }

    /// Replace the value at `(row, col)`, keeping its style.
    pub fn set_value(&mut self, row: u32, col: u16, value: EnumCellValue) {
        self.cells.entry((row, col)).or_default().value = value;
    }

    /// Mutable style of `(row, col)`; the cell is created on first access.
    pub fn style_mut(&mut self, row: u32, col: u16) -> &mut SpecCellStyle {
        &mut self.cells.entry((row, col)).or_default().style
    }

    /// Set the width of `col` in workbook units; a later call wins.
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.col_widths.insert(col, width);
    }

    /// Set the height of `row` in points; a later call wins.
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Register a merged region.
    ///
    /// Returns `Ok(false)` when the same rectangle is already registered or
    /// the rectangle is a single cell. A rectangle overlapping a different
    /// registered region fails with [`ConvertError::MergeConflict`].
    pub fn merge_range(&mut self, range: SpecMergeRange) -> Result<bool> {
        if range.is_single_cell() {
            debug!(sheet = %self.sheet_name, range = %range, "single-cell merge ignored");
            return Ok(false);
        }

        for merge_existing in &self.merges {
            if *merge_existing == range {
                debug!(sheet = %self.sheet_name, range = %range, "merge already registered");
                return Ok(false);
            }
            if merge_existing.overlaps(&range) {
                return Err(ConvertError::MergeConflict {
                    range: range.to_a1_ref(),
                    existing: merge_existing.to_a1_ref(),
                });
            }
        }

        self.merges.push(range);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SpecBorderEdge, SpecCellFill};

    fn derive_merge(row_first: u32, col_first: u16, row_last: u32, col_last: u16) -> SpecMergeRange {
        SpecMergeRange {
            row_first,
            col_first,
            row_last,
            col_last,
        }
    }

    #[test]
    fn test_set_value_keeps_style() {
        let mut canvas = SpecSheetCanvas::new("S");
        canvas.style_mut(1, 2).fill = Some(SpecCellFill {
            color: "ff0000".to_string(),
        });
        canvas.set_value(1, 2, EnumCellValue::Number(3.0));

        let cell = canvas.cell(1, 2).expect("staged cell");
        assert_eq!(cell.value, EnumCellValue::Number(3.0));
        assert!(cell.style.fill.is_some());
    }

    #[test]
    fn test_style_mut_creates_blank_cell() {
        let mut canvas = SpecSheetCanvas::new("S");
        canvas.style_mut(0, 0).border.left = Some(SpecBorderEdge::default());

        let cell = canvas.cell(0, 0).expect("staged cell");
        assert!(cell.value.is_none());
        assert!(!cell.style.is_default());
    }

    #[test]
    fn test_merge_range_is_idempotent_and_rejects_overlap() {
        let mut canvas = SpecSheetCanvas::new("S");
        assert!(canvas.merge_range(derive_merge(13, 5, 15, 5)).expect("first merge"));
        assert!(!canvas.merge_range(derive_merge(13, 5, 15, 5)).expect("repeat merge"));
        assert!(!canvas.merge_range(derive_merge(0, 0, 0, 0)).expect("single cell"));
        assert_eq!(canvas.merges.len(), 1);

        let err = canvas.merge_range(derive_merge(15, 4, 16, 6));
        assert!(matches!(
            err,
            Err(ConvertError::MergeConflict { ref range, ref existing })
                if range == "E16:G17" && existing == "F14:F16"
        ));
    }
}
