//! Merge applier.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::canvas::SpecSheetCanvas;
use crate::document::SpecMergeDescriptor;
use crate::error::Result;
use crate::spec::{SpecMergeRange, SpecSheetReport, SpecXlsxReport};
use crate::util::cast_cell_num;

/// Declare the rectangle anchored at `(row, col)` spanning `row_span x col_span`.
///
/// Returns `Ok(true)` when a new merged region was registered. Re-applying
/// the same rectangle is a no-op.
pub fn apply_merge(
    canvas: &mut SpecSheetCanvas,
    row: u64,
    col: u64,
    row_span: u64,
    col_span: u64,
) -> Result<bool> {
    let (n_row_first, n_col_first) = cast_cell_num(row, col)?;
    let (n_row_last, n_col_last) = cast_cell_num(
        row.saturating_add(row_span.saturating_sub(1)),
        col.saturating_add(col_span.saturating_sub(1)),
    )?;

    canvas.merge_range(SpecMergeRange {
        row_first: n_row_first,
        col_first: n_col_first,
        row_last: n_row_last,
        col_last: n_col_last,
    })
}

/// Apply every merge descriptor of a sheet once per key.
///
/// Descriptors missing a span or with a zero span are skipped with a warning.
pub fn apply_merges(
    canvas: &mut SpecSheetCanvas,
    merges: &BTreeMap<String, SpecMergeDescriptor>,
    sheet_report: &mut SpecSheetReport,
    report: &mut SpecXlsxReport,
) -> Result<()> {
    for (c_key, descriptor) in merges {
        let (Some(n_row_span), Some(n_col_span)) = (descriptor.row_span, descriptor.col_span)
        else {
            warn!(sheet = %canvas.sheet_name, key = %c_key, "merge without span skipped");
            report.warn(format!(
                "sheet {:?}: merge {c_key:?} without span skipped",
                canvas.sheet_name
            ));
            sheet_report.cnt_merges_skipped += 1;
            continue;
        };
        if n_row_span == 0 || n_col_span == 0 {
            warn!(sheet = %canvas.sheet_name, key = %c_key, "merge with zero span skipped");
            report.warn(format!(
                "sheet {:?}: merge {c_key:?} with zero span skipped",
                canvas.sheet_name
            ));
            sheet_report.cnt_merges_skipped += 1;
            continue;
        }

        if apply_merge(canvas, descriptor.row, descriptor.col, n_row_span, n_col_span)? {
            sheet_report.cnt_merges += 1;
        } else {
            debug!(sheet = %canvas.sheet_name, key = %c_key, "merge resolved to no-op");
            sheet_report.cnt_merges_skipped += 1;
        }
    }
    Ok(())
}
