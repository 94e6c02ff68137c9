//! Geometry & dimension mapper.

use std::collections::BTreeMap;

use tracing::debug;

use crate::canvas::SpecSheetCanvas;
use crate::error::Result;
use crate::util::{cast_col_num, cast_row_num};

/// Set column widths from a sparse `column -> width unit` overlay.
///
/// Each width is divided by `width_unit_divisor`. Returns the number of
/// columns sized.
pub fn apply_column_widths(
    canvas: &mut SpecSheetCanvas,
    column_widths: &BTreeMap<u32, f64>,
    width_unit_divisor: f64,
) -> Result<u64> {
    let mut n_sized = 0u64;
    for (n_col, n_width_unit) in column_widths {
        let n_col_out = cast_col_num(u64::from(*n_col))?;
        let n_width = n_width_unit / width_unit_divisor;
        debug!(sheet = %canvas.sheet_name, col = n_col_out, width = n_width, "column width");
        canvas.set_column_width(n_col_out, n_width);
        n_sized += 1;
    }
    Ok(n_sized)
}

/// Set row heights from a sparse `row -> height` overlay, without conversion.
pub fn apply_row_heights(
    canvas: &mut SpecSheetCanvas,
    row_heights: &BTreeMap<u32, f64>,
) -> Result<u64> {
    let mut n_sized = 0u64;
    for (n_row, n_height) in row_heights {
        let n_row_out = cast_row_num(u64::from(*n_row))?;
        canvas.set_row_height(n_row_out, *n_height);
        n_sized += 1;
    }
    Ok(n_sized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::N_WIDTH_UNIT_DIVISOR;

    #[test]
    fn test_apply_column_widths_divides_units() {
        let mut canvas = SpecSheetCanvas::new("S");
        let dict_widths = BTreeMap::from([(0u32, 131.0), (10u32, 144.0)]);

        let n_sized = apply_column_widths(&mut canvas, &dict_widths, N_WIDTH_UNIT_DIVISOR)
            .expect("apply widths");

        assert_eq!(n_sized, 2);
        assert!((canvas.col_widths[&0] - 13.1).abs() < 1e-9);
        assert!((canvas.col_widths[&10] - 14.4).abs() < 1e-9);
        assert!(!canvas.col_widths.contains_key(&1));
    }

    #[test]
    fn test_apply_row_heights_is_direct() {
        let mut canvas = SpecSheetCanvas::new("S");
        let dict_heights = BTreeMap::from([(17u32, 31.0)]);

        apply_row_heights(&mut canvas, &dict_heights).expect("apply heights");

        assert_eq!(canvas.row_heights.get(&17), Some(&31.0));
        assert_eq!(canvas.row_heights.len(), 1);
    }

    #[test]
    fn test_apply_column_widths_rejects_columns_beyond_limit() {
        let mut canvas = SpecSheetCanvas::new("S");
        let dict_widths = BTreeMap::from([(16_384u32, 10.0)]);

        assert!(apply_column_widths(&mut canvas, &dict_widths, 10.0).is_err());
    }
}
