//! XLSX writer kernel that flushes staged sheet canvases into a workbook.

use std::collections::BTreeSet;
use std::path::PathBuf;

use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Formula, Workbook, Worksheet};
use tracing::{debug, info};

use crate::canvas::SpecSheetCanvas;
use crate::conf::{C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX};
use crate::error::{ConvertError, Result};
use crate::spec::{EnumBorderLineStyle, EnumCellValue, SpecCellStyle, SpecMergeRange};
use crate::util::{derive_rgb_value, sanitize_sheet_name};

/// Stateful workbook writer.
///
/// Exclusively owns the output workbook for one conversion: sheets are staged
/// as [`SpecSheetCanvas`] values and written to disk once by [`Self::close`].
pub struct XlsxWriter {
    path_file_out: PathBuf,
    sheet_name_default: String,
    l_canvases: Vec<SpecSheetCanvas>,
    set_sheet_names_existing: BTreeSet<String>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Self {
        Self::with_sheet_name_default(path_file_out, C_SHEET_NAME_DEFAULT)
    }

    /// Create writer with a custom fallback sheet name.
    pub fn with_sheet_name_default(
        path_file_out: impl Into<PathBuf>,
        sheet_name_default: &str,
    ) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            sheet_name_default: sheet_name_default.to_string(),
            l_canvases: Vec::new(),
            set_sheet_names_existing: BTreeSet::new(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Unique sheet names in creation order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.l_canvases
            .iter()
            .map(|canvas| canvas.sheet_name.clone())
            .collect()
    }

    /// Whether [`Self::close`] already succeeded.
    pub fn is_closed(&self) -> bool {
        self.if_closed
    }

    /// Create a new staged sheet named after `name` (sanitized, made unique).
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut SpecSheetCanvas> {
        if self.if_closed {
            return Err(ConvertError::WriterClosed);
        }
        let c_name_clean = sanitize_sheet_name(name, "_", &self.sheet_name_default);
        let c_name_unique = self.derive_unique_sheet_name(&c_name_clean);
        debug!(sheet_input = name, sheet = %c_name_unique, "sheet staged");

        self.l_canvases.push(SpecSheetCanvas::new(c_name_unique));
        let n_idx_last = self.l_canvases.len() - 1;
        Ok(&mut self.l_canvases[n_idx_last])
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.if_closed {
            return Ok(());
        }

        let mut workbook = Workbook::new();
        for canvas in &self.l_canvases {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&canvas.sheet_name)?;
            write_canvas(worksheet, canvas)?;
        }
        workbook.save(&self.path_file_out)?;

        info!(
            file_out = %self.path_file_out.display(),
            sheets = self.l_canvases.len(),
            "workbook saved"
        );
        self.if_closed = true;
        Ok(())
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        // Excel compares sheet names case-insensitively.
        if self.set_sheet_names_existing.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let mut n_idx = 2usize;
        loop {
            let c_suffix = format!("__{n_idx}");
            let n_len_base = N_LEN_EXCEL_SHEET_NAME_MAX
                .saturating_sub(c_suffix.chars().count())
                .max(1);
            let c_base: String = name.chars().take(n_len_base).collect();
            let candidate = format!("{c_base}{c_suffix}");
            if self.set_sheet_names_existing.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Write one staged canvas: dimensions, merges, then cells.
///
/// Merges are written before the cells so the anchor value overwrites the
/// blank text `merge_range` leaves in it.
fn write_canvas(worksheet: &mut Worksheet, canvas: &SpecSheetCanvas) -> Result<()> {
    for (n_col, n_width) in &canvas.col_widths {
        worksheet.set_column_width(*n_col, *n_width)?;
    }
    for (n_row, n_height) in &canvas.row_heights {
        worksheet.set_row_height(*n_row, *n_height)?;
    }

    for merge in &canvas.merges {
        let format = derive_merge_format(canvas, merge);
        worksheet.merge_range(
            merge.row_first,
            merge.col_first,
            merge.row_last,
            merge.col_last,
            "",
            &format,
        )?;
    }

    for ((n_row, n_col), cell) in &canvas.cells {
        if cell.value.is_none() && cell.style.is_default() {
            continue;
        }
        let format = derive_rust_xlsx_format(&cell.style);
        write_cell_with_format(worksheet, *n_row, *n_col, &cell.value, &format)?;
    }
    Ok(())
}

/// Font and fill of the merge anchor, shared by the blank cells of the range.
///
/// Borders stay per cell: the cells loop rewrites every styled cell with its
/// own format.
fn derive_merge_format(canvas: &SpecSheetCanvas, merge: &SpecMergeRange) -> Format {
    match canvas.cell(merge.row_first, merge.col_first) {
        Some(cell) => derive_rust_xlsx_format(&SpecCellStyle {
            font: cell.style.font.clone(),
            fill: cell.style.fill.clone(),
            ..Default::default()
        }),
        None => Format::new(),
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &EnumCellValue,
    format: &Format,
) -> Result<()> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(row, col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(row, col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(row, col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(row, col, *val, format)?;
        }
        EnumCellValue::Formula { text, cached } => {
            let formula = match derive_formula_result(cached) {
                Some(c_result) => Formula::new(text).set_result(c_result),
                None => Formula::new(text),
            };
            worksheet.write_formula_with_format(row, col, formula, format)?;
        }
    }
    Ok(())
}

fn derive_formula_result(value: &EnumCellValue) -> Option<String> {
    match value {
        EnumCellValue::String(val) => Some(val.clone()),
        EnumCellValue::Number(val) => Some(val.to_string()),
        EnumCellValue::Boolean(val) => Some(if *val { "TRUE" } else { "FALSE" }.to_string()),
        EnumCellValue::None | EnumCellValue::Formula { .. } => None,
    }
}

/// Convert a resolved cell style into a `rust_xlsxwriter` format.
pub fn derive_rust_xlsx_format(style: &SpecCellStyle) -> Format {
    let mut format = Format::new();

    if let Some(font) = &style.font {
        if let Some(val) = &font.name {
            format = format.set_font_name(val.as_str());
        }
        if let Some(val) = font.size {
            format = format.set_font_size(val);
        }
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if let Some(color) = font.color.as_deref().and_then(derive_color) {
            format = format.set_font_color(color);
        }
    }

    if let Some(color) = style
        .fill
        .as_ref()
        .and_then(|fill| derive_color(&fill.color))
    {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(color);
    }

    let border = &style.border;
    if let Some(edge) = &border.top {
        format = format.set_border_top(derive_format_border(edge.style));
        if let Some(color) = edge.color.as_deref().and_then(derive_color) {
            format = format.set_border_top_color(color);
        }
    }
    if let Some(edge) = &border.bottom {
        format = format.set_border_bottom(derive_format_border(edge.style));
        if let Some(color) = edge.color.as_deref().and_then(derive_color) {
            format = format.set_border_bottom_color(color);
        }
    }
    if let Some(edge) = &border.left {
        format = format.set_border_left(derive_format_border(edge.style));
        if let Some(color) = edge.color.as_deref().and_then(derive_color) {
            format = format.set_border_left_color(color);
        }
    }
    if let Some(edge) = &border.right {
        format = format.set_border_right(derive_format_border(edge.style));
        if let Some(color) = edge.color.as_deref().and_then(derive_color) {
            format = format.set_border_right_color(color);
        }
    }

    format
}

fn derive_color(hex: &str) -> Option<Color> {
    derive_rgb_value(hex).map(Color::RGB)
}

fn derive_format_border(style: EnumBorderLineStyle) -> FormatBorder {
    match style {
        EnumBorderLineStyle::Thin => FormatBorder::Thin,
        EnumBorderLineStyle::Hair => FormatBorder::Hair,
        EnumBorderLineStyle::Dotted => FormatBorder::Dotted,
        EnumBorderLineStyle::Dashed => FormatBorder::Dashed,
        EnumBorderLineStyle::DashDot => FormatBorder::DashDot,
        EnumBorderLineStyle::DashDotDot => FormatBorder::DashDotDot,
        EnumBorderLineStyle::Double => FormatBorder::Double,
        EnumBorderLineStyle::Medium => FormatBorder::Medium,
        EnumBorderLineStyle::MediumDashDot => FormatBorder::MediumDashDot,
        EnumBorderLineStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        EnumBorderLineStyle::MediumDashed => FormatBorder::MediumDashed,
        EnumBorderLineStyle::SlantDashDot => FormatBorder::SlantDashDot,
        EnumBorderLineStyle::Thick => FormatBorder::Thick,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spec::{SpecBorderEdge, SpecCellFill, SpecCellFont};

    #[test]
    fn test_add_sheet_names_are_sanitized_and_unique() {
        let mut writer = XlsxWriter::new("unused.xlsx");
        writer.add_sheet("Cell").expect("first");
        writer.add_sheet("Cell").expect("second");
        writer.add_sheet("a/b").expect("third");
        writer.add_sheet("").expect("fourth");

        assert_eq!(
            writer.sheet_names(),
            vec![
                "Cell".to_string(),
                "Cell__2".to_string(),
                "a_b".to_string(),
                "Sheet".to_string(),
            ]
        );
    }

    #[test]
    fn test_add_sheet_many_duplicates_of_long_name() {
        let c_name = "X".repeat(30);
        let mut writer = XlsxWriter::new("unused.xlsx");
        for _ in 0..12 {
            writer.add_sheet(&c_name).expect("sheet");
        }

        let l_names = writer.sheet_names();
        let set_names: BTreeSet<&String> = l_names.iter().collect();
        assert_eq!(set_names.len(), 12);
        assert!(l_names.iter().all(|name| name.chars().count() <= 31));
        assert_eq!(l_names[1], format!("{}__2", "X".repeat(28)));
        assert_eq!(l_names[9], format!("{}__10", "X".repeat(27)));
        assert_eq!(l_names[11], format!("{}__12", "X".repeat(27)));
    }

    #[test]
    fn test_add_sheet_names_differing_only_in_case_are_made_unique() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let mut writer = XlsxWriter::new(dir_tmp.path().join("case.xlsx"));
        writer.add_sheet("Data").expect("first");
        writer.add_sheet("data").expect("second");
        writer.add_sheet("DATA__2").expect("third");

        assert_eq!(
            writer.sheet_names(),
            vec![
                "Data".to_string(),
                "data__2".to_string(),
                "DATA__2__2".to_string(),
            ]
        );
        writer.close().expect("close");
    }

    #[test]
    fn test_derive_merge_format_keeps_font_and_fill_only() {
        let mut canvas = SpecSheetCanvas::new("S");
        let style = canvas.style_mut(0, 0);
        style.font = Some(SpecCellFont {
            bold: true,
            ..Default::default()
        });
        style.fill = Some(SpecCellFill {
            color: "ffd700".to_string(),
        });
        style.border.bottom = Some(SpecBorderEdge {
            style: EnumBorderLineStyle::Thick,
            color: None,
        });
        let merge = SpecMergeRange {
            row_first: 0,
            col_first: 0,
            row_last: 2,
            col_last: 0,
        };

        let format_expected = Format::new()
            .set_bold()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(0xFFD700));
        assert_eq!(
            format!("{:?}", derive_merge_format(&canvas, &merge)),
            format!("{format_expected:?}")
        );

        let canvas_empty = SpecSheetCanvas::new("S");
        assert_eq!(
            format!("{:?}", derive_merge_format(&canvas_empty, &merge)),
            format!("{:?}", Format::new())
        );
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_new_sheets() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_out = dir_tmp.path().join("out.xlsx");
        let mut writer = XlsxWriter::new(&path_out);
        let canvas = writer.add_sheet("S").expect("sheet");
        canvas.set_value(0, 0, EnumCellValue::Number(1.0));

        writer.close().expect("close");
        writer.close().expect("close twice");

        assert!(writer.is_closed());
        assert!(path_out.exists());
        assert!(matches!(
            writer.add_sheet("T"),
            Err(ConvertError::WriterClosed)
        ));
    }

    #[test]
    fn test_derive_rust_xlsx_format_default_style_is_plain() {
        assert_eq!(
            format!("{:?}", derive_rust_xlsx_format(&SpecCellStyle::default())),
            format!("{:?}", Format::new())
        );
    }

    #[test]
    fn test_derive_rust_xlsx_format_maps_every_facet() {
        let style = SpecCellStyle {
            border: crate::spec::SpecCellBorder {
                left: Some(SpecBorderEdge {
                    style: EnumBorderLineStyle::MediumDashDotDot,
                    color: Some("ff0000".to_string()),
                }),
                ..Default::default()
            },
            font: Some(SpecCellFont {
                name: Some("Arial".to_string()),
                size: Some(11.0),
                bold: true,
                italic: false,
                color: Some("333333".to_string()),
            }),
            fill: Some(SpecCellFill {
                color: "1e90ff".to_string(),
            }),
        };

        let format_expected = Format::new()
            .set_font_name("Arial")
            .set_font_size(11.0)
            .set_bold()
            .set_font_color(Color::RGB(0x333333))
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(0x1E90FF))
            .set_border_left(FormatBorder::MediumDashDotDot)
            .set_border_left_color(Color::RGB(0xFF0000));

        assert_eq!(
            format!("{:?}", derive_rust_xlsx_format(&style)),
            format!("{format_expected:?}")
        );
    }

    #[test]
    fn test_derive_formula_result() {
        assert_eq!(
            derive_formula_result(&EnumCellValue::Number(0.0)).as_deref(),
            Some("0")
        );
        assert_eq!(derive_formula_result(&EnumCellValue::None), None);
    }
}
