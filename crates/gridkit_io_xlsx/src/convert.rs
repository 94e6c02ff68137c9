//! Conversion orchestration: document in, workbook file and report out.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::{SpecDocument, SpecSheet};
use crate::error::{ConvertError, Result};
use crate::geometry::{apply_column_widths, apply_row_heights};
use crate::merge::apply_merges;
use crate::spec::{EnumSheetSelection, SpecConvertOptions, SpecSheetReport, SpecXlsxReport};
use crate::style::{apply_border_declarations, apply_cell_entries};
use crate::writer::XlsxWriter;

/// Convert one input sheet into a new staged sheet of `writer`.
///
/// Order: dimensions, border declarations, cell values with fonts and fills,
/// merges.
pub fn convert_sheet(
    writer: &mut XlsxWriter,
    sheet: &SpecSheet,
    options: &SpecConvertOptions,
    report: &mut SpecXlsxReport,
) -> Result<SpecSheetReport> {
    let c_name_input = sheet
        .name
        .clone()
        .unwrap_or_else(|| options.sheet_name_default.clone());
    let canvas = writer.add_sheet(&c_name_input)?;

    let mut sheet_report = SpecSheetReport {
        sheet_name_input: c_name_input,
        sheet_name: canvas.sheet_name.clone(),
        ..Default::default()
    };
    let config = &sheet.config;

    sheet_report.cnt_columns_sized =
        apply_column_widths(canvas, &config.column_widths, options.width_unit_divisor)?;
    sheet_report.cnt_rows_sized = apply_row_heights(canvas, &config.row_heights)?;
    apply_border_declarations(
        canvas,
        &config.border_declarations,
        options.range_border_policy,
        &mut sheet_report,
        report,
    )?;
    apply_cell_entries(canvas, &sheet.cells, options, &mut sheet_report, report)?;
    apply_merges(canvas, &config.merges, &mut sheet_report, report)?;

    info!(
        sheet = %sheet_report.sheet_name,
        cells = sheet_report.cnt_cells,
        borders_cell = sheet_report.cnt_borders_cell,
        borders_range = sheet_report.cnt_borders_range,
        merges = sheet_report.cnt_merges,
        "sheet converted"
    );
    Ok(sheet_report)
}

/// Convert a parsed document and save the workbook to `path_file_out`.
///
/// Any fatal error aborts the conversion before the workbook is saved.
pub fn convert_document(
    document: &SpecDocument,
    path_file_out: impl Into<PathBuf>,
    options: &SpecConvertOptions,
) -> Result<SpecXlsxReport> {
    validate_convert_options(options)?;
    if document.sheets.is_empty() {
        return Err(ConvertError::EmptyDocument);
    }

    let l_sheets = match options.sheet_selection {
        EnumSheetSelection::All => &document.sheets[..],
        EnumSheetSelection::First => &document.sheets[..1],
    };

    let mut writer =
        XlsxWriter::with_sheet_name_default(path_file_out, &options.sheet_name_default);
    let mut report = SpecXlsxReport::default();
    for sheet in l_sheets {
        let sheet_report = convert_sheet(&mut writer, sheet, options, &mut report)?;
        report.sheets.push(sheet_report);
    }
    writer.close()?;

    info!(file_out = %writer.file_out(), "{report}");
    Ok(report)
}

/// Parse a JSON payload and convert it.
pub fn convert_json_str(
    payload: &str,
    path_file_out: impl Into<PathBuf>,
    options: &SpecConvertOptions,
) -> Result<SpecXlsxReport> {
    let document = SpecDocument::from_json_str(payload)?;
    convert_document(&document, path_file_out, options)
}

/// Parse a JSON byte stream and convert it.
pub fn convert_json_reader<R: Read>(
    reader: R,
    path_file_out: impl Into<PathBuf>,
    options: &SpecConvertOptions,
) -> Result<SpecXlsxReport> {
    let document = SpecDocument::from_reader(reader)?;
    convert_document(&document, path_file_out, options)
}

/// Read a JSON file and convert it.
pub fn convert_json_file(
    path_file_in: &Path,
    path_file_out: impl Into<PathBuf>,
    options: &SpecConvertOptions,
) -> Result<SpecXlsxReport> {
    let file_in = File::open(path_file_in)?;
    convert_json_reader(BufReader::new(file_in), path_file_out, options)
}

fn validate_convert_options(options: &SpecConvertOptions) -> Result<()> {
    if !(options.width_unit_divisor.is_finite() && options.width_unit_divisor > 0.0) {
        return Err(ConvertError::InvalidOptions(format!(
            "width_unit_divisor must be a positive number, got {}",
            options.width_unit_divisor
        )));
    }
    Ok(())
}
