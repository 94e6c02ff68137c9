//! `gridkit_io_xlsx` v1:
//! Luckysheet-style JSON document to styled XLSX workbook converter.
//!
//! Module layout:
//! - `conf`     : constants and id tables
//! - `spec`     : output-side models, options and reports
//! - `document` : serde input model
//! - `util`     : pure helper functions
//! - `canvas`   : staged target sheet
//! - `geometry` : column width / row height mapper
//! - `style`    : border, font and fill resolution engine
//! - `merge`    : merge applier
//! - `convert`  : per-sheet and per-document orchestration
//! - `writer`   : workbook writer kernel
//! - `error`    : error type
//! - `cli`      : command-line surface
pub mod canvas;
pub mod cli;
pub mod conf;
pub mod convert;
pub mod document;
pub mod error;
pub mod geometry;
pub mod merge;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use canvas::{SpecCanvasCell, SpecSheetCanvas};
pub use conf::{
    C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_WIDTH_UNIT_DIVISOR, TUP_EXCEL_ILLEGAL, derive_default_convert_options,
};
pub use convert::{
    convert_document, convert_json_file, convert_json_reader, convert_json_str, convert_sheet,
};
pub use document::{
    EnumBorderDeclaration, EnumCellPayload, EnumFlexScalar, SpecCellBorderDeclaration,
    SpecCellEntry, SpecDocument, SpecEdgeDeclaration, SpecMergeDescriptor, SpecRangeRect,
    SpecRichValue, SpecSheet, SpecSheetConfig,
};
pub use error::{ConvertError, Result};
pub use geometry::{apply_column_widths, apply_row_heights};
pub use merge::{apply_merge, apply_merges};
pub use spec::{
    EnumBorderLineStyle, EnumBorderSide, EnumCellValue, EnumRangeBorderPolicy,
    EnumRangeBorderType, EnumSheetSelection, SpecBorderEdge, SpecCellBorder, SpecCellFill,
    SpecCellFont, SpecCellStyle, SpecConvertOptions, SpecMergeRange, SpecSheetReport,
    SpecXlsxReport,
};
pub use style::{
    apply_border_declarations, apply_cell_border, apply_cell_entries, apply_font_and_fill,
    apply_range_border,
};
pub use util::{resolve_border_line_style, resolve_color, resolve_font_family, sanitize_sheet_name};
pub use writer::XlsxWriter;
