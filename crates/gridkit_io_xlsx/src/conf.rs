//! XLSX constants, lookup tables and default option factories.

use crate::spec::{EnumBorderLineStyle, SpecConvertOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: u32 = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: u32 = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Sheet name used when the input sheet has no usable name.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet";
/// Input column-width units per workbook column-width unit.
pub const N_WIDTH_UNIT_DIVISOR: f64 = 10.0;

/// Border line styles keyed by input style id.
///
/// Ids outside the table resolve to [`EnumBorderLineStyle::Thin`].
pub const TUP_BORDER_LINE_STYLES: [(i64, EnumBorderLineStyle); 13] = [
    (1, EnumBorderLineStyle::Thin),
    (2, EnumBorderLineStyle::Hair),
    (3, EnumBorderLineStyle::Dotted),
    (4, EnumBorderLineStyle::Dashed),
    (5, EnumBorderLineStyle::DashDot),
    (6, EnumBorderLineStyle::DashDotDot),
    (7, EnumBorderLineStyle::Double),
    (8, EnumBorderLineStyle::Medium),
    (9, EnumBorderLineStyle::MediumDashDot),
    (10, EnumBorderLineStyle::MediumDashDotDot),
    (11, EnumBorderLineStyle::MediumDashed),
    (12, EnumBorderLineStyle::SlantDashDot),
    (13, EnumBorderLineStyle::Thick),
];

/// Font family names keyed by input family id.
///
/// Id 12 maps to `"thick"`; the entry is kept as-is for output compatibility.
pub const TUP_FONT_FAMILIES: [(i64, &str); 13] = [
    (0, "Times New Roman"),
    (1, "Arial"),
    (2, "Verdana"),
    (3, "微软雅黑"),
    (4, "宋体"),
    (5, "黑体"),
    (6, "楷体"),
    (7, "仿宋"),
    (8, "新宋体"),
    (9, "华文新魏"),
    (10, "华文行楷"),
    (11, "华文隶书"),
    (12, "thick"),
];

/// Build default conversion options.
pub fn derive_default_convert_options() -> SpecConvertOptions {
    SpecConvertOptions::default()
}
