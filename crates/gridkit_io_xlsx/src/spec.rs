//! Shared output-side style models, options and reports.

use std::fmt;

use crate::conf::{C_SHEET_NAME_DEFAULT, N_WIDTH_UNIT_DIVISOR};
use crate::util::derive_cell_ref;

////////////////////////////////////////////////////////////////////////////////
// #region BorderSpecification

/// Named border line style of the target workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumBorderLineStyle {
    /// Thin line (also the fallback for unknown ids).
    #[default]
    Thin,
    /// Hairline.
    Hair,
    /// Dotted line.
    Dotted,
    /// Dashed line.
    Dashed,
    /// Dash-dot line.
    DashDot,
    /// Dash-dot-dot line.
    DashDotDot,
    /// Double line.
    Double,
    /// Medium line.
    Medium,
    /// Medium dash-dot line.
    MediumDashDot,
    /// Medium dash-dot-dot line.
    MediumDashDotDot,
    /// Medium dashed line.
    MediumDashed,
    /// Slanted dash-dot line.
    SlantDashDot,
    /// Thick line.
    Thick,
}

impl EnumBorderLineStyle {
    /// Style name as spelled in SpreadsheetML.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Hair => "hair",
            Self::Dotted => "dotted",
            Self::Dashed => "dashed",
            Self::DashDot => "dashDot",
            Self::DashDotDot => "dashDotDot",
            Self::Double => "double",
            Self::Medium => "medium",
            Self::MediumDashDot => "mediumDashDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::MediumDashed => "mediumDashed",
            Self::SlantDashDot => "slantDashDot",
            Self::Thick => "thick",
        }
    }
}

impl fmt::Display for EnumBorderLineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which edges of a rectangle a range-scoped border declaration paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRangeBorderType {
    /// Clear every edge of every cell.
    None,
    /// Every edge of every cell.
    All,
    /// Perimeter edges only.
    Outside,
    /// Edges shared by two cells of the rectangle.
    Inside,
    /// Interior horizontal edges.
    Horizontal,
    /// Interior vertical edges.
    Vertical,
    /// Left side of the perimeter.
    Left,
    /// Right side of the perimeter.
    Right,
    /// Top side of the perimeter.
    Top,
    /// Bottom side of the perimeter.
    Bottom,
}

impl EnumRangeBorderType {
    /// Parse `border-all`, `all`, `border-outside`, ... (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let c_value = value.trim().to_ascii_lowercase();
        let c_kind = c_value.strip_prefix("border-").unwrap_or(&c_value);
        match c_kind {
            "none" => Some(Self::None),
            "all" => Some(Self::All),
            "outside" => Some(Self::Outside),
            "inside" => Some(Self::Inside),
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// One side of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBorderSide {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

/// Resolved style and color of one cell edge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecBorderEdge {
    /// Line style.
    pub style: EnumBorderLineStyle,
    /// Six-digit lowercase hex color; `None` leaves the color unset.
    pub color: Option<String>,
}

/// Per-edge border state of a cell. `None` means "no border on this edge".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCellBorder {
    /// Left edge.
    pub left: Option<SpecBorderEdge>,
    /// Right edge.
    pub right: Option<SpecBorderEdge>,
    /// Top edge.
    pub top: Option<SpecBorderEdge>,
    /// Bottom edge.
    pub bottom: Option<SpecBorderEdge>,
}

impl SpecCellBorder {
    /// Build a border with the same edge on all four sides.
    pub fn uniform(edge: SpecBorderEdge) -> Self {
        Self {
            left: Some(edge.clone()),
            right: Some(edge.clone()),
            top: Some(edge.clone()),
            bottom: Some(edge),
        }
    }

    /// Mutable access to one edge slot.
    pub fn edge_mut(&mut self, side: EnumBorderSide) -> &mut Option<SpecBorderEdge> {
        match side {
            EnumBorderSide::Left => &mut self.left,
            EnumBorderSide::Right => &mut self.right,
            EnumBorderSide::Top => &mut self.top,
            EnumBorderSide::Bottom => &mut self.bottom,
        }
    }

    /// Whether no edge is set.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellStyleSpecification

/// Resolved font of a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCellFont {
    /// Font family name.
    pub name: Option<String>,
    /// Font size in points.
    pub size: Option<f64>,
    /// Bold style.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Six-digit lowercase hex color.
    pub color: Option<String>,
}

/// Solid background fill of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCellFill {
    /// Six-digit lowercase hex color.
    pub color: String,
}

/// Flattened visual style of one output cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCellStyle {
    /// Border facet.
    pub border: SpecCellBorder,
    /// Font facet.
    pub font: Option<SpecCellFont>,
    /// Fill facet.
    pub fill: Option<SpecCellFill>,
}

impl SpecCellStyle {
    /// Whether the style would render as a default cell.
    pub fn is_default(&self) -> bool {
        self.border.is_empty() && self.font.is_none() && self.fill.is_none()
    }
}

/// Literal cell value written to the workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Formula text copied verbatim, with the literal value as cached result.
    Formula {
        /// Formula text, including the leading `=`.
        text: String,
        /// Cached result shown until the workbook is recalculated.
        cached: Box<EnumCellValue>,
    },
}

impl EnumCellValue {
    /// Whether the value is blank.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeSpecification

/// Inclusive, zero-based merged rectangle on an output sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecMergeRange {
    /// First row (inclusive).
    pub row_first: u32,
    /// First column (inclusive).
    pub col_first: u16,
    /// Last row (inclusive).
    pub row_last: u32,
    /// Last column (inclusive).
    pub col_last: u16,
}

impl SpecMergeRange {
    /// Whether the two rectangles share at least one cell.
    pub fn overlaps(&self, other: &SpecMergeRange) -> bool {
        self.row_first <= other.row_last
            && other.row_first <= self.row_last
            && self.col_first <= other.col_last
            && other.col_first <= self.col_last
    }

    /// Whether the rectangle covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.row_first == self.row_last && self.col_first == self.col_last
    }

    /// A1-style reference, e.g. `F14:F16`.
    pub fn to_a1_ref(&self) -> String {
        format!(
            "{}:{}",
            derive_cell_ref(self.row_first, self.col_first),
            derive_cell_ref(self.row_last, self.col_last)
        )
    }
}

impl fmt::Display for SpecMergeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_ref())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConvertOptions

/// How range-scoped border declarations pick the edges they paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumRangeBorderPolicy {
    /// Honor the declared border type by cell position (default).
    #[default]
    Positional,
    /// Paint all four edges of every cell regardless of the declared type.
    PaintAll,
}

/// Which input sheets are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumSheetSelection {
    /// One output sheet per input sheet (default).
    #[default]
    All,
    /// Only the first input sheet.
    First,
}

/// Conversion options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecConvertOptions {
    /// Input column-width units per output width unit.
    pub width_unit_divisor: f64,
    /// Range border edge-selection policy.
    pub range_border_policy: EnumRangeBorderPolicy,
    /// Sheet materialization policy.
    pub sheet_selection: EnumSheetSelection,
    /// Write `f` formula text (with cached value) instead of the bare value.
    pub if_write_formulas: bool,
    /// Name used for sheets without a usable name.
    pub sheet_name_default: String,
}

impl Default for SpecConvertOptions {
    fn default() -> Self {
        Self {
            width_unit_divisor: N_WIDTH_UNIT_DIVISOR,
            range_border_policy: EnumRangeBorderPolicy::Positional,
            sheet_selection: EnumSheetSelection::All,
            if_write_formulas: true,
            sheet_name_default: C_SHEET_NAME_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet conversion counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSheetReport {
    /// Sheet name as given in the input document.
    pub sheet_name_input: String,
    /// Actual unique sheet name in the workbook.
    pub sheet_name: String,
    /// Cell entries applied.
    pub cnt_cells: u64,
    /// Cell-scoped border declarations applied.
    pub cnt_borders_cell: u64,
    /// Range rectangles painted by range-scoped declarations.
    pub cnt_borders_range: u64,
    /// Merged regions declared.
    pub cnt_merges: u64,
    /// Merge descriptors that resolved to a no-op.
    pub cnt_merges_skipped: u64,
    /// Columns with an explicit width.
    pub cnt_columns_sized: u64,
    /// Rows with an explicit height.
    pub cnt_rows_sized: u64,
}

/// Report of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// One entry per materialized sheet.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let n_cells: u64 = self.sheets.iter().map(|sheet| sheet.cnt_cells).sum();
        let n_merges: u64 = self.sheets.iter().map(|sheet| sheet.cnt_merges).sum();
        format!(
            "{prefix} sheets={} cells={n_cells} merges={n_merges} warnings={}",
            self.sheets.len(),
            self.warning_count()
        )
    }
}

impl fmt::Display for SpecXlsxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[XLSX]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
