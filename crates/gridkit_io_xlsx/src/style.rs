//! Style resolution engine.
//!
//! Turns the ordered border declarations and per-cell rich values of one
//! input sheet into the flattened style of every staged cell:
//! - cell-scoped borders are additive per edge;
//! - range-scoped borders paint edges according to the border type and the
//!   configured [`EnumRangeBorderPolicy`];
//! - font and fill are replaced wholesale by each cell entry.
//!
//! Declarations are applied in document order, so a later declaration for the
//! same edge of the same cell wins.

use tracing::{debug, warn};

use crate::canvas::SpecSheetCanvas;
use crate::document::{
    EnumBorderDeclaration, EnumCellPayload, EnumFlexScalar, SpecCellBorderDeclaration,
    SpecCellEntry, SpecEdgeDeclaration, SpecRangeRect, SpecRichValue, derive_literal_value,
};
use crate::error::Result;
use crate::spec::{
    EnumBorderSide, EnumCellValue, EnumRangeBorderPolicy, EnumRangeBorderType, SpecBorderEdge,
    SpecCellFill, SpecCellFont, SpecConvertOptions, SpecSheetReport, SpecXlsxReport,
};
use crate::util::{cast_cell_num, resolve_border_line_style, resolve_color, resolve_font_family};

const TUP_BORDER_SIDES: [EnumBorderSide; 4] = [
    EnumBorderSide::Left,
    EnumBorderSide::Right,
    EnumBorderSide::Top,
    EnumBorderSide::Bottom,
];

////////////////////////////////////////////////////////////////////////////////
// #region ColorAndEdge

/// Resolve a color spec, recording a warning when it cannot be parsed.
///
/// Blank specs are treated as absent.
pub fn resolve_color_or_warn(
    spec: &str,
    context: &str,
    report: &mut SpecXlsxReport,
) -> Option<String> {
    if spec.trim().is_empty() {
        return None;
    }
    let c_hex = resolve_color(spec);
    if c_hex.is_none() {
        warn!(color = spec, context, "unresolvable color left unset");
        report.warn(format!("{context}: unresolvable color {spec:?} left unset"));
    }
    c_hex
}

/// Build one border edge from a style id and a color spec.
pub fn resolve_border_edge(
    style_id: Option<&EnumFlexScalar>,
    color: Option<&str>,
    context: &str,
    report: &mut SpecXlsxReport,
) -> SpecBorderEdge {
    SpecBorderEdge {
        style: style_id.map(resolve_border_line_style).unwrap_or_default(),
        color: color.and_then(|c_spec| resolve_color_or_warn(c_spec, context, report)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Borders

/// Apply a cell-scoped border declaration.
///
/// Only the edges present in the declaration are written; the other edges of
/// the target cell keep whatever earlier declarations set.
pub fn apply_cell_border(
    canvas: &mut SpecSheetCanvas,
    declaration: &SpecCellBorderDeclaration,
    report: &mut SpecXlsxReport,
) -> Result<()> {
    let (n_row, n_col) = cast_cell_num(declaration.row_index, declaration.col_index)?;
    let c_context = format!("sheet {:?} cell ({n_row}, {n_col}) border", canvas.sheet_name);

    let l_edge_decls: [(EnumBorderSide, &Option<SpecEdgeDeclaration>); 4] = [
        (EnumBorderSide::Left, &declaration.left),
        (EnumBorderSide::Right, &declaration.right),
        (EnumBorderSide::Top, &declaration.top),
        (EnumBorderSide::Bottom, &declaration.bottom),
    ];

    let l_edges: Vec<(EnumBorderSide, SpecBorderEdge)> = l_edge_decls
        .into_iter()
        .filter_map(|(side, edge_decl)| {
            edge_decl.as_ref().map(|edge_decl| {
                let edge = resolve_border_edge(
                    edge_decl.style.as_ref(),
                    edge_decl.color.as_deref(),
                    &c_context,
                    report,
                );
                (side, edge)
            })
        })
        .collect();

    let border = &mut canvas.style_mut(n_row, n_col).border;
    for (side, edge) in l_edges {
        *border.edge_mut(side) = Some(edge);
    }
    Ok(())
}

/// Sides of cell `(row, col)` a range declaration touches.
///
/// `bounds` is `(row_first, row_last, col_first, col_last)`, inclusive.
pub fn derive_range_edge_sides(
    border_type: EnumRangeBorderType,
    policy: EnumRangeBorderPolicy,
    row: u32,
    col: u16,
    bounds: (u32, u32, u16, u16),
) -> Vec<EnumBorderSide> {
    let (n_row_first, n_row_last, n_col_first, n_col_last) = bounds;

    if policy == EnumRangeBorderPolicy::PaintAll {
        return TUP_BORDER_SIDES.to_vec();
    }

    let (if_left, if_right, if_top, if_bottom) = match border_type {
        EnumRangeBorderType::All | EnumRangeBorderType::None => (true, true, true, true),
        EnumRangeBorderType::Outside => (
            col == n_col_first,
            col == n_col_last,
            row == n_row_first,
            row == n_row_last,
        ),
        EnumRangeBorderType::Inside => (
            col > n_col_first,
            col < n_col_last,
            row > n_row_first,
            row < n_row_last,
        ),
        EnumRangeBorderType::Horizontal => (false, false, row > n_row_first, row < n_row_last),
        EnumRangeBorderType::Vertical => (col > n_col_first, col < n_col_last, false, false),
        EnumRangeBorderType::Left => (col == n_col_first, false, false, false),
        EnumRangeBorderType::Right => (false, col == n_col_last, false, false),
        EnumRangeBorderType::Top => (false, false, row == n_row_first, false),
        EnumRangeBorderType::Bottom => (false, false, false, row == n_row_last),
    };

    TUP_BORDER_SIDES
        .into_iter()
        .zip([if_left, if_right, if_top, if_bottom])
        .filter_map(|(side, if_touch)| if_touch.then_some(side))
        .collect()
}

/// Apply one range-scoped declaration to one rectangle.
///
/// With [`EnumRangeBorderPolicy::Positional`] a `none` type clears the touched
/// edges; every other combination writes `edge` to them.
pub fn apply_range_border(
    canvas: &mut SpecSheetCanvas,
    rect: &SpecRangeRect,
    border_type: EnumRangeBorderType,
    edge: &SpecBorderEdge,
    policy: EnumRangeBorderPolicy,
) -> Result<()> {
    let (n_row_first, n_row_last, n_col_first, n_col_last) = rect.normalized();
    let (n_row_first, n_col_first) = cast_cell_num(n_row_first, n_col_first)?;
    let (n_row_last, n_col_last) = cast_cell_num(n_row_last, n_col_last)?;
    let bounds = (n_row_first, n_row_last, n_col_first, n_col_last);

    let if_clear =
        policy == EnumRangeBorderPolicy::Positional && border_type == EnumRangeBorderType::None;

    for n_row in n_row_first..=n_row_last {
        for n_col in n_col_first..=n_col_last {
            let l_sides = derive_range_edge_sides(border_type, policy, n_row, n_col, bounds);
            if l_sides.is_empty() {
                continue;
            }
            let border = &mut canvas.style_mut(n_row, n_col).border;
            for side in l_sides {
                *border.edge_mut(side) = if if_clear { None } else { Some(edge.clone()) };
            }
        }
    }
    Ok(())
}

/// Apply all border declarations of a sheet in document order.
pub fn apply_border_declarations(
    canvas: &mut SpecSheetCanvas,
    declarations: &[EnumBorderDeclaration],
    policy: EnumRangeBorderPolicy,
    sheet_report: &mut SpecSheetReport,
    report: &mut SpecXlsxReport,
) -> Result<()> {
    for declaration in declarations {
        match declaration {
            EnumBorderDeclaration::Cell { value } => {
                apply_cell_border(canvas, value, report)?;
                sheet_report.cnt_borders_cell += 1;
            }
            EnumBorderDeclaration::Range {
                border_type,
                style,
                color,
                range,
            } => {
                let border_type = derive_range_border_type(
                    border_type.as_deref(),
                    &canvas.sheet_name,
                    report,
                );
                let c_context = format!("sheet {:?} range border", canvas.sheet_name);
                let edge =
                    resolve_border_edge(style.as_ref(), color.as_deref(), &c_context, report);

                for rect in range {
                    apply_range_border(canvas, rect, border_type, &edge, policy)?;
                    sheet_report.cnt_borders_range += 1;
                }
            }
        }
    }
    Ok(())
}

fn derive_range_border_type(
    border_type: Option<&str>,
    sheet_name: &str,
    report: &mut SpecXlsxReport,
) -> EnumRangeBorderType {
    let Some(c_type) = border_type else {
        debug!(sheet = sheet_name, "range border without type painted as all");
        return EnumRangeBorderType::All;
    };
    EnumRangeBorderType::parse(c_type).unwrap_or_else(|| {
        warn!(sheet = sheet_name, border_type = c_type, "unknown border type painted as all");
        report.warn(format!(
            "sheet {sheet_name:?}: unknown border type {c_type:?} painted as all"
        ));
        EnumRangeBorderType::All
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FontFillValue

/// Resolve the font facet of a rich value; `None` when nothing is set.
///
/// Unknown font family ids are fatal.
pub fn resolve_font(
    rich: &SpecRichValue,
    context: &str,
    report: &mut SpecXlsxReport,
) -> Result<Option<SpecCellFont>> {
    let font = SpecCellFont {
        name: match &rich.ff {
            Some(family_id) => Some(resolve_font_family(family_id)?.to_string()),
            None => None,
        },
        size: rich
            .fs
            .as_ref()
            .and_then(EnumFlexScalar::as_f64)
            .filter(|n_size| *n_size > 0.0),
        bold: rich.bl.as_ref().is_some_and(EnumFlexScalar::is_set),
        italic: rich.it.as_ref().is_some_and(EnumFlexScalar::is_set),
        color: rich
            .fc
            .as_deref()
            .and_then(|c_spec| resolve_color_or_warn(c_spec, context, report)),
    };
    Ok((font != SpecCellFont::default()).then_some(font))
}

/// Replace the font and fill of `(row, col)` with those of `rich`.
///
/// A rich value without background clears an earlier fill.
pub fn apply_font_and_fill(
    canvas: &mut SpecSheetCanvas,
    row: u32,
    col: u16,
    rich: &SpecRichValue,
    report: &mut SpecXlsxReport,
) -> Result<()> {
    let c_context = format!("sheet {:?} cell ({row}, {col})", canvas.sheet_name);
    let font = resolve_font(rich, &c_context, report)?;
    let fill = rich
        .bg
        .as_deref()
        .and_then(|c_spec| resolve_color_or_warn(c_spec, &c_context, report))
        .map(|color| SpecCellFill { color });

    let style = canvas.style_mut(row, col);
    style.font = font;
    style.fill = fill;
    Ok(())
}

/// Literal value of a rich cell, wrapped as a formula when `f` is set and
/// formulas are enabled. Formulas are never evaluated.
pub fn derive_cell_value(rich: &SpecRichValue, if_write_formulas: bool) -> EnumCellValue {
    let value = rich.literal_value().unwrap_or_default();
    match rich.f.as_deref().map(str::trim) {
        Some(c_formula) if if_write_formulas && !c_formula.is_empty() => EnumCellValue::Formula {
            text: c_formula.to_string(),
            cached: Box::new(value),
        },
        _ => value,
    }
}

/// Apply one cell entry: value first, then font and fill.
pub fn apply_cell_entry(
    canvas: &mut SpecSheetCanvas,
    entry: &SpecCellEntry,
    options: &SpecConvertOptions,
    report: &mut SpecXlsxReport,
) -> Result<()> {
    let (n_row, n_col) = cast_cell_num(entry.row, entry.col)?;

    match &entry.payload {
        None => {
            debug!(sheet = %canvas.sheet_name, row = n_row, col = n_col, "cell without value");
            canvas.set_value(n_row, n_col, EnumCellValue::None);
        }
        Some(EnumCellPayload::Literal(value)) => {
            let value = derive_literal_value(value).unwrap_or_else(|| {
                debug!(sheet = %canvas.sheet_name, row = n_row, col = n_col, "unusable literal value");
                EnumCellValue::None
            });
            canvas.set_value(n_row, n_col, value);
        }
        Some(EnumCellPayload::Rich(rich)) => {
            for c_key in &rich.fields_invalid {
                warn!(
                    sheet = %canvas.sheet_name,
                    row = n_row,
                    col = n_col,
                    key = %c_key,
                    "mistyped field ignored"
                );
                report.warn(format!(
                    "sheet {:?} cell ({n_row}, {n_col}): field {c_key:?} has an unexpected type, ignored",
                    canvas.sheet_name
                ));
            }
            let value = derive_cell_value(rich, options.if_write_formulas);
            if value.is_none() {
                debug!(sheet = %canvas.sheet_name, row = n_row, col = n_col, "cell without value");
            }
            canvas.set_value(n_row, n_col, value);
            apply_font_and_fill(canvas, n_row, n_col, rich, report)?;
        }
    }
    Ok(())
}

/// Apply all cell entries in input order; the last entry for a coordinate wins.
pub fn apply_cell_entries(
    canvas: &mut SpecSheetCanvas,
    entries: &[SpecCellEntry],
    options: &SpecConvertOptions,
    sheet_report: &mut SpecSheetReport,
    report: &mut SpecXlsxReport,
) -> Result<()> {
    for entry in entries {
        apply_cell_entry(canvas, entry, options, report)?;
        sheet_report.cnt_cells += 1;
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
