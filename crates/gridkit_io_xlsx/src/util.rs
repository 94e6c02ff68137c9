//! Stateless helpers shared by the resolution engine and the writer.

use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_BORDER_LINE_STYLES,
    TUP_EXCEL_ILLEGAL, TUP_FONT_FAMILIES,
};
use crate::document::EnumFlexScalar;
use crate::error::{ConvertError, Result};
use crate::spec::EnumBorderLineStyle;

static RE_COLOR_HEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{6})$").expect("static hex color pattern")
});

static RE_COLOR_RGB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:rgb)\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
        .expect("static rgb color pattern")
});

////////////////////////////////////////////////////////////////////////////////
// #region ColorResolution

/// Normalize `#RRGGBB` or `rgb(r, g, b)` into six lowercase hex digits.
///
/// Returns `None` for any other shape; callers leave the color unset.
pub fn resolve_color(spec: &str) -> Option<String> {
    let c_spec = spec.trim();

    if let Some(caps) = RE_COLOR_HEX.captures(c_spec) {
        return Some(caps[1].to_ascii_lowercase());
    }

    let caps = RE_COLOR_RGB.captures(c_spec)?;
    let mut c_hex = String::with_capacity(6);
    for n_idx_group in 1..=3 {
        let n_channel = caps[n_idx_group].parse::<u8>().ok()?;
        c_hex.push_str(&format!("{n_channel:02x}"));
    }
    Some(c_hex)
}

/// Convert a resolved six-digit hex color into a packed `0xRRGGBB` value.
pub fn derive_rgb_value(hex: &str) -> Option<u32> {
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IdTables

/// Map a border style id (number or numeric string) to a line style.
///
/// Unknown or non-numeric ids resolve to [`EnumBorderLineStyle::Thin`].
pub fn resolve_border_line_style(style_id: &EnumFlexScalar) -> EnumBorderLineStyle {
    let Some(n_id) = style_id.as_integer() else {
        return EnumBorderLineStyle::Thin;
    };
    TUP_BORDER_LINE_STYLES
        .iter()
        .find(|(n_key, _)| *n_key == n_id)
        .map_or(EnumBorderLineStyle::Thin, |(_, style)| *style)
}

/// Map a font family id (number or numeric string) to a family name.
///
/// Unknown ids fail with [`ConvertError::UnknownFontFamilyId`].
pub fn resolve_font_family(family_id: &EnumFlexScalar) -> Result<&'static str> {
    family_id
        .as_integer()
        .and_then(|n_id| {
            TUP_FONT_FAMILIES
                .iter()
                .find(|(n_key, _)| *n_key == n_id)
                .map(|(_, name)| *name)
        })
        .ok_or_else(|| ConvertError::UnknownFontFamilyId {
            id: family_id.to_string(),
        })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Coordinates

/// Zero-based column index to letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letters(col: u16) -> String {
    let mut n_rest = u32::from(col) + 1;
    let mut l_chars = Vec::new();
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_rem as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// Zero-based `(row, col)` to an A1 reference.
pub fn derive_cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", derive_column_letters(col), row + 1)
}

/// Validate a zero-based input row index against Excel limits.
pub fn cast_row_num(row: u64) -> Result<u32> {
    u32::try_from(row)
        .ok()
        .filter(|n_row| *n_row < N_NROWS_EXCEL_MAX)
        .ok_or(ConvertError::CoordinateOutOfRange { row, col: 0 })
}

/// Validate a zero-based input column index against Excel limits.
pub fn cast_col_num(col: u64) -> Result<u16> {
    u16::try_from(col)
        .ok()
        .filter(|n_col| u32::from(*n_col) < N_NCOLS_EXCEL_MAX)
        .ok_or(ConvertError::CoordinateOutOfRange { row: 0, col })
}

/// Validate a zero-based `(row, col)` pair against Excel limits.
pub fn cast_cell_num(row: u64, col: u64) -> Result<(u32, u16)> {
    let n_row = cast_row_num(row).map_err(|_| ConvertError::CoordinateOutOfRange { row, col })?;
    let n_col = cast_col_num(col).map_err(|_| ConvertError::CoordinateOutOfRange { row, col })?;
    Ok((n_row, n_col))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to a valid Excel sheet name.
///
/// Excel rejects names that start or end with an apostrophe, so those are
/// trimmed along with surrounding whitespace.
pub fn sanitize_sheet_name(name: &str, replace_to: &str, name_default: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let mut c_name = c_name.trim_matches(is_sheet_name_edge_char).to_string();
    if c_name.is_empty() {
        c_name = name_default.to_string();
    }

    let c_name: String = c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    c_name.trim_end_matches(is_sheet_name_edge_char).to_string()
}

fn is_sheet_name_edge_char(c: char) -> bool {
    c == '\'' || c.is_whitespace()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
