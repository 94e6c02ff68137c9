//! Input document model (Luckysheet-style JSON sheets).
//!
//! Every structure here is a read-only view deserialized once at conversion
//! start. Malformed entries inside `celldata`, `config.merge` and
//! `config.borderInfo` are skipped with a warning instead of failing the
//! whole document; absent or `null` substructures default to empty.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::spec::EnumCellValue;

////////////////////////////////////////////////////////////////////////////////
// #region Scalars

/// Loosely typed scalar used for ids, flags and sizes that arrive either as
/// JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumFlexScalar {
    /// JSON boolean.
    Boolean(bool),
    /// JSON integer.
    Integer(i64),
    /// JSON float.
    Float(f64),
    /// JSON string.
    String(String),
}

impl EnumFlexScalar {
    /// Integer view: integers, integral floats and integer strings.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            Self::String(s) => s.trim().parse::<i64>().ok(),
            Self::Float(_) | Self::Boolean(_) => None,
        }
    }

    /// Float view: any number or numeric string.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            Self::Boolean(_) => None,
        }
    }

    /// Flag view: `1`, `true` and `"1"` are set, everything else is not.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            _ => self.as_integer() == Some(1),
        }
    }
}

impl fmt::Display for EnumFlexScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Document

/// Ordered sequence of sheets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SpecDocument {
    /// Sheets in input order.
    pub sheets: Vec<SpecSheet>,
}

impl SpecDocument {
    /// Parse a document from a JSON string.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Parse a document from a JSON byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// One input sheet. Other keys (`index`, `zoomRatio`, `calcChain`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecSheet {
    /// Display name; absent names fall back to the configured default.
    #[serde(default)]
    pub name: Option<String>,
    /// Sparse cell entries in input order.
    #[serde(default, rename = "celldata", deserialize_with = "deserialize_lenient_vec")]
    pub cells: Vec<SpecCellEntry>,
    /// Merge, sizing and border overlays.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub config: SpecSheetConfig,
}

/// Sheet overlays.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecSheetConfig {
    /// Merge descriptors keyed by `"row_col"`.
    #[serde(default, rename = "merge", deserialize_with = "deserialize_lenient_map")]
    pub merges: BTreeMap<String, SpecMergeDescriptor>,
    /// Column widths keyed by zero-based column index.
    #[serde(default, rename = "columnlen", deserialize_with = "deserialize_null_default")]
    pub column_widths: BTreeMap<u32, f64>,
    /// Row heights keyed by zero-based row index.
    #[serde(default, rename = "rowlen", deserialize_with = "deserialize_null_default")]
    pub row_heights: BTreeMap<u32, f64>,
    /// Border declarations in document order.
    #[serde(default, rename = "borderInfo", deserialize_with = "deserialize_lenient_vec")]
    pub border_declarations: Vec<EnumBorderDeclaration>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Cells

/// One sparse cell entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpecCellEntry {
    /// Zero-based row.
    #[serde(rename = "r")]
    pub row: u64,
    /// Zero-based column.
    #[serde(rename = "c")]
    pub col: u64,
    /// Cell payload; absent and `null` both mean "no value, no style".
    #[serde(default, rename = "v")]
    pub payload: Option<EnumCellPayload>,
}

/// Cell payload: a styled value object or a bare literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumCellPayload {
    /// Styled value object.
    Rich(Box<SpecRichValue>),
    /// Bare scalar without styling (or an unrecognized shape).
    Literal(Value),
}

/// Styled value object.
///
/// A field with an unexpected JSON type is dropped on its own and named in
/// [`Self::fields_invalid`]; the rest of the cell is kept.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "SpecRichValueRaw")]
pub struct SpecRichValue {
    /// Literal value.
    pub v: Option<Value>,
    /// Formula text, copied verbatim.
    pub f: Option<String>,
    /// Font size.
    pub fs: Option<EnumFlexScalar>,
    /// Bold flag.
    pub bl: Option<EnumFlexScalar>,
    /// Italic flag.
    pub it: Option<EnumFlexScalar>,
    /// Font color spec.
    pub fc: Option<String>,
    /// Font family id.
    pub ff: Option<EnumFlexScalar>,
    /// Background color spec.
    pub bg: Option<String>,
    /// Keys whose values had an unexpected type and were dropped.
    pub fields_invalid: Vec<String>,
}

impl SpecRichValue {
    /// Literal value of the cell; `None` when missing or not a scalar.
    pub fn literal_value(&self) -> Option<EnumCellValue> {
        self.v.as_ref().and_then(derive_literal_value)
    }
}

#[derive(Deserialize)]
struct SpecRichValueRaw {
    #[serde(default)]
    v: Option<Value>,
    #[serde(default)]
    f: Option<Value>,
    #[serde(default)]
    fs: Option<Value>,
    #[serde(default)]
    bl: Option<Value>,
    #[serde(default)]
    it: Option<Value>,
    #[serde(default)]
    fc: Option<Value>,
    #[serde(default)]
    ff: Option<Value>,
    #[serde(default)]
    bg: Option<Value>,
}

impl From<SpecRichValueRaw> for SpecRichValue {
    fn from(raw: SpecRichValueRaw) -> Self {
        let mut l_fields_invalid = Vec::new();
        Self {
            f: take_typed_field("f", raw.f, &mut l_fields_invalid),
            fs: take_typed_field("fs", raw.fs, &mut l_fields_invalid),
            bl: take_typed_field("bl", raw.bl, &mut l_fields_invalid),
            it: take_typed_field("it", raw.it, &mut l_fields_invalid),
            fc: take_typed_field("fc", raw.fc, &mut l_fields_invalid),
            ff: take_typed_field("ff", raw.ff, &mut l_fields_invalid),
            bg: take_typed_field("bg", raw.bg, &mut l_fields_invalid),
            v: raw.v,
            fields_invalid: l_fields_invalid,
        }
    }
}

fn take_typed_field<T: DeserializeOwned>(
    key: &str,
    value: Option<Value>,
    l_fields_invalid: &mut Vec<String>,
) -> Option<T> {
    match value? {
        Value::Null => None,
        value => match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(_) => {
                l_fields_invalid.push(key.to_string());
                None
            }
        },
    }
}

/// JSON scalar to cell value. Objects, arrays and `null` have no literal value.
pub fn derive_literal_value(value: &Value) -> Option<EnumCellValue> {
    match value {
        Value::String(s) => Some(EnumCellValue::String(s.clone())),
        Value::Number(n) => n.as_f64().map(EnumCellValue::Number),
        Value::Bool(b) => Some(EnumCellValue::Boolean(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergesAndBorders

/// Merge anchor plus spans. Missing spans make the descriptor a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecMergeDescriptor {
    /// Zero-based anchor row.
    #[serde(rename = "r")]
    pub row: u64,
    /// Zero-based anchor column.
    #[serde(rename = "c")]
    pub col: u64,
    /// Row span (>= 1).
    #[serde(default, rename = "rs")]
    pub row_span: Option<u64>,
    /// Column span (>= 1).
    #[serde(default, rename = "cs")]
    pub col_span: Option<u64>,
}

/// Border declaration, discriminated by `rangeType`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "rangeType", rename_all = "lowercase")]
pub enum EnumBorderDeclaration {
    /// Per-edge borders of one cell.
    Cell {
        /// Target cell and its edges.
        value: SpecCellBorderDeclaration,
    },
    /// One style/color applied to rectangles according to `borderType`.
    Range {
        /// Border type name, e.g. `border-all`.
        #[serde(default, rename = "borderType")]
        border_type: Option<String>,
        /// Border style id.
        #[serde(default)]
        style: Option<EnumFlexScalar>,
        /// Color spec.
        #[serde(default)]
        color: Option<String>,
        /// Target rectangles.
        #[serde(default)]
        range: Vec<SpecRangeRect>,
    },
}

/// Cell-scoped border declaration. An edge that is absent or `null` is left
/// untouched on the target cell.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecCellBorderDeclaration {
    /// Zero-based row.
    pub row_index: u64,
    /// Zero-based column.
    pub col_index: u64,
    /// Left edge.
    #[serde(default, rename = "l")]
    pub left: Option<SpecEdgeDeclaration>,
    /// Right edge.
    #[serde(default, rename = "r")]
    pub right: Option<SpecEdgeDeclaration>,
    /// Top edge.
    #[serde(default, rename = "t")]
    pub top: Option<SpecEdgeDeclaration>,
    /// Bottom edge.
    #[serde(default, rename = "b")]
    pub bottom: Option<SpecEdgeDeclaration>,
}

/// Style and color of one declared edge.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecEdgeDeclaration {
    /// Border style id.
    #[serde(default)]
    pub style: Option<EnumFlexScalar>,
    /// Color spec.
    #[serde(default)]
    pub color: Option<String>,
}

/// Closed rectangle `[row[0], row[1]] x [column[0], column[1]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpecRangeRect {
    /// Row bounds (inclusive).
    pub row: [u64; 2],
    /// Column bounds (inclusive).
    pub column: [u64; 2],
}

impl SpecRangeRect {
    /// Bounds ordered as `(row_first, row_last, col_first, col_last)`.
    pub fn normalized(&self) -> (u64, u64, u64, u64) {
        (
            self.row[0].min(self.row[1]),
            self.row[0].max(self.row[1]),
            self.column[0].min(self.column[1]),
            self.column[0].max(self.column[1]),
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LenientDeserializers

fn deserialize_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let l_raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(l_raw
        .into_iter()
        .enumerate()
        .filter_map(|(n_idx, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(index = n_idx, "skipping malformed entry: {err}");
                None
            }
        })
        .collect())
}

fn deserialize_lenient_map<'de, D, T>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let dict_raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(dict_raw
        .into_iter()
        .filter_map(|(c_key, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some((c_key, item)),
            Err(err) => {
                warn!(key = %c_key, "skipping malformed entry: {err}");
                None
            }
        })
        .collect())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
