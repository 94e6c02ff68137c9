use std::collections::BTreeMap;
use std::path::PathBuf;

use gridkit_io_xlsx::{
    ConvertError, EnumRangeBorderPolicy, EnumSheetSelection, SpecConvertOptions,
    SpecSheetReport, SpecXlsxReport, convert_json_file, convert_json_str,
};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "gridkit.xlsx.convert_luckysheet.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ReportSheet")]
#[derive(Debug, Clone)]
struct PyReportSheet {
    #[pyo3(get)]
    sheet_name_input: String,
    #[pyo3(get)]
    sheet_name: String,
    #[pyo3(get)]
    cnt_cells: u64,
    #[pyo3(get)]
    cnt_borders_cell: u64,
    #[pyo3(get)]
    cnt_borders_range: u64,
    #[pyo3(get)]
    cnt_merges: u64,
    #[pyo3(get)]
    cnt_merges_skipped: u64,
    #[pyo3(get)]
    cnt_columns_sized: u64,
    #[pyo3(get)]
    cnt_rows_sized: u64,
}

impl From<SpecSheetReport> for PyReportSheet {
    fn from(sheet_report: SpecSheetReport) -> Self {
        Self {
            sheet_name_input: sheet_report.sheet_name_input,
            sheet_name: sheet_report.sheet_name,
            cnt_cells: sheet_report.cnt_cells,
            cnt_borders_cell: sheet_report.cnt_borders_cell,
            cnt_borders_range: sheet_report.cnt_borders_range,
            cnt_merges: sheet_report.cnt_merges,
            cnt_merges_skipped: sheet_report.cnt_merges_skipped,
            cnt_columns_sized: sheet_report.cnt_columns_sized,
            cnt_rows_sized: sheet_report.cnt_rows_sized,
        }
    }
}

#[pymethods]
impl PyReportSheet {
    fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_cells".to_string(), self.cnt_cells);
        dict_counts.insert("cnt_borders_cell".to_string(), self.cnt_borders_cell);
        dict_counts.insert("cnt_borders_range".to_string(), self.cnt_borders_range);
        dict_counts.insert("cnt_merges".to_string(), self.cnt_merges);
        dict_counts.insert("cnt_merges_skipped".to_string(), self.cnt_merges_skipped);
        dict_counts.insert("cnt_columns_sized".to_string(), self.cnt_columns_sized);
        dict_counts.insert("cnt_rows_sized".to_string(), self.cnt_rows_sized);
        dict_counts
    }

    fn __repr__(&self) -> String {
        format!(
            "ReportSheet(sheet_name={:?}, cells={}, merges={})",
            self.sheet_name, self.cnt_cells, self.cnt_merges
        )
    }
}

#[pyclass(name = "ReportConvert")]
#[derive(Debug, Clone)]
struct PyReportConvert {
    #[pyo3(get)]
    file_out: String,
    #[pyo3(get)]
    sheets: Vec<PyReportSheet>,
    #[pyo3(get)]
    warnings: Vec<String>,
    summary: String,
}

impl PyReportConvert {
    fn from_report(report: SpecXlsxReport, file_out: String) -> Self {
        Self {
            file_out,
            summary: report.to_string(),
            sheets: report.sheets.into_iter().map(PyReportSheet::from).collect(),
            warnings: report.warnings,
        }
    }
}

#[pymethods]
impl PyReportConvert {
    #[getter]
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_sheets".to_string(), self.sheet_count() as u64);
        dict_counts.insert(
            "cnt_cells".to_string(),
            self.sheets.iter().map(|sheet| sheet.cnt_cells).sum(),
        );
        dict_counts.insert(
            "cnt_merges".to_string(),
            self.sheets.iter().map(|sheet| sheet.cnt_merges).sum(),
        );
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    fn __str__(&self) -> String {
        self.summary.clone()
    }
}

fn parse_range_border_policy(value: &str) -> PyResult<EnumRangeBorderPolicy> {
    match value {
        "positional" => Ok(EnumRangeBorderPolicy::Positional),
        "paint_all" | "paint-all" => Ok(EnumRangeBorderPolicy::PaintAll),
        _ => Err(PyValueError::new_err(format!(
            "Invalid range border policy: `{value}`. Expected one of: ['positional', 'paint_all']"
        ))),
    }
}

fn map_convert_error(exception: ConvertError) -> PyErr {
    match exception {
        ConvertError::Io(err) => PyOSError::new_err(err.to_string()),
        ConvertError::Xlsx(_) | ConvertError::WriterClosed => {
            PyRuntimeError::new_err(exception.to_string())
        }
        ConvertError::Json(_)
        | ConvertError::EmptyDocument
        | ConvertError::UnknownFontFamilyId { .. }
        | ConvertError::MergeConflict { .. }
        | ConvertError::CoordinateOutOfRange { .. }
        | ConvertError::InvalidOptions(_) => PyValueError::new_err(exception.to_string()),
    }
}

fn derive_convert_options(
    range_border_policy: &str,
    first_sheet_only: bool,
    width_unit_divisor: f64,
    write_formulas: bool,
) -> PyResult<SpecConvertOptions> {
    Ok(SpecConvertOptions {
        width_unit_divisor,
        range_border_policy: parse_range_border_policy(range_border_policy)?,
        sheet_selection: if first_sheet_only {
            EnumSheetSelection::First
        } else {
            EnumSheetSelection::All
        },
        if_write_formulas: write_formulas,
        ..Default::default()
    })
}

#[pyfunction(name = "convert_luckysheet_json")]
#[pyo3(signature = (
    payload,
    file_out,
    *,
    range_border_policy = "positional",
    first_sheet_only = false,
    width_unit_divisor = 10.0,
    write_formulas = true
))]
fn convert_luckysheet_json_py(
    py: Python<'_>,
    payload: String,
    file_out: PathBuf,
    range_border_policy: &str,
    first_sheet_only: bool,
    width_unit_divisor: f64,
    write_formulas: bool,
) -> PyResult<PyReportConvert> {
    let options = derive_convert_options(
        range_border_policy,
        first_sheet_only,
        width_unit_divisor,
        write_formulas,
    )?;
    let c_file_out = file_out.to_string_lossy().to_string();

    let report = py.allow_threads(|| convert_json_str(&payload, file_out, &options));
    let report = report.map_err(map_convert_error)?;
    Ok(PyReportConvert::from_report(report, c_file_out))
}

#[pyfunction(name = "convert_luckysheet_file")]
#[pyo3(signature = (
    file_in,
    file_out,
    *,
    range_border_policy = "positional",
    first_sheet_only = false,
    width_unit_divisor = 10.0,
    write_formulas = true
))]
fn convert_luckysheet_file_py(
    py: Python<'_>,
    file_in: PathBuf,
    file_out: PathBuf,
    range_border_policy: &str,
    first_sheet_only: bool,
    width_unit_divisor: f64,
    write_formulas: bool,
) -> PyResult<PyReportConvert> {
    let options = derive_convert_options(
        range_border_policy,
        first_sheet_only,
        width_unit_divisor,
        write_formulas,
    )?;
    let c_file_out = file_out.to_string_lossy().to_string();

    let report = py.allow_threads(|| convert_json_file(&file_in, file_out, &options));
    let report = report.map_err(map_convert_error)?;
    Ok(PyReportConvert::from_report(report, c_file_out))
}

#[pymodule]
fn _gridkit_io_xlsx_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportSheet>()?;
    module.add_class::<PyReportConvert>()?;
    module.add_function(wrap_pyfunction!(convert_luckysheet_json_py, module)?)?;
    module.add_function(wrap_pyfunction!(convert_luckysheet_file_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
