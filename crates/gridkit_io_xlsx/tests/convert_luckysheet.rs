use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx, open_workbook};
use gridkit_io_xlsx::{
    EnumRangeBorderPolicy, EnumSheetSelection, SpecConvertOptions, convert_json_file,
    convert_json_str,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use zip::ZipArchive;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_zip_part(path: &Path, part_name: &str) -> String {
    let file = File::open(path).expect("open workbook");
    let mut archive = ZipArchive::new(file).expect("parse zip archive");
    let mut part = archive.by_name(part_name).expect("find part");
    let mut text = String::new();
    part.read_to_string(&mut text).expect("read part");
    text
}

fn read_cell(path: &Path, sheet_name: &str, row: u32, col: u32) -> Option<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("open workbook");
    let range = workbook.worksheet_range(sheet_name).expect("read sheet");
    range.get_value((row, col)).cloned()
}

fn read_xml_attr<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    let c_key = format!(r#" {name}=""#);
    let n_start = element.find(&c_key)? + c_key.len();
    let n_len = element[n_start..].find('"')?;
    Some(&element[n_start..n_start + n_len])
}

fn find_xml_element<'a>(xml: &'a str, prefix: &str) -> Option<&'a str> {
    let n_start = xml.find(prefix)?;
    let n_len = xml[n_start..].find('>')?;
    Some(&xml[n_start..=n_start + n_len])
}

#[test]
fn single_cell_document_keeps_value_and_font() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("single.xlsx");
    let payload = json!([{
        "name": "Cell",
        "celldata": [{"r": 0, "c": 0, "v": {"v": 1, "fc": "rgb(51,51,51)", "fs": 11}}]
    }])
    .to_string();

    let report = convert_json_str(&payload, &path_out, &SpecConvertOptions::default())
        .expect("convert");

    assert_eq!(report.sheets.len(), 1);
    assert_eq!(report.sheets[0].sheet_name, "Cell");
    assert_eq!(report.sheets[0].cnt_cells, 1);
    assert!(report.warnings.is_empty());

    assert_eq!(read_cell(&path_out, "Cell", 0, 0), Some(Data::Float(1.0)));

    let styles_xml = read_zip_part(&path_out, "xl/styles.xml").to_ascii_lowercase();
    assert!(styles_xml.contains(r#"<sz val="11"/>"#));
    assert!(styles_xml.contains(r#"rgb="ff333333""#));
}

#[test]
fn sample_document_converts_with_merges_borders_and_formula() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("sample.xlsx");

    let report = convert_json_file(
        &fixture_path("luckysheet_cell_demo.json"),
        &path_out,
        &SpecConvertOptions::default(),
    )
    .expect("convert sample");

    let sheet_report = &report.sheets[0];
    assert_eq!(report.sheets.len(), 1);
    assert_eq!(sheet_report.sheet_name, "Cell");
    assert_eq!(sheet_report.cnt_cells, 336);
    assert_eq!(sheet_report.cnt_merges, 4);
    assert_eq!(sheet_report.cnt_columns_sized, 10);
    assert_eq!(sheet_report.cnt_rows_sized, 30);
    assert!(sheet_report.cnt_borders_cell > 0);
    assert!(sheet_report.cnt_borders_range > 0);

    assert_eq!(read_cell(&path_out, "Cell", 0, 0), Some(Data::Float(1.0)));
    assert_eq!(read_cell(&path_out, "Cell", 0, 1), Some(Data::Float(2.0)));

    let sheet_xml = read_zip_part(&path_out, "xl/worksheets/sheet1.xml");
    for c_ref in ["F14:F16", "H14:I16", "C15:D15", "K16:M19"] {
        assert_eq!(
            sheet_xml.matches(&format!(r#"<mergeCell ref="{c_ref}"/>"#)).count(),
            1,
            "merge {c_ref}"
        );
    }
    assert!(sheet_xml.contains("Formula!D3+Formula!D4"));

    let styles_xml = read_zip_part(&path_out, "xl/styles.xml");
    assert!(styles_xml.contains(r#"style="mediumDashDotDot""#));
    assert!(styles_xml.contains(r#"style="thick""#));
    assert!(styles_xml.contains("华文新魏"));
}

#[test]
fn range_all_then_cell_left_edge_layers_in_document_order() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("borders.xlsx");
    let payload = json!([{
        "name": "Borders",
        "celldata": [{"r": 3, "c": 3, "v": {"v": "x"}}],
        "config": {
            "borderInfo": [
                {"rangeType": "range", "borderType": "border-all", "style": "2",
                    "color": "#ff0000", "range": [{"row": [3, 3], "column": [3, 4]}]},
                {"rangeType": "cell", "value": {"row_index": 3, "col_index": 3,
                    "l": {"style": 8, "color": "rgb(0, 0, 255)"}}}
            ]
        }
    }])
    .to_string();

    let report = convert_json_str(&payload, &path_out, &SpecConvertOptions::default())
        .expect("convert");
    assert_eq!(report.sheets[0].cnt_borders_range, 1);
    assert_eq!(report.sheets[0].cnt_borders_cell, 1);

    let styles_xml = read_zip_part(&path_out, "xl/styles.xml").to_ascii_lowercase();
    assert!(styles_xml.contains(r#"<left style="medium"><color rgb="ff0000ff"/></left>"#));
    assert!(styles_xml.contains(r#"<top style="hair"><color rgb="ffff0000"/></top>"#));
}

#[test]
fn policy_and_sheet_selection_options_apply() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("options.xlsx");
    let payload = json!([
        {"name": "First", "config": {"borderInfo": [
            {"rangeType": "range", "borderType": "border-none", "style": "13",
                "color": "#00ff00", "range": [{"row": [0, 1], "column": [0, 1]}]}
        ]}},
        {"name": "Second"}
    ])
    .to_string();
    let options = SpecConvertOptions {
        range_border_policy: EnumRangeBorderPolicy::PaintAll,
        sheet_selection: EnumSheetSelection::First,
        ..Default::default()
    };

    let report = convert_json_str(&payload, &path_out, &options).expect("convert");
    assert_eq!(report.sheets.len(), 1);

    let workbook: Xlsx<_> = open_workbook(&path_out).expect("open workbook");
    assert_eq!(workbook.sheet_names(), vec!["First".to_string()]);

    let styles_xml = read_zip_part(&path_out, "xl/styles.xml").to_ascii_lowercase();
    assert!(styles_xml.contains(r#"<left style="thick"><color rgb="ff00ff00"/></left>"#));
}

#[test]
fn unresolvable_colors_are_reported_not_fatal() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("colors.xlsx");
    let payload = json!([{
        "name": "S",
        "celldata": [{"r": 0, "c": 0, "v": {"v": "a", "fc": "red", "bg": "rgb(300, 0, 0)"}}]
    }])
    .to_string();

    let report = convert_json_str(&payload, &path_out, &SpecConvertOptions::default())
        .expect("convert");

    assert_eq!(report.warning_count(), 2);
    assert_eq!(
        read_cell(&path_out, "S", 0, 0),
        Some(Data::String("a".to_string()))
    );
}

#[test]
fn column_widths_and_row_heights_reach_the_saved_sheet() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("geometry.xlsx");
    let payload = json!([{
        "name": "Sizes",
        "celldata": [{"r": 2, "c": 0, "v": {"v": "x"}}],
        "config": {"columnlen": {"0": 131}, "rowlen": {"2": 30}}
    }])
    .to_string();

    let report = convert_json_str(&payload, &path_out, &SpecConvertOptions::default())
        .expect("convert");
    assert_eq!(report.sheets[0].cnt_columns_sized, 1);
    assert_eq!(report.sheets[0].cnt_rows_sized, 1);

    let sheet_xml = read_zip_part(&path_out, "xl/worksheets/sheet1.xml");

    let col_xml = find_xml_element(&sheet_xml, r#"<col min="1""#).expect("col element");
    assert_eq!(read_xml_attr(col_xml, "max"), Some("1"));
    assert_eq!(read_xml_attr(col_xml, "customWidth"), Some("1"));
    let n_width: f64 = read_xml_attr(col_xml, "width")
        .expect("width attribute")
        .parse()
        .expect("numeric width");
    // Stored widths include the cell padding Excel adds to the character width.
    assert!((13.1..14.0).contains(&n_width), "width {n_width}");

    let row_xml = find_xml_element(&sheet_xml, r#"<row r="3""#).expect("row element");
    assert_eq!(read_xml_attr(row_xml, "ht"), Some("30"));
    assert_eq!(read_xml_attr(row_xml, "customHeight"), Some("1"));
    assert!(find_xml_element(&sheet_xml, r#"<row r="1""#).is_none());
}

#[test]
fn mistyped_font_color_keeps_the_cell_value() {
    let dir_tmp = tempfile::tempdir().expect("tempdir");
    let path_out = dir_tmp.path().join("mistyped.xlsx");
    let payload = json!([{
        "name": "S",
        "celldata": [{"r": 0, "c": 0, "v": {"v": "hello", "fc": 5}}]
    }])
    .to_string();

    let report = convert_json_str(&payload, &path_out, &SpecConvertOptions::default())
        .expect("convert");

    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        read_cell(&path_out, "S", 0, 0),
        Some(Data::String("hello".to_string()))
    );
}
