use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(all(feature = "excel", feature = "xlsx"))]
use parcel_recon::ingestion::ExcelSheetSelection;
use parcel_recon::ingestion::{
    ingest_from_path, ingest_inferred_from_path, IngestionFormat, IngestionOptions, IngestionRequest,
};
use parcel_recon::types::{DataType, Field, Schema, Value};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("parcel-recon-unified-{nanos}.{ext}"))
}

fn parcel_schema() -> Schema {
    Schema::new(vec![
        Field::new("bbl", DataType::Int64),
        Field::new("address", DataType::Utf8),
    ])
}

#[test]
fn unified_ingest_csv_auto_by_extension() {
    let ds = ingest_from_path("tests/fixtures/Q2_parcel_list.csv", &parcel_schema(), &IngestionOptions::default()).unwrap();
    assert_eq!(ds.row_count(), 4);
    assert_eq!(ds.rows[0][0], Value::Int64(4001230001));
}

#[test]
fn unified_ingest_tsv_uses_tab_delimiter() {
    let ds = ingest_from_path("tests/fixtures/parcels.tsv", &parcel_schema(), &IngestionOptions::default()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][1], Value::from("12 MAIN ST, REAR"));
}

#[test]
fn unified_ingest_explicit_format_and_delimiter() {
    let path = tmp_file("dat");
    std::fs::write(&path, "bbl;address\n1000010001;1 BROADWAY\n").unwrap();

    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        delimiter: Some(b';'),
        ..Default::default()
    };
    let ds = ingest_from_path(&path, &parcel_schema(), &opts).unwrap();
    assert_eq!(ds.rows, vec![vec![Value::Int64(1000010001), Value::from("1 BROADWAY")]]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn unified_ingest_unknown_extension_is_rejected() {
    let err = ingest_from_path("tests/fixtures/parcels.parquet", &parcel_schema(), &IngestionOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("cannot infer format from extension 'parquet'"));
}

#[test]
fn unified_ingest_missing_extension_is_rejected() {
    let err = ingest_inferred_from_path("tests/fixtures/parcels", &IngestionOptions::default()).unwrap_err();
    assert!(err.to_string().contains("path has no extension"));
}

#[test]
fn unified_inferred_keeps_all_columns() {
    let ds = ingest_inferred_from_path("tests/fixtures/networks.csv", &IngestionOptions::default()).unwrap();
    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["network", "boro", "tier_2_2023"]
    );
    assert_eq!(ds.row_count(), 5);
}

#[test]
fn request_without_schema_infers() {
    let req = IngestionRequest {
        path: PathBuf::from("tests/fixtures/Q2_fp_nullOR0.csv"),
        schema: None,
        options: IngestionOptions::default(),
    };
    let ds = req.run().unwrap();
    assert_eq!(ds.column_count(), 6);
    assert_eq!(ds.value(1, "building_fp"), Some(&Value::Null));
}

#[cfg(not(feature = "excel"))]
#[test]
fn unified_ingest_excel_without_feature_is_an_error() {
    let err = ingest_from_path("tests/fixtures/parcels.xlsx", &parcel_schema(), &IngestionOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("excel ingestion not enabled"));
}

#[cfg(all(feature = "excel", feature = "xlsx"))]
fn write_two_sheet_workbook(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    for (name, bbl, address) in [("Sheet1", 4001230001_i64, "12 MAIN ST"), ("Second", 3004560010, "300 FULTON ST")] {
        let ws = wb.add_worksheet();
        ws.set_name(name).unwrap();
        ws.write_string(0, 0, "bbl").unwrap();
        ws.write_string(0, 1, "address").unwrap();
        ws.write_number(1, 0, bbl as f64).unwrap();
        ws.write_string(1, 1, address).unwrap();
    }
    wb.save(path).unwrap();
}

#[cfg(all(feature = "excel", feature = "xlsx"))]
#[test]
fn unified_ingest_excel_first_sheet_by_default() {
    let path = tmp_file("xlsx");
    write_two_sheet_workbook(&path);

    let ds = ingest_from_path(&path, &parcel_schema(), &IngestionOptions::default()).unwrap();
    assert_eq!(ds.rows, vec![vec![Value::Int64(4001230001), Value::from("12 MAIN ST")]]);

    let _ = std::fs::remove_file(&path);
}

#[cfg(all(feature = "excel", feature = "xlsx"))]
#[test]
fn unified_ingest_excel_all_sheets_explicit_format() {
    let path = tmp_file("xlsx");
    write_two_sheet_workbook(&path);

    let opts = IngestionOptions {
        format: Some(IngestionFormat::Excel),
        excel_sheet_selection: ExcelSheetSelection::AllSheets,
        ..Default::default()
    };
    let ds = ingest_from_path(&path, &parcel_schema(), &opts).unwrap();
    assert_eq!(ds.row_count(), 2);

    let _ = std::fs::remove_file(&path);
}

#[cfg(all(feature = "excel", feature = "xlsx"))]
#[test]
fn unified_ingest_excel_named_sheet_inferred() {
    let path = tmp_file("xlsx");
    write_two_sheet_workbook(&path);

    let opts = IngestionOptions {
        excel_sheet_selection: ExcelSheetSelection::Sheet("Second".to_string()),
        ..Default::default()
    };
    let ds = ingest_inferred_from_path(&path, &opts).unwrap();
    assert_eq!(ds.schema, parcel_schema());
    assert_eq!(ds.rows[0][0], Value::Int64(3004560010));

    let _ = std::fs::remove_file(&path);
}
