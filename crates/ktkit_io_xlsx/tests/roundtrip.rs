use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use ktkit_io_xlsx::{
    FieldDescription, JsonSchemaSource, LayoutError, SpecLayoutOptions, TableDescription,
    WorkbookBuilder, export_schema_to_path, save_workbook,
};

fn read_cell(range: &Range<Data>, row: u32, col: u32) -> String {
    range
        .get_value((row, col))
        .map(|d| d.to_string())
        .unwrap_or_default()
}

fn create_field(name: &str, field_type: &str, key: &str) -> FieldDescription {
    FieldDescription {
        name: name.to_string(),
        field_type: field_type.to_string(),
        key: key.to_string(),
        nullable: "NO".to_string(),
        default: String::new(),
        comment: String::new(),
    }
}

#[test]
fn test_saved_workbook_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.xlsx");

    let options = SpecLayoutOptions {
        n_row_origin: 1,
        ..Default::default()
    };
    let mut builder = WorkbookBuilder::new(options);
    builder
        .write_table(&TableDescription {
            name: "users".to_string(),
            comment: "app users".to_string(),
            fields: vec![
                create_field("id", "int", "PRI"),
                create_field("email", "varchar(128)", "UNI"),
            ],
        })
        .unwrap();
    builder
        .write_table(&TableDescription {
            name: "logs".to_string(),
            ..Default::default()
        })
        .unwrap();
    let (workbook, _) = builder.into_parts();
    save_workbook(&workbook, &path).unwrap();

    let mut xlsx: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(xlsx.sheet_names(), vec!["index".to_string(), "detail".to_string()]);

    let range_index = xlsx.worksheet_range("index").unwrap();
    assert_eq!(read_cell(&range_index, 0, 0), "users");
    assert_eq!(read_cell(&range_index, 0, 3), "app users");
    assert_eq!(read_cell(&range_index, 1, 0), "logs");

    let range_detail = xlsx.worksheet_range("detail").unwrap();
    let l_col_a: Vec<String> = (0..6).map(|row| read_cell(&range_detail, row, 0)).collect();
    assert_eq!(
        l_col_a,
        vec!["users", "field name", "id", "email", "logs", "field name"]
    );
    assert_eq!(read_cell(&range_detail, 3, 1), "varchar(128)");
    assert_eq!(read_cell(&range_detail, 3, 2), "UNI");
    assert_eq!(read_cell(&range_detail, 1, 5), "comment");
}

#[test]
fn test_export_from_json_dump_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.xlsx");
    let mut source = JsonSchemaSource::from_json_str(
        r#"{"schema": "shop", "tables": [
            {"name": "orders", "comment": "placed orders", "fields": [
                {"name": "id", "type": "bigint", "key": "PRI", "nullable": "NO"},
                {"name": "total", "type": "decimal(10,2)", "default": "0.00"}
            ]}
        ]}"#,
    )
    .unwrap();

    let report = export_schema_to_path(&mut source, SpecLayoutOptions::default(), &path).unwrap();
    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.n_fields_total(), 2);

    let mut xlsx: Xlsx<_> = open_workbook(&path).unwrap();
    let range_detail = xlsx.worksheet_range("detail").unwrap();
    assert_eq!(read_cell(&range_detail, 0, 0), "orders");
    assert_eq!(read_cell(&range_detail, 0, 3), "placed orders");
    assert_eq!(read_cell(&range_detail, 3, 4), "0.00");
}

#[test]
fn test_empty_and_unwritable_exports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");
    let mut source = JsonSchemaSource::from_json_str(r#"{"tables": []}"#).unwrap();
    let report = export_schema_to_path(&mut source, SpecLayoutOptions::default(), &path).unwrap();
    assert!(report.tables.is_empty());
    assert!(path.exists());

    let path_missing_dir = dir.path().join("no_such_dir").join("out.xlsx");
    let mut source = JsonSchemaSource::from_json_str(r#"{"tables": []}"#).unwrap();
    let err =
        export_schema_to_path(&mut source, SpecLayoutOptions::default(), &path_missing_dir)
            .unwrap_err();
    assert!(matches!(err, LayoutError::Persistence(_)));
    assert!(!path_missing_dir.exists());
}
