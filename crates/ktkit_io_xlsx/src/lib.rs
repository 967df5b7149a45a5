//! `ktkit_io_xlsx`:
//! schema-to-workbook layout engine.
//!
//! Module layout:
//! - `conf`     : constants and style presets
//! - `spec`     : models, options, errors
//! - `util`     : pure helper functions (A1 notation, validation)
//! - `style`    : per-workbook style table
//! - `cursor`   : per-sheet row cursors
//! - `document` : in-memory workbook and its writer
//! - `builder`  : per-table index/detail layout
//! - `source`   : schema sources feeding the builder
//! - `writer`   : XLSX persistence
pub mod builder;
pub mod conf;
pub mod cursor;
pub mod document;
pub mod source;
pub mod spec;
pub mod style;
pub mod util;
pub mod writer;

pub use builder::{WorkbookBuilder, export_schema, export_schema_to_path};
pub use conf::{
    C_LINK_LABEL_LOCATION, C_SHEET_NAME_DETAIL, C_SHEET_NAME_INDEX, EnumStylePreset,
    N_NROWS_EXCEL_MAX, TUP_FIELD_LABELS, derive_style_preset,
};
pub use cursor::LayoutCursor;
pub use document::{DocumentWriter, SpecSheet, SpecWorkbook};
pub use source::{IterSchemaSource, JsonSchemaSource, SchemaSource};
pub use spec::{
    EnumBuilderState, EnumSheetId, FieldDescription, LayoutError, SourceError, SpecCellFormat,
    SpecCellRange, SpecCellRef, SpecHyperlinkEdge, SpecLayoutOptions, SpecLayoutReport,
    SpecRowTarget, SpecStyleAssignment, SpecTableHeader, SpecTableLayout, StyleHandle,
    TableDescription,
};
pub use style::StyleRegistry;
pub use util::sanitize_sheet_name;
pub use writer::{save_workbook, save_workbook_to_buffer};
