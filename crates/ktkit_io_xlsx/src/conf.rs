//! XLSX constants and default layout presets.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Number of layout columns (A-F) on both sheets.
pub const N_NCOLS_LAYOUT: u16 = 6;
/// Last column covered by the table-name merge (A-C).
pub const N_COL_NAME_MERGE_END: u16 = 2;
/// First column covered by the table-comment merge (D-F).
pub const N_COL_COMMENT_MERGE_START: u16 = 3;

/// Default index sheet name.
pub const C_SHEET_NAME_INDEX: &str = "index";
/// Default detail sheet name.
pub const C_SHEET_NAME_DETAIL: &str = "detail";
/// Hyperlink label for index-to-detail navigation.
pub const C_LINK_LABEL_LOCATION: &str = "Location";
/// Column-label row written above each table's field rows.
pub const TUP_FIELD_LABELS: [&str; 6] = [
    "field name",
    "field type",
    "key",
    "nullable",
    "default",
    "comment",
];

/// Index sheet column widths (A-F).
pub const TUP_WIDTHS_COL_INDEX: [f64; 6] = [20.0, 20.0, 20.0, 20.0, 20.0, 20.0];
/// Detail sheet column widths (A-F).
pub const TUP_WIDTHS_COL_DETAIL: [f64; 6] = [40.0, 20.0, 20.0, 20.0, 20.0, 40.0];

/// Closed set of styles the layout needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumStylePreset {
    /// Table header row: filled background, bold light text, thin borders.
    Header,
    /// Table block outline: thin borders on all four sides, no fill.
    BorderedBlock,
}

/// Build the format for one style preset.
pub fn derive_style_preset(preset: EnumStylePreset) -> SpecCellFormat {
    let cfg_border_thin = SpecCellFormat {
        top: Some(1),
        bottom: Some(1),
        left: Some(1),
        right: Some(1),
        ..Default::default()
    };

    match preset {
        EnumStylePreset::Header => cfg_border_thin.with_(SpecCellFormat {
            bold: Some(true),
            font_color: Some("#FFFFFF".to_string()),
            bg_color: Some("#009999".to_string()),
            ..Default::default()
        }),
        EnumStylePreset::BorderedBlock => cfg_border_thin,
    }
}
