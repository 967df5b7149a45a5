//! Shared layout models and error types.

use std::fmt;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{
    C_LINK_LABEL_LOCATION, C_SHEET_NAME_DETAIL, C_SHEET_NAME_INDEX, TUP_FIELD_LABELS,
    TUP_WIDTHS_COL_DETAIL, TUP_WIDTHS_COL_INDEX,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormat

/// Cell format description.
///
/// Only the attributes the layout presets use: bold text, colors and
/// per-side borders (`1` = thin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,

    /// Top border style.
    pub top: Option<i64>,
    /// Bottom border style.
    pub bottom: Option<i64>,
    /// Left border style.
    pub left: Option<i64>,
    /// Right border style.
    pub right: Option<i64>,

    /// Background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
    /// Font color (`#RRGGBB`).
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Opaque handle returned by [`crate::style::StyleRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleHandle(pub(crate) usize);

impl StyleHandle {
    /// Position of the style in its registry.
    pub fn index(self) -> usize {
        self.0
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Coordinates

/// Sheet identifier; one workbook always holds both sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumSheetId {
    /// One summary row per table.
    Index,
    /// One header + label + field-rows block per table.
    Detail,
}

impl EnumSheetId {
    /// Both sheets in workbook order.
    pub const ALL: [EnumSheetId; 2] = [EnumSheetId::Index, EnumSheetId::Detail];

    /// Position of the sheet in workbook order.
    pub fn position(self) -> usize {
        match self {
            Self::Index => 0,
            Self::Detail => 1,
        }
    }
}

impl fmt::Display for EnumSheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::Detail => write!(f, "detail"),
        }
    }
}

/// Single cell coordinate in cursor space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellRef {
    /// Owning sheet.
    pub sheet: EnumSheetId,
    /// Row in cursor space.
    pub row: u32,
    /// Zero-based column (A = 0).
    pub col: u16,
}

/// Rectangular, inclusive cell range in cursor space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellRange {
    /// Owning sheet.
    pub sheet: EnumSheetId,
    /// First row (inclusive).
    pub row_start: u32,
    /// Last row (inclusive).
    pub row_end: u32,
    /// First column (inclusive).
    pub col_start: u16,
    /// Last column (inclusive).
    pub col_end: u16,
}

impl SpecCellRange {
    /// Build a range without validation; see [`crate::util::validate_cell_range`].
    pub fn new(
        sheet: EnumSheetId,
        row_start: u32,
        col_start: u16,
        row_end: u32,
        col_end: u16,
    ) -> Self {
        Self {
            sheet,
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    /// Return whether `(row, col)` lies inside the range.
    pub fn contains(&self, row: u32, col: u16) -> bool {
        row >= self.row_start && row <= self.row_end && col >= self.col_start && col <= self.col_end
    }

    /// Return whether two ranges on the same sheet share at least one cell.
    pub fn intersects(&self, other: &SpecCellRange) -> bool {
        self.sheet == other.sheet
            && self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// Row address captured before the region it points to is filled.
///
/// Produced by [`crate::cursor::LayoutCursor::capture_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecRowTarget {
    /// Sheet the address belongs to.
    pub sheet: EnumSheetId,
    /// Captured cursor value.
    pub row: u32,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentParts

/// Style attached to a range at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecStyleAssignment {
    /// Styled range.
    pub range: SpecCellRange,
    /// Registered style.
    pub handle: StyleHandle,
}

/// Navigable cross-reference from one cell to a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHyperlinkEdge {
    /// Cell carrying the link.
    pub source: SpecCellRef,
    /// Range the link navigates to.
    pub target: SpecCellRange,
    /// Link label (shown as the screen tip).
    pub label: String,
}

/// Builder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumBuilderState {
    /// Processing the input stream.
    #[default]
    Accepting,
    /// Stream exhausted and workbook handed off.
    Finalized,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SchemaModels

/// One column of a source table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDescription {
    /// Column name.
    pub name: String,
    /// Column type as reported by the catalog (`varchar(32)`, `int`, ...).
    pub field_type: String,
    /// Key marker (`PRI`, `UNI`, `MUL` or empty).
    pub key: String,
    /// Nullability marker (`YES`/`NO`).
    pub nullable: String,
    /// Default value text.
    pub default: String,
    /// Column comment.
    pub comment: String,
}

impl FieldDescription {
    /// Attribute values in layout column order (A-F).
    pub fn to_row(&self) -> [&str; 6] {
        [
            &self.name,
            &self.field_type,
            &self.key,
            &self.nullable,
            &self.default,
            &self.comment,
        ]
    }
}

/// Table name and comment as yielded by a schema source before its fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecTableHeader {
    /// Table name.
    pub name: String,
    /// Table comment.
    pub comment: String,
}

/// One source table with its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDescription {
    /// Table name.
    pub name: String,
    /// Table comment.
    pub comment: String,
    /// Columns in catalog ordinal order.
    pub fields: Vec<FieldDescription>,
}

impl TableDescription {
    /// Combine a header with its fields.
    pub fn from_header(header: SpecTableHeader, fields: Vec<FieldDescription>) -> Self {
        Self {
            name: header.name,
            comment: header.comment,
            fields,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutOptions

/// Builder-wide options controlling sheet names, origin and widths.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecLayoutOptions {
    /// Index sheet name.
    pub sheet_name_index: String,
    /// Detail sheet name.
    pub sheet_name_detail: String,
    /// First row value handed out by the cursors.
    pub n_row_origin: u32,
    /// Blank rows reserved after each detail block.
    pub n_rows_spacer_after_table: u32,
    /// Index sheet column widths (A-F).
    pub widths_col_index: [f64; 6],
    /// Detail sheet column widths (A-F).
    pub widths_col_detail: [f64; 6],
    /// Column-label row text (A-F).
    pub field_labels: [String; 6],
    /// Hyperlink label.
    pub link_label: String,
}

impl Default for SpecLayoutOptions {
    fn default() -> Self {
        Self {
            sheet_name_index: C_SHEET_NAME_INDEX.to_string(),
            sheet_name_detail: C_SHEET_NAME_DETAIL.to_string(),
            n_row_origin: 0,
            n_rows_spacer_after_table: 0,
            widths_col_index: TUP_WIDTHS_COL_INDEX,
            widths_col_detail: TUP_WIDTHS_COL_DETAIL,
            field_labels: TUP_FIELD_LABELS.map(ToString::to_string),
            link_label: C_LINK_LABEL_LOCATION.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Rows allocated for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableLayout {
    /// Table name.
    pub table_name: String,
    /// Index sheet summary row.
    pub row_index: u32,
    /// Detail sheet header row (the hyperlink target).
    pub row_detail_header: u32,
    /// Detail sheet column-label row.
    pub row_detail_label: u32,
    /// Detail sheet field rows, one per field in input order.
    pub rows_detail_field: Vec<u32>,
    /// Last row of the bordered block.
    pub row_detail_last: u32,
}

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecLayoutReport {
    /// Layout records in arrival order.
    pub tables: Vec<SpecTableLayout>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecLayoutReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Total number of field rows written.
    pub fn n_fields_total(&self) -> usize {
        self.tables.iter().map(|t| t.rows_detail_field.len()).sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure raised by a schema source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the schema input failed.
    #[error("failed to read schema input: {0}")]
    Io(#[from] std::io::Error),
    /// Schema input is not valid.
    #[error("failed to parse schema input: {0}")]
    Parse(#[from] serde_json::Error),
    /// Catalog query failed.
    #[error("introspection failed: {0}")]
    Introspection(String),
}

/// Layout engine failure.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Range with end before start or beyond the Excel column limit.
    #[error(
        "invalid range on sheet {sheet}: rows {row_start}..={row_end}, cols {col_start}..={col_end}"
    )]
    StructuralRange {
        /// Sheet of the rejected range.
        sheet: EnumSheetId,
        /// First row.
        row_start: u32,
        /// Last row.
        row_end: u32,
        /// First column.
        col_start: u16,
        /// Last column.
        col_end: u16,
    },
    /// Allocation of zero rows.
    #[error("row allocation on sheet {sheet} must reserve >= 1 row (got {count})")]
    StructuralAllocation {
        /// Sheet of the rejected allocation.
        sheet: EnumSheetId,
        /// Requested row count.
        count: u32,
    },
    /// Hyperlink pointing at rows the cursor never handed out.
    #[error("hyperlink target rows {row_start}..={row_end} on sheet {sheet} are not allocated")]
    StructuralLinkTarget {
        /// Target sheet.
        sheet: EnumSheetId,
        /// First target row.
        row_start: u32,
        /// Last target row.
        row_end: u32,
    },
    /// Merge overlapping an already declared merge.
    #[error("merge {new} overlaps existing merge {existing} on sheet {sheet}")]
    StructuralMergeOverlap {
        /// Sheet of the merges.
        sheet: EnumSheetId,
        /// Existing merge in A1 notation.
        existing: String,
        /// Rejected merge in A1 notation.
        new: String,
    },
    /// Allocation past the Excel row limit.
    #[error("row overflow on sheet {sheet}: {count} rows requested at row {row_next}, limit {limit}")]
    RowOverflow {
        /// Sheet of the rejected allocation.
        sheet: EnumSheetId,
        /// Cursor value at the time of the request.
        row_next: u32,
        /// Requested row count.
        count: u32,
        /// Exclusive upper bound in cursor space.
        limit: u64,
    },
    /// Style handle not issued by this workbook.
    #[error("unknown style handle: {0}")]
    UnknownStyle(usize),
    /// Write attempted after the builder was finalized.
    #[error("cannot write after finalize()")]
    Finalized,
    /// Schema source failed; the export is aborted.
    #[error("schema source failed: {0}")]
    Upstream(#[from] SourceError),
    /// Workbook could not be persisted.
    #[error("xlsx write error: {0}")]
    Persistence(#[from] XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
