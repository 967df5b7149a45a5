//! Per-table layout orchestration.

use std::path::Path;

use tracing::{debug, info};

use crate::conf::{
    EnumStylePreset, N_COL_COMMENT_MERGE_START, N_COL_NAME_MERGE_END, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_LAYOUT, derive_style_preset,
};
use crate::cursor::LayoutCursor;
use crate::document::{DocumentWriter, SpecWorkbook};
use crate::source::SchemaSource;
use crate::spec::{
    EnumBuilderState, EnumSheetId, LayoutError, SpecCellRange, SpecCellRef, SpecLayoutOptions,
    SpecLayoutReport, SpecTableLayout, StyleHandle, TableDescription,
};
use crate::util::sanitize_sheet_name;
use crate::writer::save_workbook;

/// Stateful index/detail workbook builder.
///
/// Tables are laid out in arrival order in a single pass; nothing written for
/// an earlier table is revisited.
#[derive(Debug, Clone)]
pub struct WorkbookBuilder {
    options: SpecLayoutOptions,
    cursor: LayoutCursor,
    writer: DocumentWriter,
    h_header: StyleHandle,
    h_bordered: StyleHandle,
    state: EnumBuilderState,
    report: SpecLayoutReport,
}

impl WorkbookBuilder {
    /// Create a builder with both sheets, both cursors and the style presets.
    pub fn new(options: SpecLayoutOptions) -> Self {
        let mut report = SpecLayoutReport::default();

        let c_sheet_index = sanitize_sheet_name(&options.sheet_name_index, "_");
        let mut c_sheet_detail = sanitize_sheet_name(&options.sheet_name_detail, "_");
        if c_sheet_detail.eq_ignore_ascii_case(&c_sheet_index) {
            let c_renamed = derive_distinct_sheet_name(&c_sheet_detail);
            report.warn(format!(
                "detail sheet name `{c_sheet_detail}` collides with index sheet; using `{c_renamed}`"
            ));
            c_sheet_detail = c_renamed;
        }
        for (c_raw, c_used) in [
            (&options.sheet_name_index, &c_sheet_index),
            (&options.sheet_name_detail, &c_sheet_detail),
        ] {
            if c_raw != c_used {
                report.warn(format!("sheet name `{c_raw}` written as `{c_used}`"));
            }
        }

        let mut writer = DocumentWriter::new(SpecWorkbook::new(
            c_sheet_index,
            c_sheet_detail,
            options.widths_col_index,
            options.widths_col_detail,
            options.n_row_origin,
        ));
        let h_header = writer.register_style(derive_style_preset(EnumStylePreset::Header));
        let h_bordered = writer.register_style(derive_style_preset(EnumStylePreset::BorderedBlock));

        Self {
            cursor: LayoutCursor::new(options.n_row_origin),
            options,
            writer,
            h_header,
            h_bordered,
            state: EnumBuilderState::Accepting,
            report,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EnumBuilderState {
        self.state
    }

    /// Row cursors (read-only).
    pub fn cursor(&self) -> &LayoutCursor {
        &self.cursor
    }

    /// Workbook written so far.
    pub fn workbook(&self) -> &SpecWorkbook {
        self.writer.workbook()
    }

    /// Layout records and warnings collected so far.
    pub fn report(&self) -> &SpecLayoutReport {
        &self.report
    }

    /// Lay out one table: index row, detail header, label row and field rows.
    pub fn write_table(&mut self, table: &TableDescription) -> Result<SpecTableLayout, LayoutError> {
        if self.state == EnumBuilderState::Finalized {
            return Err(LayoutError::Finalized);
        }

        let row_index = self.cursor.allocate(EnumSheetId::Index, 1)?;
        self.write_title_block(EnumSheetId::Index, row_index, table)?;

        let target = self.cursor.capture_target(EnumSheetId::Detail);
        let row_detail_header = self.cursor.allocate(EnumSheetId::Detail, 1)?;
        self.write_title_block(EnumSheetId::Detail, row_detail_header, table)?;
        self.writer
            .apply_style(derive_layout_row(EnumSheetId::Detail, row_detail_header), self.h_header)?;

        self.link_to_target(row_index, target.row)?;

        let row_detail_label = self.cursor.allocate(EnumSheetId::Detail, 1)?;
        for (col, c_label) in (0u16..).zip(self.options.field_labels.iter()) {
            self.writer
                .write_cell(EnumSheetId::Detail, row_detail_label, col, c_label.as_str())?;
        }

        let mut rows_detail_field = Vec::with_capacity(table.fields.len());
        for field in &table.fields {
            let row = self.cursor.allocate(EnumSheetId::Detail, 1)?;
            for (col, c_value) in (0u16..).zip(field.to_row()) {
                self.writer.write_cell(EnumSheetId::Detail, row, col, c_value)?;
            }
            rows_detail_field.push(row);
        }

        let row_detail_last = rows_detail_field.last().copied().unwrap_or(row_detail_label);
        self.writer.apply_style(
            SpecCellRange::new(
                EnumSheetId::Detail,
                row_detail_header,
                0,
                row_detail_last,
                N_NCOLS_LAYOUT - 1,
            ),
            self.h_bordered,
        )?;

        if self.options.n_rows_spacer_after_table > 0 {
            self.cursor
                .allocate(EnumSheetId::Detail, self.options.n_rows_spacer_after_table)?;
        }

        debug!(
            table = %table.name,
            row_index,
            row_detail_header,
            n_fields = table.fields.len(),
            "table laid out"
        );

        let layout = SpecTableLayout {
            table_name: table.name.clone(),
            row_index,
            row_detail_header,
            row_detail_label,
            rows_detail_field,
            row_detail_last,
        };
        self.report.tables.push(layout.clone());
        Ok(layout)
    }

    /// Stop accepting tables. Idempotent.
    pub fn finalize(&mut self) {
        if self.state == EnumBuilderState::Finalized {
            return;
        }
        self.state = EnumBuilderState::Finalized;
        info!(
            n_tables = self.report.tables.len(),
            n_fields = self.report.n_fields_total(),
            "workbook finalized"
        );
    }

    /// Finalize and release the workbook with its report.
    pub fn into_parts(mut self) -> (SpecWorkbook, SpecLayoutReport) {
        self.finalize();
        (self.writer.into_workbook(), self.report)
    }

    fn write_title_block(
        &mut self,
        sheet: EnumSheetId,
        row: u32,
        table: &TableDescription,
    ) -> Result<(), LayoutError> {
        self.writer.merge_range(SpecCellRange::new(
            sheet,
            row,
            0,
            row,
            N_COL_NAME_MERGE_END,
        ))?;
        self.writer.merge_range(SpecCellRange::new(
            sheet,
            row,
            N_COL_COMMENT_MERGE_START,
            row,
            N_NCOLS_LAYOUT - 1,
        ))?;
        self.writer.write_cell(sheet, row, 0, table.name.as_str())?;
        self.writer
            .write_cell(sheet, row, N_COL_COMMENT_MERGE_START, table.comment.as_str())?;
        Ok(())
    }

    fn link_to_target(&mut self, row_index: u32, row_target: u32) -> Result<(), LayoutError> {
        if !self.cursor.is_allocated(EnumSheetId::Detail, row_target) {
            return Err(LayoutError::StructuralLinkTarget {
                sheet: EnumSheetId::Detail,
                row_start: row_target,
                row_end: row_target,
            });
        }
        self.writer.link(
            SpecCellRef {
                sheet: EnumSheetId::Index,
                row: row_index,
                col: 0,
            },
            derive_layout_row(EnumSheetId::Detail, row_target),
            self.options.link_label.as_str(),
        )
    }
}

/// Drain `source` into a fresh builder and return the finished workbook.
///
/// Each table's fields are fetched before any of its rows are allocated. On
/// error the partially built workbook is dropped.
pub fn export_schema<S>(
    source: &mut S,
    options: SpecLayoutOptions,
) -> Result<(SpecWorkbook, SpecLayoutReport), LayoutError>
where
    S: SchemaSource + ?Sized,
{
    let mut builder = WorkbookBuilder::new(options);
    while let Some(table) = source.next_description()? {
        builder.write_table(&table)?;
    }
    Ok(builder.into_parts())
}

/// Drain `source` and save the workbook to `path_file_out`.
pub fn export_schema_to_path<S>(
    source: &mut S,
    options: SpecLayoutOptions,
    path_file_out: &Path,
) -> Result<SpecLayoutReport, LayoutError>
where
    S: SchemaSource + ?Sized,
{
    let (workbook, report) = export_schema(source, options)?;
    save_workbook(&workbook, path_file_out)?;
    Ok(report)
}

fn derive_layout_row(sheet: EnumSheetId, row: u32) -> SpecCellRange {
    SpecCellRange::new(sheet, row, 0, row, N_NCOLS_LAYOUT - 1)
}

fn derive_distinct_sheet_name(name: &str) -> String {
    let c_suffix = "_2";
    let n_keep = N_LEN_EXCEL_SHEET_NAME_MAX - c_suffix.len();
    let c_base: String = name.chars().take(n_keep).collect();
    format!("{c_base}{c_suffix}")
}
