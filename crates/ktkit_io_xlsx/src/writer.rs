//! XLSX persistence for a finished [`SpecWorkbook`].

use std::collections::BTreeSet;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatBorder, Url, Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::document::SpecWorkbook;
use crate::spec::{EnumSheetId, LayoutError, SpecCellFormat};
use crate::util::{cast_row_num, derive_internal_link_target, derive_merge_cover_tracker};

/// Render `workbook` and save it to `path_file_out`.
///
/// The path is used as given; no extension is added.
pub fn save_workbook(workbook: &SpecWorkbook, path_file_out: &Path) -> Result<(), LayoutError> {
    let mut xlsx = derive_rust_xlsx_workbook(workbook)?;
    xlsx.save(path_file_out)?;
    info!(path = %path_file_out.display(), "workbook saved");
    Ok(())
}

/// Render `workbook` into an in-memory XLSX file.
pub fn save_workbook_to_buffer(workbook: &SpecWorkbook) -> Result<Vec<u8>, LayoutError> {
    let mut xlsx = derive_rust_xlsx_workbook(workbook)?;
    Ok(xlsx.save_to_buffer()?)
}

fn derive_rust_xlsx_workbook(workbook: &SpecWorkbook) -> Result<Workbook, LayoutError> {
    let mut xlsx = Workbook::new();
    for sheet_id in EnumSheetId::ALL {
        let worksheet = xlsx.add_worksheet();
        write_sheet(worksheet, workbook, sheet_id)?;
        if sheet_id == EnumSheetId::Index {
            worksheet.set_active(true);
        }
    }
    Ok(xlsx)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    workbook: &SpecWorkbook,
    sheet_id: EnumSheetId,
) -> Result<(), LayoutError> {
    let sheet = workbook.sheet(sheet_id);
    let n_row_origin = workbook.origin();

    worksheet.set_name(sheet.name())?;
    for (col, width) in (0u16..).zip(sheet.widths_col().iter()) {
        worksheet.set_column_width(col, *width)?;
    }

    let derive_format = |row: u32, col: u16| {
        workbook
            .derive_cell_format(sheet_id, row, col)
            .map(|spec| derive_rust_xlsx_format(&spec))
    };
    let set_cells_covered = derive_merge_cover_tracker(sheet.merges());

    // Merges first; the anchor cell's text and format become the merged cell.
    for merge in sheet.merges() {
        let fmt_anchor =
            derive_format(merge.row_start, merge.col_start).unwrap_or_else(Format::new);
        worksheet.merge_range(
            cast_row(merge.row_start, n_row_origin)?,
            merge.col_start,
            cast_row(merge.row_end, n_row_origin)?,
            merge.col_end,
            sheet.cell(merge.row_start, merge.col_start).unwrap_or(""),
            &fmt_anchor,
        )?;
    }
    let set_anchors: BTreeSet<(u32, u16)> = sheet
        .merges()
        .iter()
        .map(|m| (m.row_start, m.col_start))
        .collect();

    for (&(row, col), value) in sheet.cells() {
        if set_anchors.contains(&(row, col)) || set_cells_covered.contains(&(row, col)) {
            continue;
        }
        let n_row = cast_row(row, n_row_origin)?;
        match derive_format(row, col) {
            Some(fmt) => worksheet.write_string_with_format(n_row, col, value, &fmt)?,
            None => worksheet.write_string(n_row, col, value)?,
        };
    }

    // Styled cells without text, including cells hidden under a merge.
    for (row, col) in workbook.derive_styled_cells(sheet_id) {
        if set_anchors.contains(&(row, col)) {
            continue;
        }
        if sheet.cell(row, col).is_some() && !set_cells_covered.contains(&(row, col)) {
            continue;
        }
        if let Some(fmt) = derive_format(row, col) {
            worksheet.write_blank(cast_row(row, n_row_origin)?, col, &fmt)?;
        }
    }

    // Hyperlinks last so they win on the final cell record.
    let c_sheet_name_detail = workbook.sheet(EnumSheetId::Detail).name();
    let c_sheet_name_index = workbook.sheet(EnumSheetId::Index).name();
    for edge in workbook
        .hyperlinks()
        .iter()
        .filter(|e| e.source.sheet == sheet_id)
    {
        let c_target_sheet = match edge.target.sheet {
            EnumSheetId::Index => c_sheet_name_index,
            EnumSheetId::Detail => c_sheet_name_detail,
        };
        let url = Url::new(derive_internal_link_target(
            c_target_sheet,
            &edge.target,
            n_row_origin,
        ))
        .set_text(sheet.cell(edge.source.row, edge.source.col).unwrap_or(""))
        .set_tip(edge.label.as_str());

        let n_row = cast_row(edge.source.row, n_row_origin)?;
        match derive_format(edge.source.row, edge.source.col) {
            Some(fmt) => worksheet.write_url_with_format(n_row, edge.source.col, url, &fmt)?,
            None => worksheet.write_url(n_row, edge.source.col, url)?,
        };
    }

    debug!(
        sheet = sheet.name(),
        n_cells = sheet.cells().count(),
        n_merges = sheet.merges().len(),
        "sheet rendered"
    );
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        5 => FormatBorder::Thick,
        _ => FormatBorder::None,
    }
}

fn cast_row(row: u32, n_row_origin: u32) -> Result<u32, LayoutError> {
    cast_row_num(row, n_row_origin)
        .map_err(|msg| LayoutError::Persistence(XlsxError::ParameterError(msg)))
}
