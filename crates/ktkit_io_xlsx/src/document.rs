//! In-memory workbook value and the writer that mutates it.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{
    EnumSheetId, LayoutError, SpecCellFormat, SpecCellRange, SpecCellRef, SpecHyperlinkEdge,
    SpecStyleAssignment, StyleHandle,
};
use crate::style::StyleRegistry;
use crate::util::{derive_range_a1, validate_cell_range};

////////////////////////////////////////////////////////////////////////////////
// #region Workbook

/// One named, append-only sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheet {
    name: String,
    widths_col: [f64; 6],
    cells: BTreeMap<(u32, u16), String>,
    merges: Vec<SpecCellRange>,
}

impl SpecSheet {
    fn new(name: String, widths_col: [f64; 6]) -> Self {
        Self {
            name,
            widths_col,
            cells: BTreeMap::new(),
            merges: Vec::new(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column widths (A-F).
    pub fn widths_col(&self) -> &[f64; 6] {
        &self.widths_col
    }

    /// Text of one written cell.
    pub fn cell(&self, row: u32, col: u16) -> Option<&str> {
        self.cells.get(&(row, col)).map(String::as_str)
    }

    /// All written cells, ordered by `(row, col)`.
    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u16), &String)> {
        self.cells.iter()
    }

    /// Declared merged ranges in declaration order.
    pub fn merges(&self) -> &[SpecCellRange] {
        &self.merges
    }
}

/// Finished (or in-progress) two-sheet document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWorkbook {
    n_row_origin: u32,
    sheets: [SpecSheet; 2],
    styles: StyleRegistry,
    style_assignments: Vec<SpecStyleAssignment>,
    hyperlinks: Vec<SpecHyperlinkEdge>,
}

impl SpecWorkbook {
    /// Create an empty workbook with both sheets.
    pub fn new(
        sheet_name_index: String,
        sheet_name_detail: String,
        widths_col_index: [f64; 6],
        widths_col_detail: [f64; 6],
        n_row_origin: u32,
    ) -> Self {
        Self {
            n_row_origin,
            sheets: [
                SpecSheet::new(sheet_name_index, widths_col_index),
                SpecSheet::new(sheet_name_detail, widths_col_detail),
            ],
            styles: StyleRegistry::new(),
            style_assignments: Vec::new(),
            hyperlinks: Vec::new(),
        }
    }

    /// Row value of the first row in cursor space.
    pub fn origin(&self) -> u32 {
        self.n_row_origin
    }

    /// Borrow one sheet.
    pub fn sheet(&self, sheet: EnumSheetId) -> &SpecSheet {
        &self.sheets[sheet.position()]
    }

    /// Registered styles.
    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Style assignments in application order.
    pub fn style_assignments(&self) -> &[SpecStyleAssignment] {
        &self.style_assignments
    }

    /// Hyperlink edges in creation order.
    pub fn hyperlinks(&self) -> &[SpecHyperlinkEdge] {
        &self.hyperlinks
    }

    /// Effective format of one cell, layering every covering assignment in order.
    ///
    /// Returns `None` for cells no style was ever applied to.
    pub fn derive_cell_format(&self, sheet: EnumSheetId, row: u32, col: u16) -> Option<SpecCellFormat> {
        let mut fmt_cell: Option<SpecCellFormat> = None;
        for assignment in &self.style_assignments {
            if assignment.range.sheet != sheet || !assignment.range.contains(row, col) {
                continue;
            }
            let Some(fmt_style) = self.styles.get(assignment.handle) else {
                continue;
            };
            fmt_cell = Some(match fmt_cell {
                Some(fmt_prev) => fmt_prev.merge(fmt_style),
                None => fmt_style.clone(),
            });
        }
        fmt_cell
    }

    /// Cells covered by at least one style assignment on `sheet`.
    pub fn derive_styled_cells(&self, sheet: EnumSheetId) -> BTreeSet<(u32, u16)> {
        let mut set_cells = BTreeSet::new();
        for assignment in &self.style_assignments {
            let range = &assignment.range;
            if range.sheet != sheet {
                continue;
            }
            for row in range.row_start..=range.row_end {
                for col in range.col_start..=range.col_end {
                    set_cells.insert((row, col));
                }
            }
        }
        set_cells
    }

    fn sheet_mut(&mut self, sheet: EnumSheetId) -> &mut SpecSheet {
        &mut self.sheets[sheet.position()]
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Writer

/// Mutation API over a [`SpecWorkbook`].
///
/// Every coordinate is validated on entry; a bad coordinate is a caller bug
/// and surfaces as a `LayoutError::Structural*` instead of being clamped.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    workbook: SpecWorkbook,
}

impl DocumentWriter {
    /// Wrap an empty workbook.
    pub fn new(workbook: SpecWorkbook) -> Self {
        Self { workbook }
    }

    /// Borrow the workbook being written.
    pub fn workbook(&self) -> &SpecWorkbook {
        &self.workbook
    }

    /// Release the workbook.
    pub fn into_workbook(self) -> SpecWorkbook {
        self.workbook
    }

    /// Register a style in the workbook's style table.
    pub fn register_style(&mut self, spec: SpecCellFormat) -> StyleHandle {
        self.workbook.styles.register(spec)
    }

    /// Set a text value; last write wins.
    pub fn write_cell(
        &mut self,
        sheet: EnumSheetId,
        row: u32,
        col: u16,
        value: impl Into<String>,
    ) -> Result<(), LayoutError> {
        self.validate_range(&SpecCellRange::new(sheet, row, col, row, col))?;
        self.workbook
            .sheet_mut(sheet)
            .cells
            .insert((row, col), value.into());
        Ok(())
    }

    /// Declare a merged region.
    ///
    /// Cell writes may happen before or after; the anchor cell's text is what
    /// the merged region shows.
    pub fn merge_range(&mut self, range: SpecCellRange) -> Result<(), LayoutError> {
        self.validate_range(&range)?;

        let n_row_origin = self.workbook.n_row_origin;
        let sheet = self.workbook.sheet_mut(range.sheet);
        if let Some(existing) = sheet.merges.iter().find(|m| m.intersects(&range)) {
            return Err(LayoutError::StructuralMergeOverlap {
                sheet: range.sheet,
                existing: derive_range_a1(existing, n_row_origin),
                new: derive_range_a1(&range, n_row_origin),
            });
        }
        sheet.merges.push(range);
        Ok(())
    }

    /// Apply a style to every cell of `range`, written or not.
    pub fn apply_style(
        &mut self,
        range: SpecCellRange,
        handle: StyleHandle,
    ) -> Result<(), LayoutError> {
        self.validate_range(&range)?;
        if self.workbook.styles.get(handle).is_none() {
            return Err(LayoutError::UnknownStyle(handle.index()));
        }
        self.workbook
            .style_assignments
            .push(SpecStyleAssignment { range, handle });
        Ok(())
    }

    /// Install a navigable cross-reference from `source` to `target`.
    pub fn link(
        &mut self,
        source: SpecCellRef,
        target: SpecCellRange,
        label: impl Into<String>,
    ) -> Result<(), LayoutError> {
        self.validate_range(&SpecCellRange::new(
            source.sheet,
            source.row,
            source.col,
            source.row,
            source.col,
        ))?;
        self.validate_range(&target)?;
        self.workbook.hyperlinks.push(SpecHyperlinkEdge {
            source,
            target,
            label: label.into(),
        });
        Ok(())
    }

    fn validate_range(&self, range: &SpecCellRange) -> Result<(), LayoutError> {
        validate_cell_range(range)?;
        if range.row_start < self.workbook.n_row_origin {
            return Err(LayoutError::StructuralRange {
                sheet: range.sheet,
                row_start: range.row_start,
                row_end: range.row_end,
                col_start: range.col_start,
                col_end: range.col_end,
            });
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
