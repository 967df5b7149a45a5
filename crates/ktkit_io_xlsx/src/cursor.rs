//! Per-sheet row cursors.

use crate::conf::N_NROWS_EXCEL_MAX;
use crate::spec::{EnumSheetId, LayoutError, SpecRowTarget};

/// Next free row per sheet.
///
/// Cursors only move forward: every row handed out by [`Self::allocate`] is
/// consumed for the lifetime of the document, whether or not it is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCursor {
    n_row_origin: u32,
    l_rows_next: [u32; 2],
}

impl LayoutCursor {
    /// Create cursors for both sheets starting at `n_row_origin`.
    pub fn new(n_row_origin: u32) -> Self {
        Self {
            n_row_origin,
            l_rows_next: [n_row_origin; 2],
        }
    }

    /// Row value the cursors started at.
    pub fn origin(&self) -> u32 {
        self.n_row_origin
    }

    /// Current cursor value of `sheet` without advancing it.
    pub fn peek(&self, sheet: EnumSheetId) -> u32 {
        self.l_rows_next[sheet.position()]
    }

    /// Capture the address of the next region on `sheet` before it is filled.
    ///
    /// The returned target stays valid however many rows the region ends up
    /// spanning, because the cursor never hands the same row out twice.
    pub fn capture_target(&self, sheet: EnumSheetId) -> SpecRowTarget {
        SpecRowTarget {
            sheet,
            row: self.peek(sheet),
        }
    }

    /// Reserve `count` consecutive rows on `sheet` and return the first one.
    pub fn allocate(&mut self, sheet: EnumSheetId, count: u32) -> Result<u32, LayoutError> {
        if count == 0 {
            return Err(LayoutError::StructuralAllocation { sheet, count });
        }

        let n_row_next = self.peek(sheet);
        // The next-row value must itself fit in u32.
        let n_limit = (u64::from(self.n_row_origin) + N_NROWS_EXCEL_MAX as u64)
            .min(u64::from(u32::MAX));
        if u64::from(n_row_next) + u64::from(count) > n_limit {
            return Err(LayoutError::RowOverflow {
                sheet,
                row_next: n_row_next,
                count,
                limit: n_limit,
            });
        }

        self.l_rows_next[sheet.position()] = n_row_next + count;
        Ok(n_row_next)
    }

    /// Return whether `row` on `sheet` has been handed out.
    pub fn is_allocated(&self, sheet: EnumSheetId, row: u32) -> bool {
        row >= self.n_row_origin && row < self.peek(sheet)
    }

    /// Number of rows handed out on `sheet`.
    pub fn n_rows_allocated(&self, sheet: EnumSheetId) -> u32 {
        self.peek(sheet) - self.n_row_origin
    }
}

impl Default for LayoutCursor {
    fn default() -> Self {
        Self::new(0)
    }
}
