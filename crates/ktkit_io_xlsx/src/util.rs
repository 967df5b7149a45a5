//! Stateless helper utilities used by the layout engine and XLSX writer.

use std::collections::BTreeSet;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{LayoutError, SpecCellRange};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Quote a sheet name for use inside a cell reference (`'my sheet'`).
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region A1Notation

/// Convert a zero-based column index to letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letters(col: u16) -> String {
    let mut n_col = u32::from(col) + 1;
    let mut l_chars = Vec::new();
    while n_col > 0 {
        let n_rem = (n_col - 1) % 26;
        l_chars.push(char::from(b'A' + n_rem as u8));
        n_col = (n_col - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// Convert a cursor-space cell to A1 notation.
///
/// `n_row_origin` is the row value the cursors start at, so the result is the
/// same whether the cursor space is 0- or 1-based.
pub fn derive_cell_a1(row: u32, col: u16, n_row_origin: u32) -> String {
    let n_row_1based = u64::from(row).saturating_sub(u64::from(n_row_origin)) + 1;
    format!("{}{n_row_1based}", derive_column_letters(col))
}

/// Convert a cursor-space range to A1 notation (`A5:F5`).
pub fn derive_range_a1(range: &SpecCellRange, n_row_origin: u32) -> String {
    format!(
        "{}:{}",
        derive_cell_a1(range.row_start, range.col_start, n_row_origin),
        derive_cell_a1(range.row_end, range.col_end, n_row_origin)
    )
}

/// Build the `internal:` location for a hyperlink into `sheet_name`.
pub fn derive_internal_link_target(
    sheet_name: &str,
    range: &SpecCellRange,
    n_row_origin: u32,
) -> String {
    format!(
        "internal:{}!{}",
        quote_sheet_name(sheet_name),
        derive_range_a1(range, n_row_origin)
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CoordinateValidation

/// Validate range ordering and the Excel column limit.
pub fn validate_cell_range(range: &SpecCellRange) -> Result<(), LayoutError> {
    if range.row_end < range.row_start
        || range.col_end < range.col_start
        || usize::from(range.col_end) >= N_NCOLS_EXCEL_MAX
    {
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

/// Convert a cursor-space row to the zero-based row number used by the writer.
pub fn cast_row_num(row: u32, n_row_origin: u32) -> Result<u32, String> {
    row.checked_sub(n_row_origin)
        .ok_or_else(|| format!("row {row} lies before origin {n_row_origin}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeUtils

/// Build lookup set of cells covered by a merge (excluding each anchor).
pub fn derive_merge_cover_tracker(merges: &[SpecCellRange]) -> BTreeSet<(u32, u16)> {
    let mut set_cells_covered = BTreeSet::new();

    for merge in merges {
        for row_idx in merge.row_start..=merge.row_end {
            for col_idx in merge.col_start..=merge.col_end {
                if row_idx == merge.row_start && col_idx == merge.col_start {
                    continue;
                }
                set_cells_covered.insert((row_idx, col_idx));
            }
        }
    }

    set_cells_covered
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumSheetId;

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_chars() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_derive_column_letters() {
        assert_eq!(derive_column_letters(0), "A");
        assert_eq!(derive_column_letters(5), "F");
        assert_eq!(derive_column_letters(25), "Z");
        assert_eq!(derive_column_letters(26), "AA");
        assert_eq!(derive_column_letters(701), "ZZ");
        assert_eq!(derive_column_letters(702), "AAA");
    }

    #[test]
    fn test_cell_a1_is_origin_agnostic() {
        assert_eq!(derive_cell_a1(0, 0, 0), "A1");
        assert_eq!(derive_cell_a1(1, 0, 1), "A1");
        assert_eq!(derive_cell_a1(4, 5, 0), "F5");
        assert_eq!(derive_cell_a1(5, 5, 1), "F5");
    }

    #[test]
    fn test_internal_link_target_quotes_sheet_name() {
        let range = SpecCellRange::new(EnumSheetId::Detail, 4, 0, 4, 5);
        assert_eq!(
            derive_internal_link_target("detail", &range, 0),
            "internal:'detail'!A5:F5"
        );
        assert_eq!(
            derive_internal_link_target("it's", &range, 0),
            "internal:'it''s'!A5:F5"
        );
    }

    #[test]
    fn test_validate_cell_range_rejects_inverted_ranges() {
        let ok = SpecCellRange::new(EnumSheetId::Index, 2, 0, 2, 5);
        assert!(validate_cell_range(&ok).is_ok());

        let rows_inverted = SpecCellRange::new(EnumSheetId::Index, 3, 0, 2, 5);
        assert!(matches!(
            validate_cell_range(&rows_inverted),
            Err(LayoutError::StructuralRange { .. })
        ));

        let cols_inverted = SpecCellRange::new(EnumSheetId::Index, 2, 4, 2, 3);
        assert!(validate_cell_range(&cols_inverted).is_err());
    }

    #[test]
    fn test_cast_row_num_rejects_rows_before_origin() {
        assert_eq!(cast_row_num(5, 1), Ok(4));
        assert!(cast_row_num(0, 1).is_err());
    }

    #[test]
    fn test_merge_cover_tracker_skips_anchor() {
        let merges = vec![SpecCellRange::new(EnumSheetId::Index, 0, 0, 0, 2)];
        let set_covered = derive_merge_cover_tracker(&merges);
        assert!(!set_covered.contains(&(0, 0)));
        assert!(set_covered.contains(&(0, 1)));
        assert!(set_covered.contains(&(0, 2)));
        assert_eq!(set_covered.len(), 2);
    }
}
