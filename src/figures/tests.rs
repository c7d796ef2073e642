use super::{discont_entry_cells, discont_grid_shape, median_comparison_shape};

#[test]
fn median_comparison_shape_matches_contract() {
    assert_eq!(median_comparison_shape(3, 2, true), (3, 10));
    assert_eq!(median_comparison_shape(3, 2, false), (2, 10));
    assert_eq!(median_comparison_shape(1, 4, true), (5, 4));
}

#[test]
fn discont_shape_follows_row_count() {
    // 7 algorithms + reference entry over 2 super-rows: 4 entries each,
    // plus the colorbar column.
    assert_eq!(discont_grid_shape(7, 2), (4, 5));
    assert_eq!(discont_grid_shape(3, 1), (2, 5));
    assert_eq!(discont_grid_shape(5, 3), (6, 3));
}

#[test]
fn discont_cells_tile_without_overlap() {
    for (n_algos, n_rows) in [(3usize, 1usize), (5, 2), (7, 2), (8, 3), (4, 4)] {
        let (rows, cols) = discont_grid_shape(n_algos, n_rows);
        let cells = discont_entry_cells(n_algos, n_rows);
        let mut seen = std::collections::HashSet::new();
        for &cell in &cells {
            assert!(
                cell < rows * cols,
                "cell {cell} outside {rows}x{cols} grid for {n_algos} algos / {n_rows} rows"
            );
            assert!(
                seen.insert(cell),
                "cell {cell} claimed twice for {n_algos} algos / {n_rows} rows"
            );
        }
    }
}

#[test]
fn discont_row_arithmetic_uses_floor_division() {
    // 5 algorithms over 2 super-rows: 3 entries per super-row. Entry 4
    // (the 4th algorithm) wraps into the second super-row, whose disparity
    // panels sit on grid row 2: floor(4 / 3) * 2 == 2.
    let (_, cols) = discont_grid_shape(5, 2);
    let cells = discont_entry_cells(5, 2);
    let expected_cell = 2 * cols + 1;
    assert!(
        cells.contains(&expected_cell),
        "entry 4 must claim row 2, column 1 (cell {expected_cell}), got {cells:?}"
    );
}
