//! Dense row reconstruction from sparse cells.
//!
//! Every row spans the sheet's populated column range: row length is
//! `max_col - min_col + 1` and a value at column `c` lands at `c - min_col`.
//! Row indices are not renumbered; rows are yielded in ascending row order and
//! rows with no cells are not emitted.

use crate::error::{Error, Result};
use crate::xlsx::SheetCells;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::FusedIterator;

/// Widest row accepted: the column count of a worksheet (`A` through `XFD`).
pub const MAX_ROW_WIDTH: u64 = 16_384;

/// One output row.
pub type Row = Vec<String>;

/// Lazy iterator over the dense rows of one worksheet.
#[derive(Debug)]
pub struct Rows {
    rows: btree_map::IntoIter<u32, Vec<(u32, String)>>,
    min_col: u32,
    width: usize,
}

impl Rows {
    /// Group `cells` by row, ready to be densified one row at a time.
    ///
    /// Fails with [`Error::SheetTooWide`] when the populated columns span more
    /// than [`MAX_ROW_WIDTH`] positions.
    pub fn new(cells: SheetCells) -> Result<Self> {
        let (min_col, max_col) = cells.column_bounds().unwrap_or((0, 0));
        let width = if cells.is_empty() {
            0
        } else {
            u64::from(max_col - min_col) + 1
        };
        if width > MAX_ROW_WIDTH {
            return Err(Error::SheetTooWide {
                width,
                max: MAX_ROW_WIDTH,
            });
        }

        let mut grouped: BTreeMap<u32, Vec<(u32, String)>> = BTreeMap::new();
        for (coord, value) in cells {
            grouped.entry(coord.row).or_default().push((coord.col, value));
        }

        Ok(Self {
            rows: grouped.into_iter(),
            min_col,
            width: width as usize,
        })
    }

    /// Column of the sheet that maps to position 0 of every row.
    pub fn origin_column(&self) -> u32 {
        self.min_col
    }

    /// Length shared by every row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Yield `(row_index, row)` pairs instead of bare rows.
    pub fn indexed(self) -> IndexedRows {
        IndexedRows { inner: self }
    }

    fn next_entry(&mut self) -> Option<(u32, Row)> {
        let (row_index, cells) = self.rows.next()?;
        let mut row = vec![String::new(); self.width];
        for (col, value) in cells {
            row[(col - self.min_col) as usize] = value;
        }
        Some((row_index, row))
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|(_, row)| row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Rows {}

impl FusedIterator for Rows {}

/// Rows paired with their zero-indexed sheet row, see [`Rows::indexed`].
#[derive(Debug)]
pub struct IndexedRows {
    inner: Rows,
}

impl Iterator for IndexedRows {
    type Item = (u32, Row);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_entry()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IndexedRows {}
