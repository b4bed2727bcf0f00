//! Sparse user-item rating matrix.
//!
//! Rows are the sorted unique user ids, columns the sorted unique movie ids.
//! Storage is CSR (compressed sparse row), built directly from
//! `(user, movie, value)` triplets so no dense intermediate is needed.
//! A missing cell reads as `0.0`, which means "not rated" and never a rating.

use crate::types::{MovieId, UserId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingMatrix {
    users: Vec<UserId>,
    movies: Vec<MovieId>,
    user_rows: HashMap<UserId, usize>,
    movie_cols: HashMap<MovieId, usize>,

    // CSR storage: row i spans col_idx[row_ptr[i]..row_ptr[i + 1]]
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl RatingMatrix {
    /// Matrix with no users and no movies
    pub fn empty() -> Self {
        Self {
            row_ptr: vec![0],
            ..Self::default()
        }
    }

    /// Build from `(user, movie) -> value` cells.
    ///
    /// The BTreeMap ordering gives rows sorted by user and, within a row,
    /// columns sorted by movie, which is exactly the CSR order.
    pub fn from_cells(cells: &BTreeMap<(UserId, MovieId), f64>) -> Self {
        if cells.is_empty() {
            return Self::empty();
        }

        let mut users: Vec<UserId> = cells.keys().map(|(u, _)| *u).collect();
        users.dedup();
        let mut movies: Vec<MovieId> = cells.keys().map(|(_, m)| m.clone()).collect();
        movies.sort_unstable();
        movies.dedup();

        let user_rows: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(i, &u)| (u, i)).collect();
        let movie_cols: HashMap<MovieId, usize> =
            movies.iter().enumerate().map(|(j, m)| (m.clone(), j)).collect();

        let mut row_ptr = Vec::with_capacity(users.len() + 1);
        let mut col_idx = Vec::with_capacity(cells.len());
        let mut values = Vec::with_capacity(cells.len());

        row_ptr.push(0);
        let mut current_row = 0;
        for ((user, movie), &value) in cells {
            let row = user_rows[user];
            while current_row < row {
                row_ptr.push(col_idx.len());
                current_row += 1;
            }
            col_idx.push(movie_cols[movie]);
            values.push(value);
        }
        while row_ptr.len() <= users.len() {
            row_ptr.push(col_idx.len());
        }

        Self {
            users,
            movies,
            user_rows,
            movie_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Row user ids, ascending
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Column movie ids, ascending
    pub fn movies(&self) -> &[MovieId] {
        &self.movies
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.users.len(), self.movies.len())
    }

    /// Number of stored (non-zero) cells
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Fraction of cells holding a rating
    pub fn density(&self) -> f64 {
        let (rows, cols) = self.shape();
        if rows == 0 || cols == 0 {
            return 0.0;
        }
        self.nnz() as f64 / (rows * cols) as f64
    }

    /// Row index of a user
    pub fn row_of(&self, user_id: UserId) -> Option<usize> {
        self.user_rows.get(&user_id).copied()
    }

    /// Column index of a movie
    pub fn col_of(&self, movie_id: &str) -> Option<usize> {
        self.movie_cols.get(movie_id).copied()
    }

    /// Sparse view of one row: parallel slices of column indices and values.
    ///
    /// Returns `None` when the row index is out of range.
    pub fn row(&self, row: usize) -> Option<(&[usize], &[f64])> {
        let start = *self.row_ptr.get(row)?;
        let end = *self.row_ptr.get(row + 1)?;
        Some((&self.col_idx[start..end], &self.values[start..end]))
    }

    /// Rating stored for `(user, movie)`; `0.0` when not rated
    pub fn get(&self, user_id: UserId, movie_id: &str) -> f64 {
        let (Some(row), Some(col)) = (self.row_of(user_id), self.col_of(movie_id)) else {
            return 0.0;
        };
        self.row(row)
            .and_then(|(cols, vals)| cols.binary_search(&col).ok().map(|k| vals[k]))
            .unwrap_or(0.0)
    }

    /// Movies a user rated (> 0), in column order
    pub fn rated_movies(&self, user_id: UserId) -> Vec<&MovieId> {
        let Some((cols, vals)) = self.row_of(user_id).and_then(|r| self.row(r)) else {
            return Vec::new();
        };
        cols.iter()
            .zip(vals)
            .filter(|(_, v)| **v > 0.0)
            .map(|(&c, _)| &self.movies[c])
            .collect()
    }

    /// Dense copy, rows x columns, zeros for missing cells
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.users.len())
            .map(|r| {
                let mut dense = vec![0.0; self.movies.len()];
                if let Some((cols, vals)) = self.row(r) {
                    for (&c, &v) in cols.iter().zip(vals) {
                        dense[c] = v;
                    }
                }
                dense
            })
            .collect()
    }
}
