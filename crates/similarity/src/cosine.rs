//! Cosine similarity between users.
//!
//! Entry `(i, j)` is `dot(i, j) / (|i| * |j|)` over the rows of the rating
//! matrix. Conventions:
//! - a zero row has similarity 0 to every row, itself included
//! - the diagonal of a non-zero row is exactly 1.0
//! - the matrix is symmetric by construction (upper triangle mirrored)
//!
//! Rows are computed in parallel with Rayon; each cell depends only on its two
//! rows, so the result is identical to a sequential pass.

use data_loader::{RatingMatrix, UserId};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Square user x user similarity matrix, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    users: Vec<UserId>,
    index: HashMap<UserId, usize>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Matrix over no users
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble from a user axis and `n * n` row-major values.
    ///
    /// Returns `None` when the value count does not match the axis.
    pub fn from_parts(users: Vec<UserId>, values: Vec<f64>) -> Option<Self> {
        if values.len() != users.len() * users.len() {
            return None;
        }
        let index = users.iter().enumerate().map(|(i, &u)| (u, i)).collect();
        Some(Self {
            users,
            index,
            values,
        })
    }

    /// User on each axis, in rating-matrix row order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Axis position of a user
    pub fn position(&self, user_id: UserId) -> Option<usize> {
        self.index.get(&user_id).copied()
    }

    /// Similarities of the user at `position` to every user, in axis order
    pub fn row(&self, position: usize) -> Option<&[f64]> {
        let n = self.users.len();
        if position >= n {
            return None;
        }
        Some(&self.values[position * n..(position + 1) * n])
    }

    /// Similarity between two users, if both are known
    pub fn get(&self, a: UserId, b: UserId) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.values[i * self.users.len() + j])
    }
}

/// Compute pairwise cosine similarity between all rows of `ratings`.
#[instrument(skip(ratings), fields(users = ratings.shape().0, movies = ratings.shape().1))]
pub fn cosine_similarity(ratings: &RatingMatrix) -> SimilarityMatrix {
    let n = ratings.shape().0;
    if n == 0 {
        return SimilarityMatrix::empty();
    }

    let rows: Vec<(&[usize], &[f64])> = (0..n)
        .map(|r| ratings.row(r).unwrap_or((&[], &[])))
        .collect();
    let norms: Vec<f64> = rows
        .iter()
        .map(|(_, vals)| vals.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    // Upper triangle, one Vec per row: upper[i][k] is the cell (i, i + k)
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (i..n)
                .map(|j| {
                    if norms[i] == 0.0 || norms[j] == 0.0 {
                        0.0
                    } else if i == j {
                        1.0
                    } else {
                        let dot = sparse_dot(rows[i], rows[j]);
                        (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0)
                    }
                })
                .collect()
        })
        .collect();

    let mut values = vec![0.0; n * n];
    for (i, row) in upper.iter().enumerate() {
        for (k, &sim) in row.iter().enumerate() {
            let j = i + k;
            values[i * n + j] = sim;
            values[j * n + i] = sim;
        }
    }

    debug!("Computed {}x{} similarity matrix", n, n);
    SimilarityMatrix {
        users: ratings.users().to_vec(),
        index: ratings
            .users()
            .iter()
            .enumerate()
            .map(|(i, &u)| (u, i))
            .collect(),
        values,
    }
}

/// Dot product of two CSR rows with sorted column indices
fn sparse_dot(a: (&[usize], &[f64]), b: (&[usize], &[f64])) -> f64 {
    let (a_cols, a_vals) = a;
    let (b_cols, b_vals) = b;
    let (mut x, mut y) = (0, 0);
    let mut dot = 0.0;

    while x < a_cols.len() && y < b_cols.len() {
        match a_cols[x].cmp(&b_cols[y]) {
            std::cmp::Ordering::Less => x += 1,
            std::cmp::Ordering::Greater => y += 1,
            std::cmp::Ordering::Equal => {
                dot += a_vals[x] * b_vals[y];
                x += 1;
                y += 1;
            }
        }
    }
    dot
}
