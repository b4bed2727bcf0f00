//! Neighbor selection: the users most similar to the target.

use crate::error::{RecommendError, Result};
use similarity::SimilarityMatrix;

/// Axis positions of the `k` users most similar to the user at `position`.
///
/// The target itself is never its own neighbor. Ties keep matrix row order
/// (stable sort). A non-finite similarity is an internal error.
pub fn nearest_neighbors(similarity: &SimilarityMatrix, position: usize, k: usize) -> Result<Vec<usize>> {
    let row = similarity.row(position).ok_or_else(|| {
        RecommendError::Internal(format!("no similarity row at position {}", position))
    })?;

    if let Some(bad) = row.iter().position(|s| !s.is_finite()) {
        return Err(RecommendError::Internal(format!(
            "non-finite similarity between positions {} and {}",
            position, bad
        )));
    }

    let mut others: Vec<(usize, f64)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(j, _)| j != position)
        .collect();

    // Sort by similarity DESC; slice::sort_by is stable
    others.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    others.truncate(k);

    Ok(others.into_iter().map(|(j, _)| j).collect())
}
