
use crate::{RagError, Result};

/// Cosine similarity of two vectors, in `[-1, 1]`.
///
/// Returns 0 when either vector has zero magnitude. Vectors of different
/// lengths are a provider inconsistency and produce `DimensionMismatch`.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RagError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f32, 0.0_f32, 0.0_f32),
        |(dot, norm_a, norm_b), (&x, &y)| {
            (
                x.mul_add(y, dot),
                x.mul_add(x, norm_a),
                y.mul_add(y, norm_b),
            )
        },
    );

    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    if magnitude == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / magnitude).clamp(-1.0, 1.0))
}
