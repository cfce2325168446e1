// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector similarity helpers.

/// Cosine similarity of two vectors.
///
/// Returns 0 for empty, mismatched or zero-magnitude inputs, so callers never
/// see NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() { sim.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Map a similarity in [-1, 1] onto a confidence in [0, 1].
pub fn similarity_to_confidence(similarity: f64) -> f64 {
    ((similarity + 1.0) / 2.0).clamp(0.0, 1.0)
}

pub fn is_zero(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn identical_vectors_are_fully_similar() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_yield_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(similarity_to_confidence(0.0), 0.5);
    }

    proptest! {
        #[test]
        fn confidence_always_in_unit_range(
            a in proptest::collection::vec(-1000.0f32..1000.0, 0..16),
            b in proptest::collection::vec(-1000.0f32..1000.0, 0..16),
        ) {
            let sim = cosine_similarity(&a, &b);
            prop_assert!(!sim.is_nan());
            let conf = similarity_to_confidence(sim);
            prop_assert!((0.0..=1.0).contains(&conf));
        }
    }
}
