//! Inverse-CDF draws from a finite categorical distribution.
//!
//! One uniform variate per draw, compared against the running cumulative sum
//! in index order. Keeping the method fixed keeps seeded runs reproducible.

use rand::Rng;

/// Map a uniform variate `u` in [0, 1) to a category index.
///
/// Returns the first index whose cumulative probability exceeds `u`. When
/// rounding leaves the total slightly below 1 and `u` lands past it, the last
/// index with non-zero mass is returned. Returns `None` for an empty vector
/// or one with no positive mass.
pub fn sample_index(probs: &[f64], u: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last_positive = Some(i);
        if u < cumulative {
            return Some(i);
        }
    }
    last_positive
}

/// Draw a category index from `probs` using one uniform from `rng`.
pub fn draw_categorical<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> Option<usize> {
    let u: f64 = rng.random();
    sample_index(probs, u)
}
