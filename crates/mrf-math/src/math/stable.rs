//! Numerically stable primitives for log-domain energy math.
//!
//! Gibbs conditionals are `exp(energy)` normalized over candidate labels.
//! Estimated affinities can be large counts, so energies are normalized in the
//! log domain: subtract the max, exponentiate, divide.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += (*v - max).exp();
    }
    max + sum.ln()
}

/// Convert unnormalized log weights into a probability vector.
///
/// Entries equal to -inf get probability zero. Returns `None` when the input
/// is empty, contains NaN or +inf, or has no finite entry, since no
/// distribution exists in those cases.
pub fn normalize_log_probs(log_weights: &[f64]) -> Option<Vec<f64>> {
    if log_weights.is_empty() {
        return None;
    }
    if log_weights
        .iter()
        .any(|w| w.is_nan() || *w == f64::INFINITY)
    {
        return None;
    }
    let lse = log_sum_exp(log_weights);
    if !lse.is_finite() {
        return None;
    }
    Some(log_weights.iter().map(|w| (w - lse).exp()).collect())
}

/// Softmax of `scale * energies`.
///
/// This is the Boltzmann distribution at inverse temperature `scale`.
pub fn softmax(energies: &[f64], scale: f64) -> Option<Vec<f64>> {
    let scaled: Vec<f64> = energies
        .iter()
        .map(|&e| {
            // 0 * -inf is NaN; a forbidden state stays forbidden at any scale.
            if e == f64::NEG_INFINITY {
                f64::NEG_INFINITY
            } else {
                scale * e
            }
        })
        .collect();
    normalize_log_probs(&scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn log_sum_exp_basic() {
        let v = [0.0, 0.0];
        let out = log_sum_exp(&v);
        assert!(approx_eq(out, 2.0f64.ln(), 1e-12));
    }

    #[test]
    fn log_sum_exp_dominance() {
        let v = [-1000.0, 0.0];
        let out = log_sum_exp(&v);
        assert!(approx_eq(out, 0.0, 1e-12));
    }

    #[test]
    fn log_sum_exp_all_neg_inf() {
        let v = [f64::NEG_INFINITY, f64::NEG_INFINITY];
        let out = log_sum_exp(&v);
        assert!(out.is_infinite() && out.is_sign_negative());
    }

    #[test]
    fn log_sum_exp_nan_propagates() {
        let out = log_sum_exp(&[0.0, f64::NAN]);
        assert!(out.is_nan());
    }

    #[test]
    fn normalize_uniform_when_equal() {
        let probs = normalize_log_probs(&[3.0, 3.0, 3.0, 3.0]).unwrap();
        for p in probs {
            assert!(approx_eq(p, 0.25, 1e-12));
        }
    }

    #[test]
    fn normalize_survives_huge_energies() {
        // exp(900) overflows f64; the log-domain path must not.
        let probs = normalize_log_probs(&[900.0, 899.0]).unwrap();
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!(approx_eq(probs[0], expected, 1e-12));
        assert!(approx_eq(probs[0] + probs[1], 1.0, 1e-12));
    }

    #[test]
    fn normalize_neg_inf_gets_zero_mass() {
        let probs = normalize_log_probs(&[f64::NEG_INFINITY, 0.0]).unwrap();
        assert_eq!(probs[0], 0.0);
        assert!(approx_eq(probs[1], 1.0, 1e-12));
    }

    #[test]
    fn normalize_rejects_degenerate_inputs() {
        assert!(normalize_log_probs(&[]).is_none());
        assert!(normalize_log_probs(&[f64::NAN, 0.0]).is_none());
        assert!(normalize_log_probs(&[f64::INFINITY, 0.0]).is_none());
        assert!(normalize_log_probs(&[f64::NEG_INFINITY, f64::NEG_INFINITY]).is_none());
    }

    #[test]
    fn softmax_scale_sharpens() {
        let soft = softmax(&[1.0, 0.0], 1.0).unwrap();
        let sharp = softmax(&[1.0, 0.0], 10.0).unwrap();
        assert!(sharp[0] > soft[0]);
        assert!(soft[0] > 0.5);
    }

    #[test]
    fn softmax_keeps_forbidden_states_forbidden() {
        let probs = softmax(&[f64::NEG_INFINITY, 2.0, 1.0], 0.5).unwrap();
        assert_eq!(probs[0], 0.0);
        assert!(probs[1] > probs[2]);
    }
}
