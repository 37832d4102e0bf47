//! Two-parameter regressions on time: binomial GLM (logit link, IRLS) for token shares
//! and ordinary least squares for average sentiment.

use crate::dist::{normal_two_sided_p, student_t_two_sided_p};
use thiserror::Error;

/// IRLS convergence tolerance on relative deviance change.
pub const GLM_EPSILON: f64 = 1e-8;
/// IRLS iteration cap.
pub const GLM_MAX_ITER: usize = 25;

/// Why a group could not be fitted. The group is skipped; the run continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least 2 distinct time points, got {distinct}")]
    InsufficientPoints { distinct: usize },
    #[error("singular design (no weight spread over time)")]
    Singular,
    #[error("IRLS did not converge in {iterations} iterations")]
    NoConvergence { iterations: usize },
    #[error("non-finite estimate")]
    NonFinite,
}

/// The time coefficient of one fitted model. Slope units are per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub estimate: f64,
    pub std_error: Option<f64>,
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub n_points: usize,
    pub iterations: usize,
}

/// Per-bucket binomial observation: successes against failures at time `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialObs {
    pub x: f64,
    pub successes: u64,
    pub failures: u64,
}

fn distinct_count(xs: impl Iterator<Item = f64>) -> usize {
    let mut v: Vec<f64> = xs.collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup();
    v.len()
}

/// Center and scale `xs`. Returns (mean, sd, standardized values).
fn standardize(xs: &[f64]) -> (f64, f64, Vec<f64>) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let sd = var.sqrt();
    let z = xs.iter().map(|x| (x - mean) / sd).collect();
    (mean, sd, z)
}

#[inline]
fn logistic(eta: f64) -> f64 {
    // Same clamp as R's binomial linkinv: keep mu inside (eps, 1 - eps).
    let mu = 1.0 / (1.0 + (-eta).exp());
    mu.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
}

#[inline]
fn xlogy_ratio(y: f64, denom: f64) -> f64 {
    if y > 0.0 { y * (y / denom).ln() } else { 0.0 }
}

fn binomial_deviance(obs: &[BinomialObs], mu: &[f64]) -> f64 {
    obs.iter()
        .zip(mu)
        .map(|(o, &p)| {
            let s = o.successes as f64;
            let f = o.failures as f64;
            let m = s + f;
            2.0 * (xlogy_ratio(s, m * p) + xlogy_ratio(f, m * (1.0 - p)))
        })
        .sum()
}

/// Fit `logit(successes / (successes + failures)) = a + b * x` by iteratively reweighted
/// least squares. Deterministic: starts from the smoothed empirical proportions.
pub fn fit_binomial(obs: &[BinomialObs]) -> Result<Fit, FitError> {
    let obs: Vec<BinomialObs> = obs.iter().copied().filter(|o| o.successes + o.failures > 0).collect();
    let distinct = distinct_count(obs.iter().map(|o| o.x));
    if distinct < 2 {
        return Err(FitError::InsufficientPoints { distinct });
    }

    let xs: Vec<f64> = obs.iter().map(|o| o.x).collect();
    let (_, sd, z) = standardize(&xs);
    let m: Vec<f64> = obs.iter().map(|o| (o.successes + o.failures) as f64).collect();
    let yp: Vec<f64> = obs.iter().zip(&m).map(|(o, &mi)| o.successes as f64 / mi).collect();

    let mut mu: Vec<f64> = yp.iter().zip(&m).map(|(&y, &mi)| (mi * y + 0.5) / (mi + 1.0)).collect();
    let mut eta: Vec<f64> = mu.iter().map(|&p| (p / (1.0 - p)).ln()).collect();
    let mut dev_old = binomial_deviance(&obs, &mu);

    let mut b1 = 0.0;
    let mut var_b1 = f64::NAN;
    let mut converged = false;
    let mut iterations = 0;
    for iter in 1..=GLM_MAX_ITER {
        iterations = iter;
        let (mut s0, mut s1, mut s2, mut t0, mut t1) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for i in 0..obs.len() {
            let v = mu[i] * (1.0 - mu[i]);
            let w = m[i] * v;
            let zr = eta[i] + (yp[i] - mu[i]) / v;
            s0 += w;
            s1 += w * z[i];
            s2 += w * z[i] * z[i];
            t0 += w * zr;
            t1 += w * z[i] * zr;
        }
        let det = s0 * s2 - s1 * s1;
        // NaN-safe: also rejects a NaN determinant.
        if !(det > 1e-12 * s0 * s2) {
            return Err(FitError::Singular);
        }
        let b0 = (s2 * t0 - s1 * t1) / det;
        b1 = (s0 * t1 - s1 * t0) / det;
        var_b1 = s0 / det;

        for i in 0..obs.len() {
            eta[i] = b0 + b1 * z[i];
            mu[i] = logistic(eta[i]);
        }
        let dev = binomial_deviance(&obs, &mu);
        if !dev.is_finite() {
            return Err(FitError::NonFinite);
        }
        if (dev - dev_old).abs() / (dev.abs() + 0.1) < GLM_EPSILON {
            converged = true;
            break;
        }
        dev_old = dev;
    }
    if !converged {
        return Err(FitError::NoConvergence { iterations });
    }

    let se_std = var_b1.sqrt();
    let estimate = b1 / sd;
    let std_error = se_std / sd;
    if !estimate.is_finite() || !std_error.is_finite() {
        return Err(FitError::NonFinite);
    }
    let statistic = b1 / se_std;
    Ok(Fit {
        estimate,
        std_error: Some(std_error),
        statistic: Some(statistic),
        p_value: Some(normal_two_sided_p(statistic)),
        n_points: obs.len(),
        iterations,
    })
}

/// Ordinary least squares `y = a + b * x`. With exactly two points the slope is exact and
/// no standard error exists; with a perfect fit the test statistic is undefined.
pub fn fit_linear(points: &[(f64, f64)]) -> Result<Fit, FitError> {
    let distinct = distinct_count(points.iter().map(|p| p.0));
    if distinct < 2 {
        return Err(FitError::InsufficientPoints { distinct });
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxx, mut sxy) = (0.0, 0.0);
    for &(x, y) in points {
        sxx += (x - mx) * (x - mx);
        sxy += (x - mx) * (y - my);
    }
    if !(sxx > 0.0) {
        return Err(FitError::Singular);
    }
    let b = sxy / sxx;
    if !b.is_finite() {
        return Err(FitError::NonFinite);
    }

    let df = points.len().saturating_sub(2);
    let (std_error, statistic, p_value) = if df == 0 {
        (None, None, None)
    } else {
        let rss: f64 = points.iter().map(|&(x, y)| (y - my - b * (x - mx)).powi(2)).sum();
        let se = (rss / df as f64 / sxx).sqrt();
        if se > 0.0 && se.is_finite() {
            let t = b / se;
            (Some(se), Some(t), Some(student_t_two_sided_p(t, df as f64)))
        } else {
            (Some(se), None, None)
        }
    };

    Ok(Fit { estimate: b, std_error, statistic, p_value, n_points: points.len(), iterations: 1 })
}
