//! Per-group trend fitting over bucketed tables. Groups are fitted independently in
//! parallel; results come back in group-key order so output is reproducible.

use crate::aggregate::{BucketedTable, SentimentTable};
use crate::model::{fit_binomial, fit_linear, BinomialObs, Fit, FitError};
use rayon::prelude::*;

/// Fitted time coefficient for one group key.
#[derive(Debug, Clone, PartialEq)]
pub struct Slope {
    pub key: String,
    pub estimate: f64,
    pub std_error: Option<f64>,
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub n_points: usize,
}

impl Slope {
    fn from_fit(key: &str, fit: Fit) -> Self {
        Self {
            key: key.to_string(),
            estimate: fit.estimate,
            std_error: fit.std_error,
            statistic: fit.statistic,
            p_value: fit.p_value,
            n_points: fit.n_points,
        }
    }
}

/// A group that was not fitted, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGroup {
    pub key: String,
    pub reason: FitError,
}

/// One slope per fitted group plus the groups that were skipped, both sorted by key.
#[derive(Debug, Clone, Default)]
pub struct TrendFits {
    pub slopes: Vec<Slope>,
    pub skipped: Vec<SkippedGroup>,
}

fn collect_fits(label: &str, results: Vec<(String, Result<Fit, FitError>)>) -> TrendFits {
    let mut out = TrendFits::default();
    for (key, res) in results {
        match res {
            Ok(fit) => out.slopes.push(Slope::from_fit(&key, fit)),
            Err(reason) => {
                tracing::debug!("{}: skipping group {:?}: {}", label, key, reason);
                out.skipped.push(SkippedGroup { key, reason });
            }
        }
    }
    if !out.skipped.is_empty() {
        tracing::warn!("{}: skipped {} of {} groups", label, out.skipped.len(), out.skipped.len() + out.slopes.len());
    }
    tracing::info!("{}: fitted {} groups", label, out.slopes.len());
    out
}

/// Binomial model per token: `cbind(count, bucket_total) ~ time`.
pub fn fit_word_trends(table: &BucketedTable) -> TrendFits {
    let groups = table.groups();
    let results: Vec<(String, Result<Fit, FitError>)> = groups
        .par_iter()
        .map(|(key, rows)| {
            let obs: Vec<BinomialObs> = rows
                .iter()
                .map(|r| BinomialObs { x: r.bucket as f64, successes: r.count, failures: r.bucket_total })
                .collect();
            (key.to_string(), fit_binomial(&obs))
        })
        .collect();
    collect_fits("Word trends", results)
}

/// Linear model per subreddit: `score / bucket_total ~ time`.
pub fn fit_sentiment_trends(table: &SentimentTable) -> TrendFits {
    let groups = table.groups();
    let results: Vec<(String, Result<Fit, FitError>)> = groups
        .par_iter()
        .map(|(key, rows)| {
            let pts: Vec<(f64, f64)> = rows.iter().map(|r| (r.bucket as f64, r.value())).collect();
            (key.to_string(), fit_linear(&pts))
        })
        .collect();
    collect_fits("Sentiment trends", results)
}
