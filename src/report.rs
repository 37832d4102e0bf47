//! Tab-separated exports of ranked slopes, selected series, and the sentiment summary.
//! Floats print in shortest round-trip form; missing values print as `NA`.

use crate::aggregate::{SeriesLine, SubredditSentiment};
use crate::date::fmt_rfc3339;
use crate::trend::{Slope, SkippedGroup};
use crate::util::write_atomic;
use anyhow::Result;
use std::path::Path;
use time::UtcOffset;

const NA: &str = "NA";

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => x.to_string(),
        _ => NA.to_string(),
    }
}

fn tsv_writer<W: std::io::Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(w)
}

/// `key  estimate  std_error  statistic  p_value  n_points`, one row per slope, in the given order.
pub fn write_slopes_tsv(path: &Path, key_header: &str, slopes: &[Slope]) -> Result<()> {
    write_atomic(path, |w| {
        let mut tsv = tsv_writer(w);
        tsv.write_record([key_header, "estimate", "std_error", "statistic", "p_value", "n_points"])?;
        for s in slopes {
            tsv.write_record([
                s.key.clone(),
                s.estimate.to_string(),
                fmt_opt(s.std_error),
                fmt_opt(s.statistic),
                fmt_opt(s.p_value),
                s.n_points.to_string(),
            ])?;
        }
        tsv.flush()?;
        Ok(())
    })
}

/// `key  reason` for every group that was not fitted.
pub fn write_skipped_tsv(path: &Path, key_header: &str, skipped: &[SkippedGroup]) -> Result<()> {
    write_atomic(path, |w| {
        let mut tsv = tsv_writer(w);
        tsv.write_record([key_header, "reason"])?;
        for s in skipped {
            tsv.write_record([s.key.clone(), s.reason.to_string()])?;
        }
        tsv.flush()?;
        Ok(())
    })
}

/// `key  bucket  value` for the plotted series, bucket shown in the display offset.
pub fn write_series_tsv(path: &Path, key_header: &str, value_header: &str, lines: &[SeriesLine], offset: UtcOffset) -> Result<()> {
    write_atomic(path, |w| {
        let mut tsv = tsv_writer(w);
        tsv.write_record([key_header, "bucket", value_header])?;
        for line in lines {
            for (bucket, value) in &line.points {
                tsv.write_record([line.key.clone(), fmt_rfc3339(*bucket, offset), value.to_string()])?;
            }
        }
        tsv.flush()?;
        Ok(())
    })
}

/// `subreddit  score  matched_tokens  total_tokens`.
pub fn write_summary_tsv(path: &Path, rows: &[SubredditSentiment]) -> Result<()> {
    write_atomic(path, |w| {
        let mut tsv = tsv_writer(w);
        tsv.write_record(["subreddit", "score", "matched_tokens", "total_tokens"])?;
        for r in rows {
            tsv.write_record([r.subreddit.clone(), r.score.to_string(), r.matched.to_string(), r.total_tokens.to_string()])?;
        }
        tsv.flush()?;
        Ok(())
    })
}
