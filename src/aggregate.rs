//! Streaming aggregation of per-record token sets.
//! Implement `Aggregator` for your aggregation state and hand it to `Ingestor::run`.

use crate::ingest::Submission;
use crate::lexicon::Lexicon;
use crate::tokenize::TokenSet;
use ahash::AHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Receives every kept record once, with its deduplicated token set.
pub trait Aggregator {
    fn ingest(&mut self, record: &Submission, tokens: &TokenSet);
}

/// Floor `ts` to the start of its fixed-width bucket.
#[inline]
pub fn floor_bucket(ts: i64, width_secs: i64) -> i64 {
    let w = width_secs.max(1);
    ts.div_euclid(w) * w
}

/// One (bucket, key) cell with its normalizers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketedCount {
    pub bucket: i64,
    pub key: String,
    pub count: u64,
    pub bucket_total: u64,
    pub key_total: u64,
}

impl BucketedCount {
    #[inline]
    pub fn share(&self) -> f64 {
        if self.bucket_total == 0 { 0.0 } else { self.count as f64 / self.bucket_total as f64 }
    }
}

/// A plotted series: (bucket, value) points for one group key.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesLine {
    pub key: String,
    pub points: Vec<(i64, f64)>,
}

/// Bucketed counts sorted by (key, bucket). Only keys with `key_total > min_total` remain.
#[derive(Clone, Debug, Default)]
pub struct BucketedTable {
    pub bucket_secs: i64,
    pub rows: Vec<BucketedCount>,
}

impl BucketedTable {
    /// Rows grouped by key, in key order.
    pub fn groups(&self) -> Vec<(&str, &[BucketedCount])> {
        let mut out = Vec::new();
        let mut start = 0;
        for i in 1..=self.rows.len() {
            if i == self.rows.len() || self.rows[i].key != self.rows[start].key {
                out.push((self.rows[start].key.as_str(), &self.rows[start..i]));
                start = i;
            }
        }
        out
    }

    /// Join `keys` back to the table: one share series per key, in the order given.
    pub fn series_for(&self, keys: &[&str]) -> Vec<SeriesLine> {
        let groups: BTreeMap<&str, &[BucketedCount]> = self.groups().into_iter().collect();
        keys.iter()
            .filter_map(|k| groups.get(k).map(|rows| SeriesLine {
                key: k.to_string(),
                points: rows.iter().map(|r| (r.bucket, r.share())).collect(),
            }))
            .collect()
    }
}

// ----------------------------- Word trends ------------------------------------

/// Counts per (bucket, token) plus per-bucket totals over all tokens.
#[derive(Clone, Debug)]
pub struct WordTrendAgg {
    bucket_secs: i64,
    counts: AHashMap<String, BTreeMap<i64, u64>>,
    bucket_totals: BTreeMap<i64, u64>,
}

impl WordTrendAgg {
    pub fn new(bucket_secs: i64) -> Self {
        Self { bucket_secs: bucket_secs.max(1), counts: AHashMap::new(), bucket_totals: BTreeMap::new() }
    }

    pub fn bucket_totals(&self) -> &BTreeMap<i64, u64> {
        &self.bucket_totals
    }

    pub fn distinct_tokens(&self) -> usize {
        self.counts.len()
    }

    /// Materialize the table, keeping tokens whose total is strictly above `min_total`.
    /// Bucket totals always cover every token, including filtered ones.
    pub fn finish(self, min_total: u64) -> BucketedTable {
        let Self { bucket_secs, counts, bucket_totals } = self;
        let mut keys: Vec<(String, BTreeMap<i64, u64>)> = counts.into_iter().collect();
        keys.sort_by(|a, b| a.0.cmp(&b.0));

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for (key, series) in keys {
            let key_total: u64 = series.values().sum();
            if key_total <= min_total {
                dropped += 1;
                continue;
            }
            for (bucket, count) in series {
                rows.push(BucketedCount {
                    bucket,
                    key: key.clone(),
                    count,
                    bucket_total: bucket_totals.get(&bucket).copied().unwrap_or(0),
                    key_total,
                });
            }
        }
        tracing::debug!("Word table: {} rows, {} tokens at or below threshold {}", rows.len(), dropped, min_total);
        BucketedTable { bucket_secs, rows }
    }
}

impl Aggregator for WordTrendAgg {
    fn ingest(&mut self, record: &Submission, tokens: &TokenSet) {
        if tokens.is_empty() { return; }
        let bucket = floor_bucket(record.created_utc, self.bucket_secs);
        for tok in tokens {
            if let Some(series) = self.counts.get_mut(tok.as_str()) {
                *series.entry(bucket).or_insert(0) += 1;
            } else {
                self.counts.entry(tok.clone()).or_default().insert(bucket, 1);
            }
        }
        *self.bucket_totals.entry(bucket).or_insert(0) += tokens.len() as u64;
    }
}

// ----------------------------- Sentiment over time ----------------------------

#[derive(Clone, Copy, Debug, Default)]
struct SentimentCell {
    total: u64,   // all tokens
    matched: u64, // tokens found in the lexicon
    score: i64,   // Σ lexicon score over matched tokens
}

/// One (subreddit, bucket) point with at least one lexicon match.
#[derive(Clone, Debug, PartialEq)]
pub struct SentimentPoint {
    pub subreddit: String,
    pub bucket: i64,
    pub score: i64,
    pub matched: u64,
    pub bucket_total: u64,
    pub subreddit_total: u64,
}

impl SentimentPoint {
    /// Average sentiment per posted token in the bucket.
    #[inline]
    pub fn value(&self) -> f64 {
        if self.bucket_total == 0 { 0.0 } else { self.score as f64 / self.bucket_total as f64 }
    }
}

/// Sentiment points sorted by (subreddit, bucket).
#[derive(Clone, Debug, Default)]
pub struct SentimentTable {
    pub bucket_secs: i64,
    pub rows: Vec<SentimentPoint>,
}

impl SentimentTable {
    pub fn groups(&self) -> Vec<(&str, &[SentimentPoint])> {
        let mut out = Vec::new();
        let mut start = 0;
        for i in 1..=self.rows.len() {
            if i == self.rows.len() || self.rows[i].subreddit != self.rows[start].subreddit {
                out.push((self.rows[start].subreddit.as_str(), &self.rows[start..i]));
                start = i;
            }
        }
        out
    }

    pub fn series_for(&self, keys: &[&str]) -> Vec<SeriesLine> {
        let groups: BTreeMap<&str, &[SentimentPoint]> = self.groups().into_iter().collect();
        keys.iter()
            .filter_map(|k| groups.get(k).map(|rows| SeriesLine {
                key: k.to_string(),
                points: rows.iter().map(|r| (r.bucket, r.value())).collect(),
            }))
            .collect()
    }
}

/// Per (subreddit, bucket) token totals joined incrementally against the lexicon.
#[derive(Clone, Debug)]
pub struct SentimentTrendAgg {
    bucket_secs: i64,
    lexicon: Arc<Lexicon>,
    cells: AHashMap<String, BTreeMap<i64, SentimentCell>>,
}

impl SentimentTrendAgg {
    pub fn new(bucket_secs: i64, lexicon: Arc<Lexicon>) -> Self {
        Self { bucket_secs: bucket_secs.max(1), lexicon, cells: AHashMap::new() }
    }

    /// Keep subreddits whose total token count is strictly above `min_total`.
    /// Buckets without any lexicon match produce no point.
    pub fn finish(self, min_total: u64) -> SentimentTable {
        let Self { bucket_secs, cells, .. } = self;
        let mut subs: Vec<(String, BTreeMap<i64, SentimentCell>)> = cells.into_iter().collect();
        subs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut rows = Vec::new();
        for (subreddit, buckets) in subs {
            let subreddit_total: u64 = buckets.values().map(|c| c.total).sum();
            if subreddit_total <= min_total { continue; }
            for (bucket, cell) in buckets {
                if cell.matched == 0 { continue; }
                rows.push(SentimentPoint {
                    subreddit: subreddit.clone(),
                    bucket,
                    score: cell.score,
                    matched: cell.matched,
                    bucket_total: cell.total,
                    subreddit_total,
                });
            }
        }
        SentimentTable { bucket_secs, rows }
    }
}

impl Aggregator for SentimentTrendAgg {
    fn ingest(&mut self, record: &Submission, tokens: &TokenSet) {
        let Some(sub) = record.subreddit.as_deref() else { return };
        if tokens.is_empty() { return; }
        let bucket = floor_bucket(record.created_utc, self.bucket_secs);
        let cell = self.cells.entry(sub.to_string()).or_default().entry(bucket).or_default();
        cell.total += tokens.len() as u64;
        for tok in tokens {
            if let Some(s) = self.lexicon.score(tok) {
                cell.matched += 1;
                cell.score += i64::from(s);
            }
        }
    }
}

// ----------------------------- Static summary ---------------------------------

#[derive(Clone, Copy, Debug, Default)]
struct SummaryCell {
    weighted: i64, // Σ score × count
    matched: u64,  // Σ count over matched tokens
    total: u64,    // all tokens
}

impl SummaryCell {
    #[inline]
    fn tally(&mut self, score: Option<i32>, count: u64) {
        self.total += count;
        if let Some(s) = score {
            self.matched += count;
            self.weighted += i64::from(s) * count as i64;
        }
    }
}

/// Activity-weighted average sentiment of one subreddit.
#[derive(Clone, Debug, PartialEq)]
pub struct SubredditSentiment {
    pub subreddit: String,
    pub score: f64,
    pub matched: u64,
    pub total_tokens: u64,
}

/// Time-independent per-subreddit sentiment: Σ(score × count) / Σ(count) over matched tokens.
#[derive(Clone, Debug)]
pub struct SubredditSummaryAgg {
    lexicon: Arc<Lexicon>,
    cells: AHashMap<String, SummaryCell>,
}

impl SubredditSummaryAgg {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon, cells: AHashMap::new() }
    }

    /// Feed an already-counted (subreddit, token, count) triple.
    pub fn add_count(&mut self, subreddit: &str, token: &str, count: u64) {
        let score = self.lexicon.score(token);
        self.cells.entry(subreddit.to_string()).or_default().tally(score, count);
    }

    /// Subreddits with at least one matched token and `total_tokens > min_activity`, by name.
    pub fn finish(self, min_activity: u64) -> Vec<SubredditSentiment> {
        let mut out: Vec<SubredditSentiment> = self
            .cells
            .into_iter()
            .filter(|(_, c)| c.matched > 0 && c.total > min_activity)
            .map(|(subreddit, c)| SubredditSentiment {
                subreddit,
                score: c.weighted as f64 / c.matched as f64,
                matched: c.matched,
                total_tokens: c.total,
            })
            .collect();
        out.sort_by(|a, b| a.subreddit.cmp(&b.subreddit));
        out
    }
}

impl Aggregator for SubredditSummaryAgg {
    fn ingest(&mut self, record: &Submission, tokens: &TokenSet) {
        let Some(sub) = record.subreddit.as_deref() else { return };
        if tokens.is_empty() { return; }
        let cell = self.cells.entry(sub.to_string()).or_default();
        for tok in tokens {
            cell.tally(self.lexicon.score(tok), 1);
        }
    }
}
