//! Ingestion & windowing: stream inputs, keep records after the cutoff, collapse repeated
//! (record id, token) pairs, and hand each record's token set to the aggregators.

use crate::aggregate::Aggregator;
use crate::config::TrendOptions;
use crate::jsonl::{for_each_line_with_progress_cfg, parse_minimal, MinimalRecord};
use crate::paths::{plan_inputs, InputJob};
use crate::progress::{ingest_progress_bar, total_input_size};
use crate::tokenize::Tokenizer;
use ahash::{AHashSet, RandomState};
use anyhow::{Context, Result};
use std::hash::{BuildHasher, Hash, Hasher};

/// Malformed lines are logged individually up to this many per run; the rest are only counted.
const MAX_MALFORMED_WARNINGS: u64 = 20;

/// One submission after field dropping and timestamp parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub id: Option<String>, // url, else id
    pub created_utc: i64,
    pub subreddit: Option<String>,
    pub title: String,
    pub selftext: Option<String>,
}

impl Submission {
    /// `None` when the line carries no usable timestamp.
    pub fn from_minimal(min: MinimalRecord) -> Option<Self> {
        let created_utc = min.created_utc?;
        let id = min.url.filter(|s| !s.is_empty()).or(min.id.filter(|s| !s.is_empty()));
        Some(Self {
            id,
            created_utc,
            subreddit: min.subreddit.filter(|s| !s.is_empty()),
            title: min.title.unwrap_or_default(),
            selftext: min.selftext,
        })
    }

    /// Text fields in tokenization order.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str()).chain(self.selftext.as_deref())
    }
}

/// Time window gate: `created_utc > after` and, if set, `created_utc <= until`.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    pub after: i64,
    pub until: Option<i64>,
}

impl Window {
    #[inline]
    pub fn contains(&self, ts: i64) -> bool {
        ts > self.after && self.until.map_or(true, |u| ts <= u)
    }
}

/// Counters reported after ingestion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files: usize,
    pub lines: u64,
    pub malformed: u64,
    pub outside_window: u64,
    pub duplicates: u64,       // records whose every token was already counted for their id
    pub duplicate_tokens: u64, // (id, token) pairs dropped because an earlier record counted them
    pub kept: u64,
}

/// Seen-set of (record id, token) pairs, stored as seeded 64-bit hashes to bound memory.
struct SeenPairs {
    state: RandomState,
    seen: AHashSet<u64>,
}

impl SeenPairs {
    fn new() -> Self {
        // Fixed seeds so duplicate detection is identical across runs.
        let state = RandomState::with_seeds(
            0x5b7e_1d2c_0a9f_3e41,
            0x2c4f_8a1b_d3e6_7f90,
            0x91a3_c5e7_0b2d_4f68,
            0x7d1f_3b5a_9c8e_2046,
        );
        Self { state, seen: AHashSet::new() }
    }

    /// True the first time the pair (`id`, `token`) is offered.
    fn first_time(&mut self, id: &str, token: &str) -> bool {
        let mut h = self.state.build_hasher();
        (id, token).hash(&mut h);
        self.seen.insert(h.finish())
    }
}

/// Streams every configured input once and feeds kept records to `aggs`.
pub struct Ingestor<'a> {
    opts: &'a TrendOptions,
    tokenizer: Tokenizer,
}

impl<'a> Ingestor<'a> {
    pub fn new(opts: &'a TrendOptions) -> Self {
        Self { opts, tokenizer: Tokenizer::new(&opts.stop_words) }
    }

    pub fn run(&self, aggs: &mut [&mut dyn Aggregator]) -> Result<IngestStats> {
        let jobs = plan_inputs(&self.opts.inputs)?;
        tracing::info!("Planned {} input files for ingestion.", jobs.len());

        let window = Window { after: self.opts.cutoff, until: self.opts.until };
        let pb = if self.opts.progress {
            Some(ingest_progress_bar(total_input_size(&jobs), "ingest"))
        } else {
            None
        };

        let mut stats = IngestStats { files: jobs.len(), ..Default::default() };
        let mut seen = SeenPairs::new();
        for job in &jobs {
            self.ingest_file(job, window, &mut seen, &mut stats, aggs, pb.as_ref())
                .with_context(|| format!("processing {}", job.path.display()))?;
        }

        if let Some(pb) = pb { pb.finish_with_message("Ingest done"); }
        if stats.malformed > 0 {
            tracing::warn!("Skipped {} malformed lines out of {}", stats.malformed, stats.lines);
        }
        tracing::info!(
            "Ingested {} records ({} outside window, {} duplicates, {} repeated tokens) from {} lines",
            stats.kept, stats.outside_window, stats.duplicates, stats.duplicate_tokens, stats.lines
        );
        Ok(stats)
    }

    fn ingest_file(
        &self,
        job: &InputJob,
        window: Window,
        seen: &mut SeenPairs,
        stats: &mut IngestStats,
        aggs: &mut [&mut dyn Aggregator],
        pb: Option<&indicatif::ProgressBar>,
    ) -> Result<()> {
        for_each_line_with_progress_cfg(
            job,
            self.opts.read_buffer_bytes,
            |delta| { if let Some(pb) = pb { pb.inc(delta); } },
            |line_no, line| {
                if line.trim().is_empty() { return Ok(()); }
                stats.lines += 1;

                let parsed = parse_minimal(line).map(Submission::from_minimal);
                let sub = match parsed {
                    Ok(Some(sub)) => sub,
                    Ok(None) => {
                        note_malformed(stats, job, line_no, "missing or non-numeric created_utc");
                        return Ok(());
                    }
                    Err(e) => {
                        note_malformed(stats, job, line_no, &e.to_string());
                        return Ok(());
                    }
                };

                if !window.contains(sub.created_utc) {
                    stats.outside_window += 1;
                    return Ok(());
                }
                let mut tokens = self.tokenizer.token_set(sub.text_fields());
                if let Some(id) = sub.id.as_deref() {
                    // A repeated id only contributes tokens not yet counted for it.
                    let before = tokens.len();
                    tokens.retain(|tok| seen.first_time(id, tok));
                    let dropped = (before - tokens.len()) as u64;
                    stats.duplicate_tokens += dropped;
                    if dropped > 0 && tokens.is_empty() {
                        stats.duplicates += 1;
                        return Ok(());
                    }
                }

                for agg in aggs.iter_mut() {
                    agg.ingest(&sub, &tokens);
                }
                stats.kept += 1;
                Ok(())
            },
        )
    }
}

fn note_malformed(stats: &mut IngestStats, job: &InputJob, line_no: u64, why: &str) {
    stats.malformed += 1;
    if stats.malformed <= MAX_MALFORMED_WARNINGS {
        tracing::warn!("Skipping malformed line {}:{}: {}", job.path.display(), line_no, why);
    } else if stats.malformed == MAX_MALFORMED_WARNINGS + 1 {
        tracing::warn!("Further malformed lines will only be counted");
    }
}
