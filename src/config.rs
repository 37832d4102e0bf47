use std::path::{Path, PathBuf};
use time::macros::offset;
use time::{OffsetDateTime, UtcOffset};

/// Width of word-trend buckets (30 minutes).
pub const WORD_BUCKET_SECS: i64 = 30 * 60;
/// Width of sentiment-trend buckets (2 hours).
pub const SENTIMENT_BUCKET_SECS: i64 = 2 * 60 * 60;

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct TrendOptions {
    pub inputs: Vec<PathBuf>,
    pub lexicon_path: PathBuf,
    pub out_dir: PathBuf,

    // window
    pub cutoff: i64,                 // keep created_utc > cutoff (exclusive)
    pub until: Option<i64>,          // inclusive upper bound, if any

    // tokenization
    pub stop_words: Vec<String>,     // normalized lowercase

    // aggregation
    pub word_bucket_secs: i64,
    pub sentiment_bucket_secs: i64,
    pub min_token_total: u64,        // keep token_total > this
    pub min_subreddit_total: u64,    // keep subreddit_total > this
    pub summary_min_activity: u64,   // keep total_tokens > this (static summary)

    // ranking / rendering
    pub top_n: usize,
    pub display_offset: UtcOffset,
    pub chart_size: (u32, u32),

    pub progress: bool,
    pub read_buffer_bytes: usize,
}

impl Default for TrendOptions {
    fn default() -> Self {
        let base = PathBuf::from("./data");
        Self {
            inputs: Vec::new(),
            lexicon_path: base.join("AFINN-111.txt"),
            out_dir: PathBuf::from("./report"),

            cutoff: 0,
            until: None,

            stop_words: vec!["ref".to_string()],

            word_bucket_secs: WORD_BUCKET_SECS,
            sentiment_bucket_secs: SENTIMENT_BUCKET_SECS,
            min_token_total: 500,
            min_subreddit_total: 1000,
            summary_min_activity: 0,

            top_n: 10,
            // US Eastern (standard time); fixed so charts never depend on the host zone.
            display_offset: offset!(-5),
            chart_size: (1280, 720),

            progress: true,
            read_buffer_bytes: 256 * 1024,
        }
    }
}

impl TrendOptions {
    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs = inputs.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
        self
    }
    pub fn with_lexicon(mut self, path: impl AsRef<Path>) -> Self {
        self.lexicon_path = path.as_ref().to_path_buf();
        self
    }
    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_cutoff(mut self, cutoff: OffsetDateTime) -> Self {
        self.cutoff = cutoff.unix_timestamp();
        self
    }
    pub fn with_cutoff_epoch(mut self, secs: i64) -> Self {
        self.cutoff = secs;
        self
    }
    pub fn with_until_epoch(mut self, secs: Option<i64>) -> Self {
        self.until = secs;
        self
    }
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut v: Vec<String> = words.into_iter().map(|s| s.as_ref().trim().to_lowercase()).collect();
        v.sort();
        v.dedup();
        self.stop_words = v;
        self
    }
    pub fn with_bucket_widths(mut self, word_secs: i64, sentiment_secs: i64) -> Self {
        self.word_bucket_secs = word_secs.max(1);
        self.sentiment_bucket_secs = sentiment_secs.max(1);
        self
    }
    pub fn with_min_token_total(mut self, n: u64) -> Self {
        self.min_token_total = n;
        self
    }
    pub fn with_min_subreddit_total(mut self, n: u64) -> Self {
        self.min_subreddit_total = n;
        self
    }
    pub fn with_summary_min_activity(mut self, n: u64) -> Self {
        self.summary_min_activity = n;
        self
    }
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n.max(1);
        self
    }
    pub fn with_display_offset(mut self, offset: UtcOffset) -> Self {
        self.display_offset = offset;
        self
    }
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width.max(200), height.max(150));
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}
