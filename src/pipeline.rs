use crate::aggregate::{
    Aggregator, BucketedTable, SentimentTable, SentimentTrendAgg, SeriesLine, SubredditSentiment, SubredditSummaryAgg,
    WordTrendAgg,
};
use crate::config::TrendOptions;
use crate::ingest::{IngestStats, Ingestor};
use crate::lexicon::Lexicon;
use crate::rank::{rank_extremes, Extremes};
use crate::render::{render_trend_chart, ChartSpec};
use crate::report::{write_series_tsv, write_skipped_tsv, write_slopes_tsv, write_summary_tsv};
use crate::trend::{fit_sentiment_trends, fit_word_trends, TrendFits};
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset};

/// Builder over `TrendOptions` that runs the whole report.
#[derive(Clone, Debug, Default)]
pub struct TrendReport {
    pub(crate) opts: TrendOptions,
}

/// Aggregated tables after a single pass over the inputs.
#[derive(Clone, Debug)]
pub struct Aggregates {
    pub stats: IngestStats,
    pub words: BucketedTable,
    pub sentiment: SentimentTable,
    pub summary: Vec<SubredditSentiment>,
}

/// Everything the report computed, plus the files it wrote.
#[derive(Clone, Debug)]
pub struct ReportOutputs {
    pub stats: IngestStats,
    pub word_fits: TrendFits,
    pub word_extremes: Extremes,
    pub sentiment_fits: TrendFits,
    pub sentiment_extremes: Extremes,
    pub summary: Vec<SubredditSentiment>,
    pub files: Vec<PathBuf>,
}

/// Which trend family a section of the report covers.
struct Section<'a> {
    prefix: &'a str,
    key_header: &'a str,
    value_header: &'a str,
    title: &'a str,
}

const WORD_SECTION: Section<'static> = Section {
    prefix: "word_trend",
    key_header: "word",
    value_header: "share",
    title: "words",
};

const SENTIMENT_SECTION: Section<'static> = Section {
    prefix: "sentiment_trend",
    key_header: "subreddit",
    value_header: "score_per_token",
    title: "subreddit sentiment",
};

impl TrendReport {
    pub fn new() -> Self {
        Self { opts: TrendOptions::default() }
    }

    pub fn from_options(opts: TrendOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn inputs<I, P>(mut self, inputs: I) -> Self where I: IntoIterator<Item = P>, P: AsRef<Path> { self.opts = self.opts.with_inputs(inputs); self }
    pub fn lexicon(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_lexicon(path); self }
    pub fn out_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_out_dir(dir); self }
    pub fn cutoff(mut self, cutoff: OffsetDateTime) -> Self { self.opts = self.opts.with_cutoff(cutoff); self }
    pub fn cutoff_epoch(mut self, secs: i64) -> Self { self.opts = self.opts.with_cutoff_epoch(secs); self }
    pub fn until_epoch(mut self, secs: Option<i64>) -> Self { self.opts = self.opts.with_until_epoch(secs); self }
    pub fn stop_words<I, S>(mut self, words: I) -> Self where I: IntoIterator<Item = S>, S: AsRef<str> { self.opts = self.opts.with_stop_words(words); self }
    pub fn bucket_widths(mut self, word_secs: i64, sentiment_secs: i64) -> Self { self.opts = self.opts.with_bucket_widths(word_secs, sentiment_secs); self }
    pub fn min_token_total(mut self, n: u64) -> Self { self.opts = self.opts.with_min_token_total(n); self }
    pub fn min_subreddit_total(mut self, n: u64) -> Self { self.opts = self.opts.with_min_subreddit_total(n); self }
    pub fn summary_min_activity(mut self, n: u64) -> Self { self.opts = self.opts.with_summary_min_activity(n); self }
    pub fn top_n(mut self, n: usize) -> Self { self.opts = self.opts.with_top_n(n); self }
    pub fn display_offset(mut self, offset: UtcOffset) -> Self { self.opts = self.opts.with_display_offset(offset); self }
    pub fn chart_size(mut self, width: u32, height: u32) -> Self { self.opts = self.opts.with_chart_size(width, height); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }

    /// Ingest all inputs once and build the three aggregated tables.
    pub fn aggregate(&self) -> Result<Aggregates> {
        init_tracing_once();
        let lexicon = Arc::new(Lexicon::load(&self.opts.lexicon_path)?);

        let mut words = WordTrendAgg::new(self.opts.word_bucket_secs);
        let mut sentiment = SentimentTrendAgg::new(self.opts.sentiment_bucket_secs, lexicon.clone());
        let mut summary = SubredditSummaryAgg::new(lexicon);

        let mut aggs: [&mut dyn Aggregator; 3] = [&mut words, &mut sentiment, &mut summary];
        let stats = Ingestor::new(&self.opts).run(&mut aggs)?;
        tracing::info!("Distinct tokens: {}", words.distinct_tokens());

        Ok(Aggregates {
            stats,
            words: words.finish(self.opts.min_token_total),
            sentiment: sentiment.finish(self.opts.min_subreddit_total),
            summary: summary.finish(self.opts.summary_min_activity),
        })
    }

    /// Run the full report and write every table and chart into `out_dir`.
    pub fn run(self) -> Result<ReportOutputs> {
        let agg = self.aggregate()?;
        let out_dir = self.opts.out_dir.clone();
        fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;
        let mut files = Vec::new();

        let word_fits = fit_word_trends(&agg.words);
        let word_extremes = rank_extremes(&word_fits.slopes, self.opts.top_n);
        let word_lines = [
            agg.words.series_for(&word_extremes.rising_keys()),
            agg.words.series_for(&word_extremes.falling_keys()),
        ];
        self.write_section(&out_dir, &WORD_SECTION, &word_fits, &word_extremes, word_lines, &mut files)?;

        let sentiment_fits = fit_sentiment_trends(&agg.sentiment);
        let sentiment_extremes = rank_extremes(&sentiment_fits.slopes, self.opts.top_n);
        let sentiment_lines = [
            agg.sentiment.series_for(&sentiment_extremes.rising_keys()),
            agg.sentiment.series_for(&sentiment_extremes.falling_keys()),
        ];
        self.write_section(&out_dir, &SENTIMENT_SECTION, &sentiment_fits, &sentiment_extremes, sentiment_lines, &mut files)?;

        let summary_path = out_dir.join("subreddit_sentiment_summary.tsv");
        write_summary_tsv(&summary_path, &agg.summary)?;
        files.push(summary_path);
        tracing::info!("Wrote {} report files to {}", files.len(), out_dir.display());

        Ok(ReportOutputs {
            stats: agg.stats,
            word_fits,
            word_extremes,
            sentiment_fits,
            sentiment_extremes,
            summary: agg.summary,
            files,
        })
    }

    fn write_section(
        &self,
        out_dir: &Path,
        section: &Section<'_>,
        fits: &TrendFits,
        extremes: &Extremes,
        [rising_lines, falling_lines]: [Vec<SeriesLine>; 2],
        files: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let p = section.prefix;
        let kh = section.key_header;

        let mut emit = |name: String| -> PathBuf {
            let path = out_dir.join(name);
            files.push(path.clone());
            path
        };

        write_slopes_tsv(&emit(format!("{p}_slopes.tsv")), kh, &fits.slopes)?;
        write_skipped_tsv(&emit(format!("{p}_skipped.tsv")), kh, &fits.skipped)?;

        for (direction, picked, lines) in [
            ("rising", &extremes.rising, rising_lines),
            ("falling", &extremes.falling, falling_lines),
        ] {
            write_slopes_tsv(&emit(format!("{p}_{direction}.tsv")), kh, picked)?;
            write_series_tsv(&emit(format!("{p}_{direction}_series.tsv")), kh, section.value_header, &lines, self.opts.display_offset)?;
            let title = format!("Top {} {} {}", picked.len(), direction, section.title);
            let spec = ChartSpec {
                title: &title,
                y_desc: section.value_header,
                offset: self.opts.display_offset,
                size: self.opts.chart_size,
            };
            render_trend_chart(&emit(format!("{p}_{direction}.svg")), &spec, &lines)?;
            for (rank, slope) in picked.iter().enumerate() {
                tracing::debug!("{} {} #{}: {} ({})", p, direction, rank + 1, slope.key, slope.estimate);
            }
        }
        Ok(())
    }
}
