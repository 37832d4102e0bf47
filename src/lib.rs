mod config;
mod date;
mod paths;
mod jsonl;
mod progress;
mod util;

mod tokenize;
mod lexicon;
mod ingest;
mod aggregate;

mod dist;
mod model;
mod trend;
mod rank;

mod render;
mod report;
mod pipeline;

pub use crate::config::{TrendOptions, SENTIMENT_BUCKET_SECS, WORD_BUCKET_SECS};
pub use crate::pipeline::{Aggregates, ReportOutputs, TrendReport};

// Ingestion & tokenization
pub use crate::ingest::{IngestStats, Ingestor, Submission, Window};
pub use crate::paths::{discover_inputs, plan_inputs, InputJob, InputKind};
pub use crate::tokenize::{TokenSet, Tokenizer};
pub use crate::lexicon::Lexicon;

// Aggregation
pub use crate::aggregate::{
    floor_bucket, Aggregator, BucketedCount, BucketedTable, SentimentPoint, SentimentTable, SentimentTrendAgg,
    SeriesLine, SubredditSentiment, SubredditSummaryAgg, WordTrendAgg,
};

// Modeling & ranking
pub use crate::dist::{incomplete_beta, normal_two_sided_p, student_t_two_sided_p};
pub use crate::model::{fit_binomial, fit_linear, BinomialObs, Fit, FitError};
pub use crate::trend::{fit_sentiment_trends, fit_word_trends, SkippedGroup, Slope, TrendFits};
pub use crate::rank::{rank_extremes, Extremes};

// Rendering & export
pub use crate::render::{render_trend_chart, ChartSpec};
pub use crate::report::{write_series_tsv, write_skipped_tsv, write_slopes_tsv, write_summary_tsv};
pub use crate::date::{fmt_axis_label, fmt_rfc3339};
pub use crate::util::init_tracing_once;
