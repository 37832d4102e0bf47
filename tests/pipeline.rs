#[path = "common/mod.rs"]
mod common;

use common::*;
use std::fs;
use std::path::Path;
use subtrends::{FitError, TrendOptions, TrendReport};

fn report(inputs: &[std::path::PathBuf], lex: &Path, out: &Path) -> TrendReport {
    TrendReport::new()
        .inputs(inputs)
        .lexicon(lex)
        .out_dir(out)
        .cutoff_epoch(CUTOFF)
        .bucket_widths(1800, 1800)
        .min_token_total(0)
        .min_subreddit_total(0)
        .top_n(1)
        .chart_size(640, 360)
        .progress(false)
}

/// End to end: the word whose share grows ranks as rising, the shrinking one as falling,
/// and every table and chart lands in the output directory.
#[test]
fn full_report_on_small_corpus() {
    let (base, inputs, lex) = make_corpus();
    let out = base.join("report");
    let res = report(&inputs, &lex, &out).run().unwrap();

    assert_eq!(res.stats.kept, 32);
    assert_eq!(res.stats.duplicates, 1);
    assert_eq!(res.stats.malformed, 1);

    assert_eq!(res.word_extremes.rising_keys(), vec!["rising"]);
    assert_eq!(res.word_extremes.falling_keys(), vec!["falling"]);
    let rising = res.word_fits.slopes.iter().find(|s| s.key == "rising").unwrap();
    assert!(rising.estimate > 0.0);
    assert_eq!(rising.n_points, 4);
    assert!(res.word_fits.slopes.iter().all(|s| s.key != "boundary" && s.key != "ancient"));

    let subs: Vec<&str> = res.sentiment_fits.slopes.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(subs, vec!["news", "sports"]);

    let summary: Vec<(&str, f64)> = res.summary.iter().map(|r| (r.subreddit.as_str(), r.score)).collect();
    assert_eq!(summary, vec![("news", 3.0), ("sports", -3.0)]);

    assert_eq!(res.files.len(), 17);
    for f in &res.files {
        assert!(f.exists(), "missing {}", f.display());
    }
    for name in ["word_trend_rising.svg", "sentiment_trend_falling.svg"] {
        let svg = fs::read_to_string(out.join(name)).unwrap();
        assert!(svg.starts_with("<svg"), "{}", name);
    }

    let rising_rows = read_lines(&out.join("word_trend_rising.tsv"));
    assert_eq!(rising_rows[0], "word\testimate\tstd_error\tstatistic\tp_value\tn_points");
    assert!(rising_rows[1].starts_with("rising\t"));

    let series = read_lines(&out.join("word_trend_rising_series.tsv"));
    assert_eq!(series.len(), 1 + 4);
    // CUTOFF + 60 floors to CUTOFF, shown at the default UTC-5 offset.
    let first: Vec<&str> = series[1].split('\t').collect();
    assert_eq!(&first[..2], &["rising", "2020-12-31T19:00:00-05:00"]);
    // 2 "rising" records out of 42 tokens in the first bucket.
    assert_eq!(first[2].parse::<f64>().unwrap(), 2.0 / 42.0);

    let no_temp_files = fs::read_dir(&out).unwrap().all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".tmp"));
    assert!(no_temp_files);
}

/// Two runs over the same inputs write byte-identical tables.
#[test]
fn reruns_are_identical() {
    let (base, inputs, lex) = make_corpus();
    let out_a = base.join("a");
    let out_b = base.join("b");
    let first = report(&inputs, &lex, &out_a).run().unwrap();
    report(&inputs, &lex, &out_b).run().unwrap();

    for f in first.files.iter().filter(|p| p.extension().map_or(false, |e| e == "tsv")) {
        let name = f.file_name().unwrap();
        assert_eq!(fs::read(out_a.join(name)).unwrap(), fs::read(out_b.join(name)).unwrap(), "{:?}", name);
    }
}

/// A missing input aborts before anything is written.
#[test]
fn missing_input_writes_nothing() {
    let (base, mut inputs, lex) = make_corpus();
    inputs.push(base.join("data").join("RS_missing.ndjson"));
    let out = base.join("never");
    let err = report(&inputs, &lex, &out).run().unwrap_err();
    assert!(format!("{:#}", err).contains("not found"));
    assert!(!out.exists());
}

/// With the default thresholds nothing in a tiny corpus qualifies, but the report still runs.
#[test]
fn empty_after_thresholds() {
    let (base, inputs, lex) = make_corpus();
    let out = base.join("strict");
    let res = TrendReport::new()
        .inputs(&inputs)
        .lexicon(&lex)
        .out_dir(&out)
        .cutoff_epoch(CUTOFF)
        .progress(false)
        .run()
        .unwrap();
    assert!(res.word_fits.slopes.is_empty());
    assert!(res.sentiment_fits.slopes.is_empty());
    assert!(res.word_extremes.rising.is_empty());
    assert_eq!(read_lines(&out.join("word_trend_slopes.tsv")).len(), 1);
    assert_eq!(res.summary.len(), 2);
}

/// Words and subreddits seen in a single bucket cannot be fitted: they land in the
/// skipped tables with the reason, and every other group is still fitted.
#[test]
fn single_bucket_groups_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data").join("RS_small.ndjson");
    write_jsonl_lines(&input, &[
        submission("https://r/news/1", CUTOFF + 10, "news", "steady good once", ""),
        submission("https://r/news/2", CUTOFF + 20, "news", "steady bad", ""),
        submission("https://r/news/3", CUTOFF + 1810, "news", "steady good", ""),
        submission("https://r/news/4", CUTOFF + 1820, "news", "steady great", ""),
        submission("https://r/lonely/1", CUTOFF + 30, "lonely", "steady win", ""),
    ]);
    let lex = dir.path().join("data").join("AFINN-111.txt");
    write_lexicon(&lex);
    let out = dir.path().join("report");

    let opts = TrendOptions::default()
        .with_inputs([&input])
        .with_lexicon(&lex)
        .with_out_dir(&out)
        .with_cutoff_epoch(CUTOFF)
        .with_bucket_widths(1800, 1800)
        .with_min_token_total(0)
        .with_min_subreddit_total(0)
        .with_progress(false);
    let res = TrendReport::from_options(opts).run().unwrap();

    let fitted: Vec<&str> = res.word_fits.slopes.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(fitted, vec!["good", "steady"]);
    let skipped: Vec<&str> = res.word_fits.skipped.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(skipped, vec!["bad", "great", "once", "win"]);
    assert!(res.word_fits.skipped.iter().all(|s| s.reason == FitError::InsufficientPoints { distinct: 1 }));

    let subs: Vec<&str> = res.sentiment_fits.slopes.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(subs, vec!["news"]);
    assert_eq!(res.sentiment_fits.slopes[0].std_error, None);
    assert_eq!(res.sentiment_fits.skipped.len(), 1);
    assert_eq!(res.sentiment_fits.skipped[0].key, "lonely");

    let words = read_lines(&out.join("word_trend_skipped.tsv"));
    assert_eq!(words[0], "word\treason");
    assert!(words.contains(&"once\tneed at least 2 distinct time points, got 1".to_string()));
    assert_eq!(words.len(), 1 + 4);
    let subs = read_lines(&out.join("sentiment_trend_skipped.tsv"));
    assert_eq!(subs, vec!["subreddit\treason", "lonely\tneed at least 2 distinct time points, got 1"]);

    let slopes = read_lines(&out.join("sentiment_trend_slopes.tsv"));
    assert!(slopes[1].starts_with("news\t") && slopes[1].ends_with("\tNA\tNA\tNA\t2"), "{}", slopes[1]);
}
