#![allow(dead_code)]

use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// 2021-01-01T00:00:00Z; all fixtures sit just after this cutoff.
pub const CUTOFF: i64 = 1_609_459_200;

/// Write plain NDJSON lines.
pub fn write_jsonl_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// One submission line in dump layout, including fields the reader must ignore.
pub fn submission(url: &str, ts: i64, subreddit: &str, title: &str, selftext: &str) -> String {
    json!({
        "author": "someone", "created_utc": ts, "domain": "self.test", "id": url.rsplit('/').next().unwrap_or(url),
        "num_comments": 3, "over_18": false, "score": 7, "selftext": selftext, "subreddit": subreddit,
        "title": title, "url": url,
        "preview": {"images": [{"source": {"url": "https://i.example/x.png", "width": 640}}]},
        "all_awardings": []
    })
    .to_string()
}

/// Write a tiny AFINN-style lexicon.
pub fn write_lexicon(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for (w, s) in [("good", 3), ("great", 3), ("bad", -3), ("awful", -3), ("win", 4), ("lose", -3)] {
        writeln!(&mut f, "{}\t{}", w, s).unwrap();
    }
}

/// Build a small corpus split over a plain and a zst file:
/// - two subreddits ("news", "sports") across four 30-minute buckets after `CUTOFF`
/// - one record exactly at `CUTOFF` (must be excluded) and one before it
/// - one malformed line and one repost of an earlier URL adding no new tokens
/// - "rising" appears more often over time, "falling" less often
pub fn make_corpus() -> (PathBuf, Vec<PathBuf>, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    let mut a = Vec::new();
    let mut b = Vec::new();
    let mut n = 0;
    for bucket in 0..4i64 {
        let ts = CUTOFF + 60 + bucket * 1800;
        for i in 0..8 {
            n += 1;
            let rising = i < 2 * (bucket + 1);
            let falling = i < 2 * (4 - bucket);
            let mut title = String::from("daily thread");
            if rising { title.push_str(" rising"); }
            if falling { title.push_str(" falling"); }
            let (sub, body) = if i % 2 == 0 { ("news", "good good news") } else { ("sports", "bad loss") };
            let line = submission(&format!("https://reddit.com/r/{}/{}", sub, n), ts + i, sub, &title, body);
            if i % 2 == 0 { a.push(line) } else { b.push(line) }
        }
    }
    a.push(submission("https://reddit.com/r/news/at_cutoff", CUTOFF, "news", "boundary", "good"));
    a.push(submission("https://reddit.com/r/news/before", CUTOFF - 10, "news", "ancient", "good"));
    a.push("{\"created_utc\": 1609459300, \"title\": ".to_string());
    // Repost of news/1: every token is already counted for that URL.
    b.push(submission("https://reddit.com/r/news/1", CUTOFF + 120, "news", "Daily thread falling", "good news"));

    let plain = base.join("data").join("RS_part_a.ndjson");
    let zst = base.join("data").join("RS_part_b.ndjson.zst");
    write_jsonl_lines(&plain, &a);
    write_zst_lines(&zst, &b);

    let lex = base.join("data").join("AFINN-111.txt");
    write_lexicon(&lex);
    (base, vec![plain, zst], lex)
}

/// Read a text file line-by-line into strings.
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}
