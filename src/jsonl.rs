use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

use crate::paths::{InputJob, InputKind};

/// Minimal line-level schema for submissions.
/// Every other field in the dump (media, awards, preview, ...) is ignored by serde
/// and never materialized.
#[derive(Debug, Deserialize)]
pub struct MinimalRecord {
    pub url: Option<String>,
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_epoch")]
    pub created_utc: Option<i64>,
    pub subreddit: Option<String>,
    pub title: Option<String>,
    pub selftext: Option<String>,
}

/// Dumps are inconsistent about `created_utc`: integer, float, or a numeric string.
fn de_epoch<'de, D>(d: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().map(|f| f.floor() as i64))
        }
        _ => None,
    })
}

/// Parse a JSON line into `MinimalRecord` using serde_json.
#[inline]
pub fn parse_minimal(line: &str) -> Result<MinimalRecord> {
    Ok(serde_json::from_str(line)?)
}

/// A `Read` wrapper that counts on-disk bytes read (compressed bytes for zst).
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}
impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

fn open_reader(job: &InputJob, counter: Arc<AtomicU64>, cap: usize) -> Result<Box<dyn BufRead>> {
    let file = File::open(&job.path).with_context(|| format!("open {}", job.path.display()))?;
    let cnt = CountingReader { inner: file, counter };
    let cap = cap.max(8 * 1024);
    Ok(match job.kind {
        InputKind::Plain => Box::new(BufReader::with_capacity(cap, cnt)),
        InputKind::Zst => {
            let mut decoder = Decoder::new(cnt).with_context(|| format!("zstd init {}", job.path.display()))?;
            // Large frames in monthly dumps need the long window.
            decoder.window_log_max(31)?;
            Box::new(BufReader::with_capacity(cap, decoder))
        }
    })
}

/// Stream an NDJSON input line-by-line, calling `on_line(line_no, line)` with the raw
/// line (trailing `\r?\n` stripped) and `on_progress(delta_bytes)` as bytes are consumed.
/// Read and decode errors abort with the file path in context.
pub fn for_each_line_with_progress_cfg(
    job: &InputJob,
    read_buf_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_line: impl FnMut(u64, &str) -> Result<()>,
) -> Result<()> {
    let counter = Arc::new(AtomicU64::new(0));
    let mut reader = open_reader(job, counter.clone(), read_buf_bytes)?;

    let mut buf: Vec<u8> = Vec::with_capacity(16 * 1024);
    let mut last = 0u64;
    let mut line_no = 0u64;
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {} after line {}", job.path.display(), line_no))?;
        let cur = counter.load(Ordering::Relaxed);
        if cur > last {
            on_progress(cur - last);
            last = cur;
        }
        if n == 0 {
            break;
        }
        line_no += 1;
        if buf.ends_with(b"\n") {
            let _ = buf.pop();
            if buf.ends_with(b"\r") { let _ = buf.pop(); }
        }
        // Invalid UTF-8 is replaced rather than failing the file; serde sees U+FFFD.
        let line = String::from_utf8_lossy(&buf);
        on_line(line_no, &line)?;
    }
    Ok(())
}
