//! Byte-based progress over all inputs; compressed bytes for zst files.

use crate::paths::InputJob;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::time::Duration;

pub fn ingest_progress_bar(total_bytes: u64, label: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg:<8} {bytes:>10}/{total_bytes:<10} [{wide_bar:.cyan/blue}] {percent:>3}%  {bytes_per_sec}  eta {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ");
    let pb = ProgressBar::new(total_bytes).with_style(style).with_message(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn total_input_size(jobs: &[InputJob]) -> u64 {
    jobs.iter().filter_map(|j| fs::metadata(&j.path).ok()).map(|m| m.len()).sum()
}
