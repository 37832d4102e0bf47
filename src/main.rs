use anyhow::{bail, Result};
use std::path::PathBuf;
use subtrends::{discover_inputs, TrendReport};
use time::macros::{datetime, offset};

const DATA_ROOT: &str = "./data";
const REPORT_ROOT: &str = "./report";
const LEXICON_FILE: &str = "AFINN-111.txt";

fn main() -> Result<()> {
    let data_dir = PathBuf::from(DATA_ROOT);
    let inputs = discover_inputs(&data_dir);
    if inputs.is_empty() {
        bail!("no NDJSON inputs found under {}", data_dir.display());
    }

    let out = TrendReport::new()
        .inputs(&inputs)
        .lexicon(data_dir.join(LEXICON_FILE))
        .out_dir(REPORT_ROOT)
        .cutoff(datetime!(2020-11-03 00:00 UTC))
        .display_offset(offset!(-5))
        .progress(true)
        .run()?;

    println!(
        "Ingested {} records ({} malformed lines skipped)",
        out.stats.kept, out.stats.malformed
    );
    println!("Rising words:  {}", out.word_extremes.rising_keys().join(", "));
    println!("Falling words: {}", out.word_extremes.falling_keys().join(", "));
    println!("Subreddits scored: {}", out.summary.len());
    println!("Report written to {}", REPORT_ROOT);
    Ok(())
}
