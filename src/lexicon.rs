//! Static word → sentiment score table (AFINN layout: `word<TAB>score`).

use ahash::AHashMap;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    scores: AHashMap<String, i32>,
}

impl Lexicon {
    /// Load a tab-separated lexicon without header row. Keys are lowercased.
    pub fn load(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(path)
            .with_context(|| format!("open lexicon {}", path.display()))?;

        let mut scores = AHashMap::new();
        for rec in rdr.records() {
            let rec = rec.with_context(|| format!("read lexicon {}", path.display()))?;
            // Physical line, so blank lines skipped by the reader still count.
            let line = rec.position().map_or(0, |p| p.line());
            let word = rec.get(0).map(str::trim).unwrap_or("");
            if word.is_empty() { continue; }
            let raw = rec
                .get(1)
                .ok_or_else(|| anyhow!("lexicon {} line {}: missing score for {:?}", path.display(), line, word))?;
            let score: i32 = raw
                .trim()
                .parse()
                .with_context(|| format!("lexicon {} line {}: bad score {:?}", path.display(), line, raw))?;
            scores.insert(word.to_lowercase(), score);
        }
        tracing::info!("Loaded {} lexicon entries from {}", scores.len(), path.display());
        Ok(Self { scores })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        let scores = pairs.into_iter().map(|(w, s)| (w.as_ref().to_lowercase(), s)).collect();
        Self { scores }
    }

    #[inline]
    pub fn score(&self, token: &str) -> Option<i32> {
        self.scores.get(token).copied()
    }

    pub fn len(&self) -> usize { self.scores.len() }
    pub fn is_empty(&self) -> bool { self.scores.is_empty() }
}
