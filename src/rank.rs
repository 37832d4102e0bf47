use crate::trend::Slope;

/// Most extreme slopes in each direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extremes {
    pub rising: Vec<Slope>,  // largest estimates first
    pub falling: Vec<Slope>, // smallest estimates first
}

impl Extremes {
    pub fn rising_keys(&self) -> Vec<&str> {
        self.rising.iter().map(|s| s.key.as_str()).collect()
    }
    pub fn falling_keys(&self) -> Vec<&str> {
        self.falling.iter().map(|s| s.key.as_str()).collect()
    }
}

/// Select the `n` largest and `n` smallest estimates.
///
/// Both selections come from one total order (estimate, then key), read from either end:
/// among equal estimates `falling` prefers the smaller key and `rising` the larger one.
/// The two sets are therefore disjoint whenever there are at least `2n` slopes.
pub fn rank_extremes(slopes: &[Slope], n: usize) -> Extremes {
    let mut ordered: Vec<&Slope> = slopes.iter().collect();
    ordered.sort_by(|a, b| a.estimate.total_cmp(&b.estimate).then_with(|| a.key.cmp(&b.key)));

    Extremes {
        rising: ordered.iter().rev().take(n).map(|s| (*s).clone()).collect(),
        falling: ordered.iter().take(n).map(|s| (*s).clone()).collect(),
    }
}
