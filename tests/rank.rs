use subtrends::{rank_extremes, Slope};

fn slope(key: &str, estimate: f64) -> Slope {
    Slope { key: key.to_string(), estimate, std_error: None, statistic: None, p_value: None, n_points: 3 }
}

/// The ten largest come back largest first, the ten smallest smallest first.
#[test]
fn picks_both_tails() {
    let slopes: Vec<Slope> = (0..25).map(|i| slope(&format!("w{:02}", i), (i as f64 - 12.0) * 1e-6)).collect();
    let ex = rank_extremes(&slopes, 10);

    let want_rising: Vec<String> = (15..25).rev().map(|i| format!("w{:02}", i)).collect();
    let want_falling: Vec<String> = (0..10).map(|i| format!("w{:02}", i)).collect();
    assert_eq!(ex.rising_keys(), want_rising.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(ex.falling_keys(), want_falling.iter().map(String::as_str).collect::<Vec<_>>());
}

/// Fewer slopes than `n` returns everything in each direction.
#[test]
fn short_input_returns_all() {
    let slopes = vec![slope("b", 1.0), slope("a", -1.0), slope("c", 0.0)];
    let ex = rank_extremes(&slopes, 10);
    assert_eq!(ex.rising_keys(), vec!["b", "c", "a"]);
    assert_eq!(ex.falling_keys(), vec!["a", "c", "b"]);
    assert_eq!(rank_extremes(&[], 10), Default::default());
}

/// Equal estimates break ties by key, and the selections stay disjoint.
#[test]
fn ties_are_deterministic_and_disjoint() {
    let slopes: Vec<Slope> = ["d", "a", "f", "c", "b", "e"].iter().map(|k| slope(k, 0.5)).collect();
    let ex = rank_extremes(&slopes, 3);
    assert_eq!(ex.falling_keys(), vec!["a", "b", "c"]);
    assert_eq!(ex.rising_keys(), vec!["f", "e", "d"]);

    let mut shuffled = slopes.clone();
    shuffled.reverse();
    assert_eq!(rank_extremes(&shuffled, 3), ex);
}

/// Input order does not matter and the input is left untouched.
#[test]
fn independent_of_input_order() {
    let a = vec![slope("x", 3.0), slope("y", -2.0), slope("z", 1.0), slope("q", -5.0)];
    let mut b = a.clone();
    b.rotate_left(2);
    assert_eq!(rank_extremes(&a, 2), rank_extremes(&b, 2));
    assert_eq!(a[0].key, "x");
    assert_eq!(rank_extremes(&a, 2).rising_keys(), vec!["x", "z"]);
    assert_eq!(rank_extremes(&a, 2).falling_keys(), vec!["q", "y"]);
}
