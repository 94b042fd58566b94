// String similarity scoring on top of classic Levenshtein distance.
// Full-matrix DP is fine at chat-message lengths.

/// Levenshtein distance: minimum number of single-character insertions,
/// deletions and substitutions turning `a` into `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        dp[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[a.len()][b.len()]
}

/// Similarity percentage between two strings, in `[0.0, 100.0]`.
///
/// Empty inputs score 0 before anything else is looked at. Keep that
/// ordering: it is what makes the `max_len == 0` fallback unreachable.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a == b {
        return 100.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }

    let distance = edit_distance(a, b);
    ((max_len - distance) as f64 / max_len as f64) * 100.0
}
