/// Levenshtein distance between two strings, counted in `char`s.
///
/// Substitution, insertion and deletion each cost 1. Only two rows of the
/// distance table are kept alive at a time.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0usize; a.len() + 1];

    for j in 1..=b.len() {
        curr[0] = j;
        for i in 1..=a.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[i] = (curr[i - 1] + 1)
                .min(prev[i] + 1)
                .min(prev[i - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

/// Normalized similarity in `[0, 1]`: `(max_len - distance) / max_len`.
///
/// Two empty strings are a perfect match (1.0). No case folding happens here;
/// callers lower-case their tokens first.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = edit_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}
