// File: src/fuzzy/levenshtein.rs

/// Levenshtein distance between two words: the minimum number of single
/// character insertions, deletions and substitutions turning `a` into `b`.
/// Operates on chars, not bytes, so accented forms count as one edit.
/// Complexity: O(n*m) time, O(m) space.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }

    // Single rolling row; `prev_diag` holds the cell up-left of the current one.
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let substitution = prev_diag + usize::from(ca != cb);
            prev_diag = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(prev_diag + 1);
        }
    }
    row[b_chars.len()]
}

/// True when `candidate` is far enough from `word` not to be a spelling
/// variant of it.
pub fn is_distinct_spelling(word: &str, candidate: &str, min_distance: usize) -> bool {
    edit_distance(word, candidate) > min_distance
}
