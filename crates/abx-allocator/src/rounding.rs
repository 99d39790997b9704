use std::cmp::Ordering;

/// Round to two decimal places.
///
/// Applied to every computed fraction so floating drift never shows up as
/// `0.33000000000000002` in an editor.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compare variant ids the way a human-facing list orders them: letters
/// compare case-insensitively first, then lowercase sorts before uppercase.
///
/// This is not full locale collation. Folded strings compare by code point,
/// so accented letters sort after `z` and punctuation such as `_` sorts
/// after digits. Variant ids are ASCII letters, where the two agree.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<char>>();
    folded(a)
        .cmp(&folded(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}
