/// Live view of one session, derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreSnapshot {
    pub wpm: u32,
    pub accuracy: u32,
    pub progress: u32,
}

/// Count positions where `typed` matches `target`, over the common prefix.
/// Characters typed past the end of the target are never compared.
pub fn correct_chars(target: &str, typed: &str) -> usize {
    target
        .chars()
        .zip(typed.chars())
        .filter(|(expected, got)| expected == got)
        .count()
}

/// Score a typed prefix against the target text.
///
/// All three figures are floored integers. Zero input scores 0% accuracy
/// rather than a vacuous 100%, and WPM counts only correct characters (the
/// standard 5-chars-per-word approximation), so mistyping never inflates
/// speed.
pub fn score(target: &str, typed: &str, elapsed_secs: f64) -> ScoreSnapshot {
    let target_len = target.chars().count();
    let typed_len = typed.chars().count();
    let correct = correct_chars(target, typed);

    let accuracy = if typed_len > 0 {
        (100 * correct / typed_len) as u32
    } else {
        0
    };

    let wpm = if elapsed_secs > 0.0 {
        (60.0 * (correct as f64 / 5.0) / elapsed_secs) as u32
    } else {
        0
    };

    let progress = if target_len > 0 {
        (100 * typed_len / target_len).min(100) as u32
    } else {
        100
    };

    ScoreSnapshot {
        wpm,
        accuracy,
        progress,
    }
}
