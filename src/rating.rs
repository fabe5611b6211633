/// Qualitative performance tier for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RatingTier {
    Excellent,
    Great,
    Good,
    Fair,
    Beginner,
}

/// Ordered (wpm floor, accuracy floor) bars, highest first. A row matches
/// only when both bars hold; anything below every row is Beginner.
const THRESHOLDS: [(u32, u32, RatingTier); 4] = [
    (60, 95, RatingTier::Excellent),
    (40, 90, RatingTier::Great),
    (25, 80, RatingTier::Good),
    (15, 70, RatingTier::Fair),
];

impl RatingTier {
    pub fn message(&self) -> &'static str {
        match self {
            RatingTier::Excellent => "Professional level typing!",
            RatingTier::Great => "Above average typing skills!",
            RatingTier::Good => "Average typing skills!",
            RatingTier::Fair => "Keep practicing!",
            RatingTier::Beginner => "Practice more to improve!",
        }
    }
}

/// Map final WPM and accuracy to a tier. First matching row wins.
pub fn classify(wpm: u32, accuracy: u32) -> RatingTier {
    THRESHOLDS
        .iter()
        .find(|(wpm_floor, accuracy_floor, _)| wpm >= *wpm_floor && accuracy >= *accuracy_floor)
        .map(|(_, _, tier)| *tier)
        .unwrap_or(RatingTier::Beginner)
}
