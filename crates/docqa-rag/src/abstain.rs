//! Confidence gate applied to the top-ranked score.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Answer,
    Abstain { top_score: f32, threshold: f32 },
}

/// Abstain when `top_score` is strictly below `threshold`; a score equal to the threshold answers.
pub fn decide(top_score: f32, threshold: f32) -> Decision {
    if top_score < threshold {
        Decision::Abstain { top_score, threshold }
    } else {
        Decision::Answer
    }
}
