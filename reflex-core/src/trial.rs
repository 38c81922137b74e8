use serde::{Deserialize, Serialize};

use crate::stimulus::StimulusKind;

/// How a single reaction trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outcome {
    Correct { reaction_ms: f64 },
    /// Wrong action, or any action on a no-go stimulus.
    Miss,
    /// Input arrived before the stimulus was shown.
    FalseStart,
}

/// Record of one completed trial.
///
/// A reaction time exists only for correct trials, and a miss is never
/// correct; both follow from `Outcome`. The arithmetic result is attached at
/// most once via [`Trial::with_math`] before the trial joins the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    outcome: Outcome,
    stimulus: Option<StimulusKind>,
    math_correct: Option<bool>,
}

impl Trial {
    pub fn correct(stimulus: StimulusKind, reaction_ms: f64) -> Self {
        Self {
            outcome: Outcome::Correct {
                reaction_ms: reaction_ms.max(0.0),
            },
            stimulus: Some(stimulus),
            math_correct: None,
        }
    }

    pub fn miss(stimulus: StimulusKind) -> Self {
        Self {
            outcome: Outcome::Miss,
            stimulus: Some(stimulus),
            math_correct: None,
        }
    }

    pub fn false_start() -> Self {
        Self {
            outcome: Outcome::FalseStart,
            stimulus: None,
            math_correct: None,
        }
    }

    pub fn with_math(self, correct: bool) -> Self {
        Self {
            math_correct: Some(correct),
            ..self
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn stimulus(&self) -> Option<StimulusKind> {
        self.stimulus
    }

    pub fn reaction_ms(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Correct { reaction_ms } => Some(reaction_ms),
            Outcome::Miss | Outcome::FalseStart => None,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self.outcome, Outcome::Correct { .. })
    }

    pub fn is_miss(&self) -> bool {
        !self.is_correct()
    }

    pub fn is_false_start(&self) -> bool {
        matches!(self.outcome, Outcome::FalseStart)
    }

    pub fn math_correct(&self) -> Option<bool> {
        self.math_correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_time_only_on_correct() {
        let hit = Trial::correct(StimulusKind::Go, 212.5);
        assert!(hit.is_correct() && !hit.is_miss());
        assert_eq!(hit.reaction_ms(), Some(212.5));

        let miss = Trial::miss(StimulusKind::NoGo);
        assert!(miss.is_miss() && !miss.is_correct());
        assert_eq!(miss.reaction_ms(), None);

        let early = Trial::false_start();
        assert!(early.is_miss() && early.is_false_start());
        assert_eq!(early.reaction_ms(), None);
        assert_eq!(early.stimulus(), None);
    }

    #[test]
    fn negative_reaction_clamped() {
        let t = Trial::correct(StimulusKind::Left, -3.0);
        assert_eq!(t.reaction_ms(), Some(0.0));
    }

    #[test]
    fn math_result_attaches() {
        let t = Trial::correct(StimulusKind::Go, 300.0).with_math(false);
        assert_eq!(t.math_correct(), Some(false));
        assert!(t.is_correct());
    }

    #[test]
    fn serializes_tagged_outcome() {
        let json = serde_json::to_value(Trial::correct(StimulusKind::Go, 250.0)).unwrap();
        assert_eq!(json["outcome"]["type"], "correct");
        assert_eq!(json["outcome"]["reaction_ms"], 250.0);
        assert_eq!(json["stimulus"], "go");
    }
}
