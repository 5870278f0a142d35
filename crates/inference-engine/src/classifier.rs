//! Classifier Capability and Slots

use crate::InferenceError;
use vitals_core::Condition;

/// Raw classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Generic outlier detector: presence or absence
    Presence(bool),
    /// Integer-coded boolean: nonzero means detected
    Coded(i64),
}

impl Score {
    /// Whether the score signals the condition
    pub fn detected(&self) -> bool {
        match self {
            Score::Presence(present) => *present,
            Score::Coded(code) => *code != 0,
        }
    }
}

/// Opaque scoring function for one condition
pub trait Classifier: Send + Sync {
    /// Score a reading pair
    fn score(&self, heart_rate: u32, spo2: u32) -> Result<Score, InferenceError>;
}

/// Classifier backed by a plain function
pub struct FnClassifier<F>(F);

/// Wrap a scoring function as a [`Classifier`]
pub fn from_fn<F>(f: F) -> FnClassifier<F>
where
    F: Fn(u32, u32) -> Result<Score, InferenceError> + Send + Sync,
{
    FnClassifier(f)
}

impl<F> Classifier for FnClassifier<F>
where
    F: Fn(u32, u32) -> Result<Score, InferenceError> + Send + Sync,
{
    fn score(&self, heart_rate: u32, spo2: u32) -> Result<Score, InferenceError> {
        (self.0)(heart_rate, spo2)
    }
}

/// Fixed set of optional classifier slots, one per [`Condition`]
#[derive(Default)]
pub struct ClassifierSlots {
    slots: [Option<Box<dyn Classifier>>; 4],
}

impl ClassifierSlots {
    /// All slots empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, condition: Condition, classifier: impl Classifier + 'static) -> Self {
        self.insert(condition, Box::new(classifier));
        self
    }

    /// Fill (or replace) the slot for a condition
    pub fn insert(&mut self, condition: Condition, classifier: Box<dyn Classifier>) {
        self.slots[condition.index()] = Some(classifier);
    }

    /// Classifier loaded for a condition, if any
    pub fn get(&self, condition: Condition) -> Option<&dyn Classifier> {
        self.slots[condition.index()].as_deref()
    }

    /// Conditions with a loaded classifier
    pub fn loaded(&self) -> impl Iterator<Item = Condition> + '_ {
        Condition::ALL
            .into_iter()
            .filter(|c| self.slots[c.index()].is_some())
    }

    /// Number of loaded classifiers
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no classifier is loaded
    pub fn is_empty(&self) -> bool {
        self.loaded_count() == 0
    }
}

impl std::fmt::Debug for ClassifierSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.loaded()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_polymorphism() {
        assert!(Score::Presence(true).detected());
        assert!(!Score::Presence(false).detected());
        assert!(Score::Coded(1).detected());
        assert!(Score::Coded(-1).detected());
        assert!(!Score::Coded(0).detected());
    }

    #[test]
    fn test_slots() {
        let slots = ClassifierSlots::empty()
            .with(Condition::Tachycardia, from_fn(|_, _| Ok(Score::Coded(0))));

        assert_eq!(slots.loaded_count(), 1);
        assert!(slots.get(Condition::Tachycardia).is_some());
        assert!(slots.get(Condition::Anomaly).is_none());
        assert_eq!(slots.loaded().collect::<Vec<_>>(), vec![Condition::Tachycardia]);
        assert!(ClassifierSlots::empty().is_empty());
    }
}
