//! Object mobility classification.
//!
//! Stationarity is decided purely by membership of the annotation category in
//! a fixed set. Categories outside the set are treated as movable so novel
//! classes keep taking part in moving-object masking.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Categories that cannot move on their own.
pub const STATIONARY_CATEGORIES: &[&str] = &[
    "movable_object.trafficcone",
    "movable_object.barrier",
    "movable_object.debris",
    "static_object.bicycle_rack",
];

/// Mobility class of an annotated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mobility {
    Stationary,
    Movable,
}

impl Mobility {
    pub fn is_movable(&self) -> bool {
        matches!(self, Mobility::Movable)
    }
}

/// Classifies annotation categories into [`Mobility`] classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryClassifier;

impl CategoryClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a category string. Never fails.
    pub fn classify(&self, category: &str) -> Mobility {
        if STATIONARY_CATEGORIES.contains(&category) {
            Mobility::Stationary
        } else {
            Mobility::Movable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stationary_categories() {
        let classifier = CategoryClassifier::new();
        for category in STATIONARY_CATEGORIES {
            assert_eq!(classifier.classify(category), Mobility::Stationary);
        }
    }

    #[test]
    fn test_movable_and_unknown_categories() {
        let classifier = CategoryClassifier::new();
        assert_eq!(classifier.classify("vehicle.car"), Mobility::Movable);
        assert_eq!(classifier.classify("human.pedestrian.adult"), Mobility::Movable);
        assert_eq!(classifier.classify("something.new"), Mobility::Movable);
        assert_eq!(classifier.classify(""), Mobility::Movable);
    }

    #[test]
    fn test_match_is_exact() {
        let classifier = CategoryClassifier::new();
        assert_eq!(
            classifier.classify("MOVABLE_OBJECT.TRAFFICCONE"),
            Mobility::Movable
        );
        assert_eq!(
            classifier.classify("movable_object.barrier.extra"),
            Mobility::Movable
        );
    }
}
