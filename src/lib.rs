//! Mentor Match - mentee to mentor assignment service
//!
//! The core is a two-stage engine: a greedy preference matcher that walks each
//! mentee's ranked choices in input order, followed by a reconciler that pairs
//! whoever is left with mentors that still have room. Both stages are pure;
//! the service layer fetches the roster, keeps runs addressable by id and
//! persists the final pairings.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CapacityLedger, Matcher, MatchingRun, MentorDirectory, Reconciler, RunStage, RunSummary};
pub use crate::models::{Assignment, CapacityPolicy, Mentee, Mentor, Pairing};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let directory: MentorDirectory = vec![Mentor::new("m1")].into();
        let assignments = Matcher::default().match_preferences(
            &[Mentee::new("a", vec!["m1".to_string()])],
            &directory,
        );
        assert_eq!(assignments, vec![Assignment::matched("a", "m1")]);
    }
}
