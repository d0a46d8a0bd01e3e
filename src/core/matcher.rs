use crate::core::{capacity::CapacityLedger, roster::MentorDirectory};
use crate::models::{Assignment, CapacityPolicy, Mentee};

/// Preference matcher - greedy first-available assignment
///
/// Mentees are served in input order and each one takes the first of its
/// ranked choices that still has a free slot. There is no backtracking: an
/// earlier mentee keeps a contested mentor even if a later mentee ranked that
/// mentor higher. Callers control priority through the order of `mentees`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    policy: CapacityPolicy,
}

impl Matcher {
    pub fn new(policy: CapacityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Produce one assignment per mentee, in input order
    ///
    /// Choices naming mentors outside `directory` are skipped. A mentee whose
    /// choices are empty, unknown or already taken ends up unmatched. Never
    /// fails.
    pub fn match_preferences(
        &self,
        mentees: &[Mentee],
        directory: &MentorDirectory,
    ) -> Vec<Assignment> {
        let mut ledger = CapacityLedger::new(directory, self.policy);

        let assignments: Vec<Assignment> = mentees
            .iter()
            .map(|mentee| {
                let claimed = mentee
                    .ranked_choices
                    .iter()
                    .find(|choice| ledger.try_claim(choice));

                match claimed {
                    Some(mentor_id) => Assignment::matched(&mentee.id, mentor_id),
                    None => Assignment::unmatched(&mentee.id),
                }
            })
            .collect();

        tracing::debug!(
            "Preference matching left {} free mentor slots",
            ledger.total_remaining()
        );

        assignments
    }
}
