use crate::core::roster::MentorDirectory;
use crate::models::{Assignment, CapacityPolicy};
use std::collections::HashMap;

/// Free slots per mentor for the duration of one stage
///
/// Only mentors in the roster have an entry, so a claim against an unknown
/// id always fails.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    remaining: HashMap<String, u32>,
}

impl CapacityLedger {
    /// Every roster mentor starts with the slots its policy grants
    pub fn new(directory: &MentorDirectory, policy: CapacityPolicy) -> Self {
        let remaining = directory
            .iter()
            .map(|mentor| (mentor.id.clone(), policy.slots_for(mentor)))
            .collect();

        Self { remaining }
    }

    /// Ledger with every existing assignment already debited
    ///
    /// Assignments naming mentors outside the roster are ignored here; they
    /// still occupy their mentee but free nothing.
    pub fn after(
        directory: &MentorDirectory,
        policy: CapacityPolicy,
        assignments: &[Assignment],
    ) -> Self {
        let mut ledger = Self::new(directory, policy);
        for mentor_id in assignments.iter().filter_map(|a| a.mentor_id.as_deref()) {
            if let Some(slots) = ledger.remaining.get_mut(mentor_id) {
                *slots = slots.saturating_sub(1);
            }
        }
        ledger
    }

    /// Take one slot from the mentor. Returns false if it has none left or
    /// is not in the roster.
    #[inline]
    pub fn try_claim(&mut self, mentor_id: &str) -> bool {
        match self.remaining.get_mut(mentor_id) {
            Some(slots) if *slots > 0 => {
                *slots -= 1;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn remaining(&self, mentor_id: &str) -> u32 {
        self.remaining.get(mentor_id).copied().unwrap_or(0)
    }

    pub fn has_room(&self, mentor_id: &str) -> bool {
        self.remaining(mentor_id) > 0
    }

    /// Sum of free slots across the roster
    pub fn total_remaining(&self) -> u64 {
        self.remaining.values().map(|&s| u64::from(s)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mentor;

    fn directory() -> MentorDirectory {
        MentorDirectory::new(vec![
            Mentor::with_capacity("m1", 2),
            Mentor::with_capacity("m2", 0),
        ])
    }

    #[test]
    fn test_single_policy_claims_once() {
        let mut ledger = CapacityLedger::new(&directory(), CapacityPolicy::Single);

        assert!(ledger.try_claim("m1"));
        assert!(!ledger.try_claim("m1"));
        // Capacity 0 on the profile is irrelevant under the single policy
        assert!(ledger.try_claim("m2"));
    }

    #[test]
    fn test_profile_policy_honours_capacity() {
        let mut ledger = CapacityLedger::new(&directory(), CapacityPolicy::Profile);

        assert!(ledger.try_claim("m1"));
        assert!(ledger.try_claim("m1"));
        assert!(!ledger.try_claim("m1"));
        assert!(!ledger.try_claim("m2"));
    }

    #[test]
    fn test_unknown_mentor_never_claimable() {
        let mut ledger = CapacityLedger::new(&directory(), CapacityPolicy::Profile);
        assert!(!ledger.try_claim("ghost"));
        assert_eq!(ledger.remaining("ghost"), 0);
    }

    #[test]
    fn test_after_debits_existing_assignments() {
        let assignments = vec![
            Assignment::matched("a", "m1"),
            Assignment::matched("b", "ghost"),
            Assignment::unmatched("c"),
        ];
        let ledger = CapacityLedger::after(&directory(), CapacityPolicy::Profile, &assignments);

        assert_eq!(ledger.remaining("m1"), 1);
        assert_eq!(ledger.total_remaining(), 1);
    }
}
