use crate::core::{capacity::CapacityLedger, roster::MentorDirectory};
use crate::models::{Assignment, CapacityPolicy};
use std::collections::VecDeque;

/// Remainder reconciler - fills unmatched mentees with whoever is still free
///
/// Preferences are ignored. Unmatched mentees are visited in their order in
/// the assignment list and take mentors from a queue built in roster order.
/// Existing pairs are never touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: CapacityPolicy,
}

impl Reconciler {
    pub fn new(policy: CapacityPolicy) -> Self {
        Self { policy }
    }

    /// Mentor ids that still have a free slot, in roster order
    pub fn available_mentors(
        &self,
        assignments: &[Assignment],
        directory: &MentorDirectory,
    ) -> Vec<String> {
        let ledger = CapacityLedger::after(directory, self.policy, assignments);
        directory
            .iter()
            .filter(|m| ledger.has_room(&m.id))
            .map(|m| m.id.clone())
            .collect()
    }

    /// Return a copy of `assignments` with as many gaps filled as the roster allows
    ///
    /// Running it again on its own output is a no-op unless the roster has
    /// grown. Under the profile policy a mentor with slots left after a pairing
    /// goes to the back of the queue, so spare capacity is spread round-robin.
    pub fn reconcile(
        &self,
        assignments: &[Assignment],
        directory: &MentorDirectory,
    ) -> Vec<Assignment> {
        let mut ledger = CapacityLedger::after(directory, self.policy, assignments);
        let mut queue: VecDeque<&str> = directory
            .iter()
            .filter(|m| ledger.has_room(&m.id))
            .map(|m| m.id.as_str())
            .collect();

        let mut reconciled = assignments.to_vec();

        for assignment in reconciled.iter_mut().filter(|a| a.mentor_id.is_none()) {
            let Some(mentor_id) = queue.pop_front() else {
                break;
            };

            ledger.try_claim(mentor_id);
            assignment.mentor_id = Some(mentor_id.to_string());

            if ledger.has_room(mentor_id) {
                queue.push_back(mentor_id);
            }
        }

        reconciled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mentor;

    fn roster(ids: &[&str]) -> MentorDirectory {
        ids.iter().map(|id| Mentor::new(*id)).collect()
    }

    #[test]
    fn test_fills_gap_with_unclaimed_mentor() {
        let reconciler = Reconciler::default();
        let assignments = vec![
            Assignment::matched("A", "M1"),
            Assignment::matched("B", "M3"),
            Assignment::unmatched("C"),
        ];

        let result = reconciler.reconcile(&assignments, &roster(&["M1", "M2", "M3"]));

        assert_eq!(result[2], Assignment::matched("C", "M2"));
        assert_eq!(result[..2], assignments[..2]);
    }

    #[test]
    fn test_pairs_in_encounter_and_roster_order() {
        let reconciler = Reconciler::default();
        let assignments = vec![
            Assignment::unmatched("A"),
            Assignment::matched("B", "M2"),
            Assignment::unmatched("C"),
        ];

        let result = reconciler.reconcile(&assignments, &roster(&["M3", "M1", "M2"]));

        assert_eq!(result[0], Assignment::matched("A", "M3"));
        assert_eq!(result[2], Assignment::matched("C", "M1"));
    }

    #[test]
    fn test_scarce_mentors_leave_tail_unmatched() {
        let reconciler = Reconciler::default();
        let assignments = vec![
            Assignment::unmatched("A"),
            Assignment::unmatched("B"),
            Assignment::unmatched("C"),
        ];

        let result = reconciler.reconcile(&assignments, &roster(&["M1"]));

        assert_eq!(result[0], Assignment::matched("A", "M1"));
        assert!(!result[1].is_matched());
        assert!(!result[2].is_matched());
    }

    #[test]
    fn test_no_available_mentors_is_noop() {
        let reconciler = Reconciler::default();
        let assignments = vec![Assignment::matched("A", "M1"), Assignment::unmatched("B")];

        let result = reconciler.reconcile(&assignments, &roster(&["M1"]));

        assert_eq!(result, assignments);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let reconciler = Reconciler::default();
        let directory = roster(&["M1", "M2"]);
        let assignments = vec![Assignment::unmatched("A"), Assignment::unmatched("B")];

        let once = reconciler.reconcile(&assignments, &directory);
        let twice = reconciler.reconcile(&once, &directory);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_stale_mentor_reference_kept() {
        let reconciler = Reconciler::default();
        let assignments = vec![Assignment::matched("A", "gone"), Assignment::unmatched("B")];

        let result = reconciler.reconcile(&assignments, &roster(&["M1"]));

        assert_eq!(result[0], Assignment::matched("A", "gone"));
        assert_eq!(result[1], Assignment::matched("B", "M1"));
    }

    #[test]
    fn test_profile_policy_round_robin() {
        let reconciler = Reconciler::new(CapacityPolicy::Profile);
        let directory: MentorDirectory = vec![
            Mentor::with_capacity("M1", 2),
            Mentor::with_capacity("M2", 1),
        ]
        .into();
        let assignments = vec![
            Assignment::unmatched("A"),
            Assignment::unmatched("B"),
            Assignment::unmatched("C"),
            Assignment::unmatched("D"),
        ];

        let result = reconciler.reconcile(&assignments, &directory);

        assert_eq!(result[0], Assignment::matched("A", "M1"));
        assert_eq!(result[1], Assignment::matched("B", "M2"));
        assert_eq!(result[2], Assignment::matched("C", "M1"));
        assert_eq!(result[3], Assignment::unmatched("D"));
    }

    #[test]
    fn test_available_mentors_in_roster_order() {
        let reconciler = Reconciler::default();
        let assignments = vec![Assignment::matched("A", "M2")];

        let available = reconciler.available_mentors(&assignments, &roster(&["M3", "M2", "M1"]));

        assert_eq!(available, vec!["M3".to_string(), "M1".to_string()]);
    }
}
