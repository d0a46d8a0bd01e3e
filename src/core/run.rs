use crate::core::{matcher::Matcher, reconciler::Reconciler, roster::MentorDirectory};
use crate::models::{Assignment, CapacityPolicy, Mentee, Pairing};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Which stage produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStage {
    Matched,
    Reconciled,
}

/// Immutable result of one matching stage
///
/// Carries the snapshot it was computed from, so later stages (pairing the
/// remainder, saving) operate on exactly the same roster. Every stage returns
/// a new run with a new id instead of modifying this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingRun {
    pub id: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    pub stage: RunStage,
    #[serde(rename = "reconciliationPasses")]
    pub reconciliation_passes: u32,
    pub policy: CapacityPolicy,
    pub mentees: Vec<Mentee>,
    pub roster: MentorDirectory,
    pub assignments: Vec<Assignment>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchingRun {
    /// Run the preference matcher over a fresh snapshot
    pub fn start(mentees: Vec<Mentee>, roster: MentorDirectory, policy: CapacityPolicy) -> Self {
        let assignments = Matcher::new(policy).match_preferences(&mentees, &roster);

        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            stage: RunStage::Matched,
            reconciliation_passes: 0,
            policy,
            mentees,
            roster,
            assignments,
            created_at: chrono::Utc::now(),
        }
    }

    /// Pair the remaining mentees with the remaining mentors
    pub fn reconcile(&self) -> Self {
        let assignments = Reconciler::new(self.policy).reconcile(&self.assignments, &self.roster);

        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: Some(self.id.clone()),
            stage: RunStage::Reconciled,
            reconciliation_passes: self.reconciliation_passes + 1,
            policy: self.policy,
            mentees: self.mentees.clone(),
            roster: self.roster.clone(),
            assignments,
            created_at: chrono::Utc::now(),
        }
    }

    /// Matched assignments only, ready for the assignment store
    pub fn pairings(&self, assigned_by: Option<&str>) -> Vec<Pairing> {
        self.assignments
            .iter()
            .filter_map(|a| {
                a.mentor_id.as_ref().map(|mentor_id| Pairing {
                    mentee_id: a.mentee_id.clone(),
                    mentor_id: mentor_id.clone(),
                    assigned_by: assigned_by.map(str::to_string),
                })
            })
            .collect()
    }

    pub fn matched_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_matched()).count()
    }

    pub fn summary(&self) -> RunSummary {
        let unmatched_mentees: Vec<String> = self
            .assignments
            .iter()
            .filter(|a| !a.is_matched())
            .map(|a| a.mentee_id.clone())
            .collect();

        let unassigned_mentors = Reconciler::new(self.policy)
            .available_mentors(&self.assignments, &self.roster);

        let ranked: HashSet<&str> = self
            .mentees
            .iter()
            .flat_map(|m| m.ranked_choices.iter().map(String::as_str))
            .collect();
        let unchosen_mentors = self
            .roster
            .iter()
            .filter(|m| !ranked.contains(m.id.as_str()))
            .map(|m| m.id.clone())
            .collect();

        RunSummary {
            total_mentees: self.mentees.len(),
            total_mentors: self.roster.len(),
            matched: self.matched_count(),
            unmatched: unmatched_mentees.len(),
            unmatched_mentees,
            unassigned_mentors,
            unchosen_mentors,
        }
    }
}

/// Counters and leftovers of a run, as shown on the matching dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "totalMentees")]
    pub total_mentees: usize,
    #[serde(rename = "totalMentors")]
    pub total_mentors: usize,
    pub matched: usize,
    pub unmatched: usize,
    #[serde(rename = "unmatchedMentees")]
    pub unmatched_mentees: Vec<String>,
    #[serde(rename = "unassignedMentors")]
    pub unassigned_mentors: Vec<String>,
    #[serde(rename = "unchosenMentors")]
    pub unchosen_mentors: Vec<String>,
}
