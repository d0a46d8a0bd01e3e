use serde::{Deserialize, Serialize};
use crate::core::{MatchingRun, MentorDirectory, RunSummary};
use crate::models::domain::{Mentee, StoredAssignment};
use std::collections::HashMap;

/// Response carrying a run and its dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub run: MatchingRun,
    pub summary: RunSummary,
}

impl From<MatchingRun> for RunResponse {
    fn from(run: MatchingRun) -> Self {
        let summary = run.summary();
        Self { run, summary }
    }
}

/// Response for the save pairings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePairingsResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub saved: usize,
}

/// Persisted assignment with the display names known to the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: StoredAssignment,
    #[serde(rename = "menteeName")]
    pub mentee_name: Option<String>,
    #[serde(rename = "mentorName")]
    pub mentor_name: Option<String>,
}

/// Response listing persisted assignments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentsResponse {
    pub assignments: Vec<AssignmentView>,
    pub count: usize,
}

impl AssignmentsResponse {
    /// Attach mentee and mentor names; ids missing from the roster stay unnamed
    pub fn named(
        assignments: Vec<StoredAssignment>,
        mentees: &[Mentee],
        roster: &MentorDirectory,
    ) -> Self {
        let mentee_names: HashMap<&str, &str> = mentees
            .iter()
            .filter_map(|m| m.name.as_deref().map(|name| (m.id.as_str(), name)))
            .collect();

        let assignments: Vec<AssignmentView> = assignments
            .into_iter()
            .map(|assignment| AssignmentView {
                mentee_name: mentee_names
                    .get(assignment.mentee_id.as_str())
                    .map(|name| name.to_string()),
                mentor_name: assignment
                    .mentor_id
                    .as_deref()
                    .and_then(|id| roster.name_of(id))
                    .map(str::to_string),
                assignment,
            })
            .collect();

        Self {
            count: assignments.len(),
            assignments,
        }
    }
}

impl From<Vec<StoredAssignment>> for AssignmentsResponse {
    fn from(assignments: Vec<StoredAssignment>) -> Self {
        Self::named(assignments, &[], &MentorDirectory::default())
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether runs are shared across instances through Redis
    #[serde(rename = "sharedCache")]
    pub shared_cache: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mentor;

    fn stored(mentee_id: &str, mentor_id: Option<&str>) -> StoredAssignment {
        StoredAssignment {
            mentee_id: mentee_id.to_string(),
            mentor_id: mentor_id.map(str::to_string),
            assigned_by: None,
            run_id: Some("run-1".to_string()),
            assigned_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_assignments_carry_roster_names() {
        let mut mentee = Mentee::new("a", vec!["m1".to_string()]);
        mentee.name = Some("Sophia Long".to_string());
        let mut mentor = Mentor::new("m1");
        mentor.name = Some("Sarah Chen".to_string());
        let roster = MentorDirectory::new(vec![mentor]);

        let response = AssignmentsResponse::named(
            vec![stored("a", Some("m1")), stored("b", Some("gone"))],
            &[mentee],
            &roster,
        );

        assert_eq!(response.count, 2);
        assert_eq!(response.assignments[0].mentee_name.as_deref(), Some("Sophia Long"));
        assert_eq!(response.assignments[0].mentor_name.as_deref(), Some("Sarah Chen"));
        // Rows pointing outside the current roster are still listed
        assert_eq!(response.assignments[1].mentee_name, None);
        assert_eq!(response.assignments[1].mentor_name, None);
    }

    #[test]
    fn test_assignment_view_flattens_row() {
        let response = AssignmentsResponse::from(vec![stored("a", Some("m1"))]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["assignments"][0]["menteeId"], "a");
        assert_eq!(json["assignments"][0]["mentorId"], "m1");
        assert!(json["assignments"][0]["mentorName"].is_null());
    }
}
