use serde::{Deserialize, Serialize};

/// A participant seeking a mentor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentee {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Mentor ids, most preferred first. May reference mentors that are
    /// not in the current roster.
    #[serde(rename = "rankedChoices", default)]
    pub ranked_choices: Vec<String>,
}

impl Mentee {
    pub fn new(id: impl Into<String>, ranked_choices: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            ranked_choices,
        }
    }
}

/// A participant available to be matched to mentees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

impl Mentor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            capacity: default_capacity(),
        }
    }

    pub fn with_capacity(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            capacity,
            ..Self::new(id)
        }
    }
}

/// Profile default used by the mentor registration form
pub fn default_capacity() -> u32 { 3 }

/// One mentee's outcome within a matching run. `mentor_id == None` means unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "menteeId")]
    pub mentee_id: String,
    #[serde(rename = "mentorId")]
    pub mentor_id: Option<String>,
}

impl Assignment {
    pub fn matched(mentee_id: impl Into<String>, mentor_id: impl Into<String>) -> Self {
        Self {
            mentee_id: mentee_id.into(),
            mentor_id: Some(mentor_id.into()),
        }
    }

    pub fn unmatched(mentee_id: impl Into<String>) -> Self {
        Self {
            mentee_id: mentee_id.into(),
            mentor_id: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.mentor_id.is_some()
    }
}

/// How many mentees a mentor may take within one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Every mentor is occupied after its first claim
    #[default]
    Single,
    /// Every mentor takes up to its profile `capacity`
    Profile,
}

impl CapacityPolicy {
    /// Slots a mentor offers in a single run under this policy
    #[inline]
    pub fn slots_for(&self, mentor: &Mentor) -> u32 {
        match self {
            CapacityPolicy::Single => 1,
            CapacityPolicy::Profile => mentor.capacity,
        }
    }
}

/// A mentee/mentor pair ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    #[serde(rename = "menteeId")]
    pub mentee_id: String,
    #[serde(rename = "mentorId")]
    pub mentor_id: String,
    #[serde(rename = "assignedBy", default)]
    pub assigned_by: Option<String>,
}

/// Persisted assignment row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAssignment {
    #[serde(rename = "menteeId")]
    pub mentee_id: String,
    #[serde(rename = "mentorId")]
    pub mentor_id: Option<String>,
    #[serde(rename = "assignedBy")]
    pub assigned_by: Option<String>,
    #[serde(rename = "runId")]
    pub run_id: Option<String>,
    #[serde(rename = "assignedAt")]
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}
