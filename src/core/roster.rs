use crate::models::Mentor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mentor roster indexed by id, built once per run
///
/// Keeps the roster order of the source (the reconciler hands out free
/// mentors in that order). If the source lists the same id twice, the first
/// record wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Mentor>", into = "Vec<Mentor>")]
pub struct MentorDirectory {
    mentors: Vec<Mentor>,
    index: HashMap<String, usize>,
}

impl MentorDirectory {
    pub fn new(roster: Vec<Mentor>) -> Self {
        let mut mentors = Vec::with_capacity(roster.len());
        let mut index = HashMap::with_capacity(roster.len());

        for mentor in roster {
            if index.contains_key(&mentor.id) {
                tracing::debug!("Ignoring duplicate mentor id in roster: {}", mentor.id);
                continue;
            }
            index.insert(mentor.id.clone(), mentors.len());
            mentors.push(mentor);
        }

        Self { mentors, index }
    }

    #[inline]
    pub fn contains(&self, mentor_id: &str) -> bool {
        self.index.contains_key(mentor_id)
    }

    pub fn get(&self, mentor_id: &str) -> Option<&Mentor> {
        self.index.get(mentor_id).map(|&i| &self.mentors[i])
    }

    /// Display name for a mentor, if the roster knows one
    pub fn name_of(&self, mentor_id: &str) -> Option<&str> {
        self.get(mentor_id).and_then(|m| m.name.as_deref())
    }

    /// Mentors in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Mentor> {
        self.mentors.iter()
    }

    pub fn len(&self) -> usize {
        self.mentors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentors.is_empty()
    }
}

impl From<Vec<Mentor>> for MentorDirectory {
    fn from(roster: Vec<Mentor>) -> Self {
        Self::new(roster)
    }
}

impl From<MentorDirectory> for Vec<Mentor> {
    fn from(directory: MentorDirectory) -> Self {
        directory.mentors
    }
}

impl FromIterator<Mentor> for MentorDirectory {
    fn from_iter<I: IntoIterator<Item = Mentor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let directory = MentorDirectory::new(vec![Mentor::new("m1"), Mentor::new("m2")]);

        assert!(directory.contains("m1"));
        assert!(!directory.contains("m9"));
        assert_eq!(directory.get("m2").map(|m| m.id.as_str()), Some("m2"));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let directory = MentorDirectory::new(vec![
            Mentor::with_capacity("m1", 1),
            Mentor::new("m2"),
            Mentor::with_capacity("m1", 7),
        ]);

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get("m1").map(|m| m.capacity), Some(1));
        let order: Vec<&str> = directory.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["m1", "m2"]);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let directory = MentorDirectory::new(vec![Mentor::new("m1")]);
        let json = serde_json::to_value(&directory).unwrap();
        assert!(json.is_array());

        let back: MentorDirectory = serde_json::from_value(json).unwrap();
        assert_eq!(back, directory);
    }
}
