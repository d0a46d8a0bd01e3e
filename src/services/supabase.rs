use crate::core::MentorDirectory;
use crate::models::{domain::default_capacity, Mentee, Mentor};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading the roster from Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

const MENTEE_COLUMNS: &str =
    "id,submitted_at,first_name,last_name,email,first_choice,second_choice,third_choice";
const MENTOR_COLUMNS: &str = "id,full_name,email,program_of_study,year_of_study,capacity";
const MENTOR_MINIMAL_COLUMNS: &str = "id,full_name";

/// Table names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub mentee_preferences: String,
    pub mentor_profiles: String,
}

/// Mentee preference submission as stored by the registration form
#[derive(Debug, Clone, Deserialize)]
pub struct MenteePreferencesRow {
    pub id: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_choice: Option<String>,
    #[serde(default)]
    pub second_choice: Option<String>,
    #[serde(default)]
    pub third_choice: Option<String>,
}

impl From<MenteePreferencesRow> for Mentee {
    fn from(row: MenteePreferencesRow) -> Self {
        // Blank choices are dropped, the rest keep their rank order
        let ranked_choices = [row.first_choice, row.second_choice, row.third_choice]
            .into_iter()
            .flatten()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let name = [row.first_name, row.last_name]
            .into_iter()
            .flatten()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Mentee {
            id: row.id,
            name: (!name.is_empty()).then_some(name),
            ranked_choices,
        }
    }
}

/// Mentor profile row; every column but the id may be hidden by row level security
#[derive(Debug, Clone, Deserialize)]
pub struct MentorProfileRow {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub program_of_study: Option<String>,
    #[serde(default)]
    pub year_of_study: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl From<MentorProfileRow> for Mentor {
    fn from(row: MentorProfileRow) -> Self {
        Mentor {
            id: row.id,
            name: row.full_name,
            capacity: row.capacity.unwrap_or_else(default_capacity),
        }
    }
}

/// Supabase (PostgREST) client for the mentee and mentor roster
///
/// Reads only. Mentee order follows submission time, newest first, which is
/// the priority order the matcher will honour.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout_secs: u64,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str, columns: &str, order: Option<&str>) -> String {
        let mut url = format!(
            "{}/rest/v1/{}?select={}",
            self.base_url.trim_end_matches('/'),
            table,
            urlencoding::encode(columns)
        );
        if let Some(order) = order {
            url.push_str("&order=");
            url.push_str(&urlencoding::encode(order));
        }
        url
    }

    async fn get_rows<T>(&self, url: &str) -> Result<Vec<T>, SupabaseError>
    where
        T: for<'de> Deserialize<'de>,
    {
        tracing::debug!("Fetching rows from: {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(SupabaseError::ApiError(format!("{} - {}", status, body)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse rows: {}", e)))
    }

    /// Fetch all mentees, most recent submission first
    pub async fn fetch_mentees(&self) -> Result<Vec<Mentee>, SupabaseError> {
        let url = self.table_url(
            &self.tables.mentee_preferences,
            MENTEE_COLUMNS,
            Some("submitted_at.desc"),
        );
        let rows: Vec<MenteePreferencesRow> = self.get_rows(&url).await?;

        tracing::debug!("Fetched {} mentee submissions", rows.len());

        Ok(rows.into_iter().map(Mentee::from).collect())
    }

    /// Fetch the mentor roster
    ///
    /// Falls back to `id,full_name` when the full select is rejected, so
    /// matching still works if some profile columns are not readable.
    pub async fn fetch_mentors(&self) -> Result<Vec<Mentor>, SupabaseError> {
        let full_url = self.table_url(&self.tables.mentor_profiles, MENTOR_COLUMNS, None);

        let rows: Vec<MentorProfileRow> = match self.get_rows(&full_url).await {
            Ok(rows) => rows,
            Err(SupabaseError::ApiError(e)) => {
                tracing::warn!("Full mentor select rejected ({}), retrying with minimal columns", e);
                let minimal_url =
                    self.table_url(&self.tables.mentor_profiles, MENTOR_MINIMAL_COLUMNS, None);
                self.get_rows(&minimal_url).await?
            }
            Err(e) => return Err(e),
        };

        tracing::debug!("Fetched {} mentor profiles", rows.len());

        Ok(rows.into_iter().map(Mentor::from).collect())
    }

    /// Fetch mentees and mentors concurrently as one snapshot
    pub async fn fetch_snapshot(&self) -> Result<(Vec<Mentee>, MentorDirectory), SupabaseError> {
        let (mentees, mentors) = tokio::try_join!(self.fetch_mentees(), self.fetch_mentors())?;
        Ok((mentees, MentorDirectory::new(mentors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> SupabaseTables {
        SupabaseTables {
            mentee_preferences: "mentee_preferences".to_string(),
            mentor_profiles: "mentor_profiles".to_string(),
        }
    }

    fn client(base_url: String) -> SupabaseClient {
        SupabaseClient::new(base_url, "test_key".to_string(), tables(), 5).unwrap()
    }

    #[test]
    fn test_mentee_row_drops_blank_choices() {
        let row: MenteePreferencesRow = serde_json::from_value(serde_json::json!({
            "id": "mentee1",
            "first_name": "Sophia",
            "last_name": "Long",
            "first_choice": "2",
            "second_choice": "",
            "third_choice": "7"
        }))
        .unwrap();

        let mentee = Mentee::from(row);

        assert_eq!(mentee.ranked_choices, vec!["2".to_string(), "7".to_string()]);
        assert_eq!(mentee.name.as_deref(), Some("Sophia Long"));
    }

    #[test]
    fn test_mentor_row_without_capacity_uses_default() {
        let row: MentorProfileRow =
            serde_json::from_value(serde_json::json!({ "id": "m1", "full_name": "Sarah Chen" }))
                .unwrap();

        let mentor = Mentor::from(row);

        assert_eq!(mentor.capacity, 3);
        assert_eq!(mentor.name.as_deref(), Some("Sarah Chen"));
    }

    #[test]
    fn test_table_url_encodes_select() {
        let client = client("https://project.supabase.co/".to_string());
        let url = client.table_url("mentor_profiles", "id,full_name", Some("submitted_at.desc"));

        assert_eq!(
            url,
            "https://project.supabase.co/rest/v1/mentor_profiles?select=id%2Cfull_name&order=submitted_at.desc"
        );
    }

    #[tokio::test]
    async fn test_fetch_mentees_preserves_source_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/mentee_preferences")
            .match_query(mockito::Matcher::Any)
            .match_header("apikey", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"id":"b","first_choice":"m2","second_choice":null,"third_choice":"m1"},
                    {"id":"a","first_choice":"m1"}
                ]"#,
            )
            .create_async()
            .await;

        let mentees = client(server.url()).fetch_mentees().await.unwrap();

        mock.assert_async().await;
        let ids: Vec<&str> = mentees.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(mentees[0].ranked_choices, vec!["m2".to_string(), "m1".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_mentors_falls_back_to_minimal_select() {
        let mut server = mockito::Server::new_async().await;
        let _full = server
            .mock("GET", "/rest/v1/mentor_profiles")
            .match_query(mockito::Matcher::UrlEncoded(
                "select".into(),
                MENTOR_COLUMNS.into(),
            ))
            .with_status(401)
            .with_body(r#"{"message":"permission denied"}"#)
            .create_async()
            .await;
        let _minimal = server
            .mock("GET", "/rest/v1/mentor_profiles")
            .match_query(mockito::Matcher::UrlEncoded(
                "select".into(),
                MENTOR_MINIMAL_COLUMNS.into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"m1","full_name":"Sarah Chen"}]"#)
            .create_async()
            .await;

        let mentors = client(server.url()).fetch_mentors().await.unwrap();

        assert_eq!(mentors.len(), 1);
        assert_eq!(mentors[0].id, "m1");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/mentee_preferences")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let result = client(server.url()).fetch_mentees().await;

        assert!(matches!(result, Err(SupabaseError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/mentee_preferences")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"not":"a list"}"#)
            .create_async()
            .await;

        let result = client(server.url()).fetch_mentees().await;

        assert!(matches!(result, Err(SupabaseError::InvalidResponse(_))));
    }
}
