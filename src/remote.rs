//! Remote HTTP persistence.
//!
//! CRUD against a hosted `notes` table speaking a PostgREST-style API, rows
//! scoped by `user_id`. This is the live-application backend; the local
//! snapshot file is the offline alternative. The two are never reconciled.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::{Note, NoteError, PersistenceAdapter, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One row of the hosted `notes` table.
#[derive(Debug, Serialize, Deserialize)]
struct NoteRow {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            title: row.title,
            content: row.content,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Serialize)]
struct InsertRow<'a> {
    user_id: &'a str,
    title: &'a str,
    content: &'a str,
    tags: &'a [String],
}

#[derive(Serialize)]
struct UpdateRow<'a> {
    title: &'a str,
    content: &'a str,
    tags: &'a [String],
}

/// HTTP adapter for the hosted notes table.
#[derive(Debug)]
pub struct RemoteStore {
    client: reqwest::Client,
    notes_url: String,
}

impl RemoteStore {
    /// Creates a remote adapter for `base_url` (the REST root, without a
    /// trailing slash) authenticated by `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| NoteError::Validation {
            message: "API key contains invalid header characters".to_string(),
        })?;
        headers.insert("apikey", key);
        let bearer =
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
                NoteError::Validation {
                    message: "API key contains invalid header characters".to_string(),
                }
            })?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(NoteError::persistence)?;

        Ok(Self {
            client,
            notes_url: format!("{}/notes", base_url.trim_end_matches('/')),
        })
    }

    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(NoteError::Persistence {
            message: format!("backend returned {}: {}", status, body),
        })
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<NoteRow>> {
        Self::expect_ok(response)
            .await?
            .json::<Vec<NoteRow>>()
            .await
            .map_err(NoteError::persistence)
    }

    /// The backend answers writes with an array of affected rows; exactly
    /// one is expected here.
    fn single(mut rows: Vec<NoteRow>, id_hint: &str) -> Result<Note> {
        match rows.pop() {
            Some(row) if rows.is_empty() => Ok(row.into()),
            _ => Err(NoteError::NotFound {
                id: id_hint.to_string(),
            }),
        }
    }
}

#[async_trait]
impl PersistenceAdapter for RemoteStore {
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Note>> {
        debug!("Listing remote notes for owner {}", owner_id);
        let response = self
            .client
            .get(&self.notes_url)
            .query(&[
                ("user_id", format!("eq.{}", owner_id)),
                ("order", "updated_at.desc".to_string()),
            ])
            .send()
            .await
            .map_err(NoteError::persistence)?;

        let rows = Self::rows(response).await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn insert(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note> {
        let response = self
            .client
            .post(&self.notes_url)
            .header("Prefer", "return=representation")
            .json(&InsertRow {
                user_id: owner_id,
                title,
                content,
                tags,
            })
            .send()
            .await
            .map_err(NoteError::persistence)?;

        Self::single(Self::rows(response).await?, "<new>")
    }

    async fn update_by_id(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note> {
        let response = self
            .client
            .patch(&self.notes_url)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&UpdateRow {
                title,
                content,
                tags,
            })
            .send()
            .await
            .map_err(NoteError::persistence)?;

        Self::single(Self::rows(response).await?, id)
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(&self.notes_url)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(NoteError::persistence)?;

        Self::expect_ok(response).await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Note>> {
        let response = self
            .client
            .get(&self.notes_url)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(NoteError::persistence)?;

        let mut rows = Self::rows(response).await?;
        Ok(rows.pop().map(Note::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_row_maps_onto_note() {
        let row: NoteRow = serde_json::from_str(
            r#"{
                "id": "abc",
                "user_id": "u1",
                "title": "t",
                "content": "c",
                "tags": ["x"],
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-02T00:00:00Z"
            }"#,
        )
        .unwrap();
        let note = Note::from(row);
        assert_eq!(note.id, "abc");
        assert_eq!(note.tags, vec!["x"]);
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn missing_tags_default_to_empty() {
        let row: NoteRow = serde_json::from_str(
            r#"{
                "id": "abc",
                "title": "t",
                "content": "c",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(row.tags.is_empty());
    }

    #[test]
    fn single_requires_exactly_one_row() {
        assert!(matches!(
            RemoteStore::single(Vec::new(), "x"),
            Err(NoteError::NotFound { .. })
        ));
    }

    #[test]
    fn invalid_api_key_is_rejected_up_front() {
        let err = RemoteStore::new("https://api.example.com", "bad\nkey").unwrap_err();
        assert!(matches!(err, NoteError::Validation { .. }));
    }
}
