use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::models::Role;

/// A news post. Also the shape of the single page announcement (`soon`).
///
/// JSON keys mirror the column names clients already rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i64,
    pub category: Option<String>,
    pub title: String,
    pub content: Option<String>,
    /// `"Now"` or `"Scheduled"`.
    pub publish_time: Option<String>,
    pub scheduled_publish_time: Option<DateTime<Utc>>,
    pub external_source: Option<String>,
    pub visibility: Option<String>,
    pub is_published: bool,
    /// URL of the featured image.
    pub featured: Option<String>,
    pub created_by: Option<String>,
    #[serde(rename = "created_at")]
    #[sqlx(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

/// The page announcement shares the news shape.
pub type Announcement = NewsItem;

/// Body of news create/update and announcement upsert requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsInput {
    pub category: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub publish_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub scheduled_publish_time: Option<DateTime<Utc>>,
    pub external_source: Option<String>,
    pub visibility: Option<String>,
    pub featured: Option<String>,
}

/// Body of the bulk delete routes.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteManyRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub about_person: Option<String>,
    /// URL of the featured image.
    pub featured: Option<String>,
    pub visibility: Option<String>,
    pub created_by: Option<String>,
    #[serde(rename = "created_at")]
    #[sqlx(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

/// Listing projection of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct PersonBasic {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub featured: Option<String>,
    pub about_person: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Work {
    pub id: i64,
    #[serde(rename = "person_id")]
    #[sqlx(rename = "person_id")]
    pub person_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub publish_time: Option<String>,
    pub scheduled_publish_time: Option<DateTime<Utc>>,
    pub external_source: Option<String>,
    pub visibility: Option<String>,
    pub is_published: bool,
    pub created_by: Option<String>,
    #[serde(rename = "created_at")]
    #[sqlx(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    #[serde(rename = "work_id")]
    #[sqlx(rename = "work_id")]
    pub work_id: i64,
    pub url: String,
    pub name: Option<String>,
    pub file_type: Option<String>,
    /// Upload field the file came from (`images`, `videos`, ...).
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkWithMedia {
    #[serde(flatten)]
    pub work: Work,
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonWithWorks {
    #[serde(flatten)]
    pub person: Person,
    pub works: Vec<WorkWithMedia>,
}

/// Person part of a create request. An `id` whose names match reuses the
/// existing row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub about_person: Option<String>,
    pub featured: Option<String>,
    pub visibility: Option<String>,
}

/// Body of `PUT /api/v1/persons/{id}`. A missing `featured` keeps the stored
/// image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonBasicInput {
    pub first_name: String,
    pub last_name: String,
    pub about_person: Option<String>,
    pub featured: Option<String>,
}

/// Work fields of a create request; also the body of `PUT /api/v1/works/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkInput {
    pub title: String,
    pub content: Option<String>,
    pub category: Option<String>,
    pub publish_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub scheduled_publish_time: Option<DateTime<Utc>>,
    pub external_source: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInput {
    pub url: String,
    pub name: Option<String>,
    pub file_type: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

/// Body of `POST /api/v1/persons`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePersonRequest {
    pub person: PersonInput,
    pub work: WorkInput,
    #[serde(default)]
    pub media: Vec<MediaInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPerson {
    pub person_id: i64,
    pub work_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub header_color: String,
    pub footer_color: String,
    pub header_text_color: String,
    pub footer_text_color: String,
}

/// Ticker text shown in the site header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct TextSettings {
    pub is_playing: bool,
    pub active: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    pub routes: serde_json::Value,
    pub buttons: serde_json::Value,
    pub logo_img_path: Option<String>,
}

/// Header update. A missing `logoImgPath` keeps the stored logo.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderUpdate {
    #[serde(default)]
    pub routes: serde_json::Value,
    #[serde(default)]
    pub buttons: serde_json::Value,
    pub logo_img_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FooterCompany {
    pub id: i64,
    pub company: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Logo URL.
    pub src: Option<String>,
}

/// Footer entry in an update. Entries with an `id` update that row, the rest
/// are inserted; a missing `src` keeps the stored logo.
#[derive(Debug, Clone, Deserialize)]
pub struct FooterCompanyInput {
    pub id: Option<i64>,
    pub company: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub src: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Visitor {
    pub id: i64,
    pub ip_address: String,
    pub system_info: Option<String>,
    pub count: i64,
    pub first_visit: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
}

/// Stored account, including the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Account as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            role: record.role,
        }
    }
}

/// A user about to be inserted; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Changes to an account. `None` fields are left as stored; the password is
/// already hashed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

/// Parse a client timestamp: RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]`
/// taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{text}'"))),
    }
}
