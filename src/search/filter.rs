//! Search filter: wire shape and the validated form the builders consume.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::AppError;

/// Body of `POST /api/v1/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: RawSearchQuery,
}

/// Filter exactly as the client sent it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSearchQuery {
    pub sort: Option<String>,
    pub words: Option<OneOrMany>,
    pub phrase: Option<String>,
    pub any_words: Option<OneOrMany>,
    pub exclude_words: Option<OneOrMany>,
    pub include_external_sources: Option<bool>,
    pub categories: Option<OneOrMany>,
    pub created_start_date: Option<String>,
    pub created_end_date: Option<String>,
    pub publish_start_date: Option<String>,
    pub publish_end_date: Option<String>,
    pub page: Option<NumberOrText>,
    pub limit: Option<NumberOrText>,
}

/// A single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Integers arrive both as JSON numbers and as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

/// Global ordering of the unioned result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    DocumentAsc,
    #[default]
    DocumentDesc,
    ReleaseAsc,
    ReleaseDesc,
}

impl SortOrder {
    /// Unknown or missing values fall back to newest documents first.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("document_asc") => SortOrder::DocumentAsc,
            Some("document_desc") => SortOrder::DocumentDesc,
            Some("release_asc") => SortOrder::ReleaseAsc,
            Some("release_desc") => SortOrder::ReleaseDesc,
            _ => SortOrder::default(),
        }
    }

    /// `ORDER BY` key over the normalized columns.
    pub fn order_by(&self) -> &'static str {
        match self {
            SortOrder::DocumentAsc => "created_at ASC",
            SortOrder::DocumentDesc => "created_at DESC",
            SortOrder::ReleaseAsc => "scheduledPublishTime ASC",
            SortOrder::ReleaseDesc => "scheduledPublishTime DESC",
        }
    }
}

/// Upper end of a timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    Inclusive(NaiveDateTime),
    /// Used for date-only input: everything before the following midnight.
    Exclusive(NaiveDateTime),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<UpperBound>,
}

/// Validated filter. Terms are trimmed and never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub words: Vec<String>,
    pub phrase: Option<String>,
    pub any_words: Vec<String>,
    pub exclude_words: Vec<String>,
    pub include_external_sources: bool,
    pub categories: Vec<String>,
    pub created: DateRange,
    pub published: DateRange,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            phrase: None,
            any_words: Vec::new(),
            exclude_words: Vec::new(),
            include_external_sources: false,
            categories: Vec::new(),
            created: DateRange::default(),
            published: DateRange::default(),
            sort: SortOrder::default(),
            page: 1,
            limit: 10,
        }
    }
}

impl SearchFilter {
    /// Validate a raw query. Malformed paging or dates are rejected before any
    /// SQL is built.
    pub fn from_raw(raw: RawSearchQuery, limits: &SearchConfig) -> Result<Self, AppError> {
        let page = parse_positive("page", raw.page.as_ref())?.unwrap_or(1);
        let limit = parse_positive("limit", raw.limit.as_ref())?
            .unwrap_or(limits.default_limit)
            .min(limits.max_limit);

        let created = DateRange {
            start: parse_start("createdStartDate", raw.created_start_date.as_deref())?,
            end: parse_end("createdEndDate", raw.created_end_date.as_deref())?,
        };
        let published = DateRange {
            start: parse_start("publishStartDate", raw.publish_start_date.as_deref())?,
            end: parse_end("publishEndDate", raw.publish_end_date.as_deref())?,
        };

        Ok(Self {
            words: terms(raw.words, false),
            phrase: raw
                .phrase
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            any_words: terms(raw.any_words, false),
            exclude_words: terms(raw.exclude_words, true),
            include_external_sources: raw.include_external_sources.unwrap_or(false),
            categories: terms(raw.categories, false),
            created,
            published,
            sort: SortOrder::parse(raw.sort.as_deref()),
            page,
            limit,
        })
    }
}

/// Flatten a term list. A single string is one term unless `split_commas`.
fn terms(value: Option<OneOrMany>, split_commas: bool) -> Vec<String> {
    let raw = match value {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if split_commas => s.split(',').map(str::to_string).collect(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(list)) => list,
    };
    raw.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_positive(field: &str, value: Option<&NumberOrText>) -> Result<Option<u32>, AppError> {
    let invalid = || AppError::BadRequest(format!("{field} must be a positive integer"));

    let parsed = match value {
        None => return Ok(None),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => return Ok(None),
        Some(NumberOrText::Text(text)) => text.trim().parse::<u64>().map_err(|_| invalid())?,
        Some(NumberOrText::Number(number)) => number.as_u64().ok_or_else(invalid)?,
    };

    if parsed == 0 {
        return Err(invalid());
    }
    u32::try_from(parsed).map(Some).map_err(|_| invalid())
}

/// Years a MySQL `DATETIME` column can hold.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Parsed timestamp, remembering whether the input carried a time of day.
enum ParsedDate {
    Day(NaiveDate),
    Instant(NaiveDateTime),
}

impl ParsedDate {
    fn year(&self) -> i32 {
        match self {
            ParsedDate::Day(day) => day.year(),
            ParsedDate::Instant(instant) => instant.year(),
        }
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<ParsedDate>, AppError> {
    let Some(text) = value.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let parsed = if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        ParsedDate::Day(day)
    } else if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        ParsedDate::Instant(instant.naive_utc())
    } else {
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(ParsedDate::Instant)
            .ok_or_else(|| AppError::BadRequest(format!("{field} must be an ISO-8601 date")))?
    };

    if !SUPPORTED_YEARS.contains(&parsed.year()) {
        return Err(AppError::BadRequest(format!(
            "{field} must fall between the years {} and {}",
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )));
    }
    Ok(Some(parsed))
}

fn parse_start(field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>, AppError> {
    Ok(parse_date(field, value)?.map(|parsed| match parsed {
        ParsedDate::Day(day) => day.and_time(chrono::NaiveTime::MIN),
        ParsedDate::Instant(instant) => instant,
    }))
}

/// A date-only end bound covers the whole day: everything before the next
/// midnight, or up to the last representable instant of that day.
fn parse_end(field: &str, value: Option<&str>) -> Result<Option<UpperBound>, AppError> {
    Ok(parse_date(field, value)?.map(|parsed| match parsed {
        ParsedDate::Day(day) => day
            .and_time(chrono::NaiveTime::MIN)
            .checked_add_signed(Duration::days(1))
            .filter(|next| SUPPORTED_YEARS.contains(&next.year()))
            .map(UpperBound::Exclusive)
            .unwrap_or_else(|| UpperBound::Inclusive(end_of_day(day))),
        ParsedDate::Instant(instant) => UpperBound::Inclusive(instant),
    }))
}

fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN))
}
