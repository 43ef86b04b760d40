//! Source tables federated by the search endpoint.
//!
//! Each entry maps one physical table onto the normalized column set shared by
//! every branch of the union. Columns a table does not have are `None` and
//! project as `NULL`; filters on them match nothing for that table.

/// Column expressions and join clause of one searchable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTable {
    /// Discriminator written into `source_table`.
    pub tag: &'static str,
    /// `FROM` clause, including any join.
    pub from: &'static str,
    pub id: &'static str,
    pub person_id: Option<&'static str>,
    pub person_name: Option<&'static str>,
    pub title: &'static str,
    pub content: &'static str,
    pub created_by: &'static str,
    pub created_at: &'static str,
    pub external_source: Option<&'static str>,
    pub category: Option<&'static str>,
    pub scheduled_publish_time: Option<&'static str>,
    /// Columns matched by `words`, `phrase`, `anyWords` and `excludeWords`.
    pub text_fields: [&'static str; 2],
}

const PERSON_FULL_NAME: &str = "CONCAT(persons.firstName, ' ', persons.lastName)";

pub const NEWS: SourceTable = SourceTable {
    tag: "news",
    from: "news",
    id: "news.id",
    person_id: None,
    person_name: None,
    title: "news.title",
    content: "news.content",
    created_by: "news.createdBy",
    created_at: "news.created_at",
    external_source: Some("news.externalSource"),
    category: Some("news.category"),
    scheduled_publish_time: Some("news.scheduledPublishTime"),
    text_fields: ["news.title", "news.content"],
};

pub const WORKS: SourceTable = SourceTable {
    tag: "works",
    from: "works JOIN persons ON works.person_id = persons.id",
    id: "works.id",
    person_id: Some("works.person_id"),
    person_name: Some(PERSON_FULL_NAME),
    title: "works.title",
    content: "works.content",
    created_by: "works.createdBy",
    created_at: "works.created_at",
    external_source: Some("works.externalSource"),
    category: Some("works.category"),
    scheduled_publish_time: Some("works.scheduledPublishTime"),
    text_fields: ["works.title", "works.content"],
};

pub const PERSONS: SourceTable = SourceTable {
    tag: "persons",
    from: "persons",
    id: "persons.id",
    person_id: Some("persons.id"),
    person_name: Some(PERSON_FULL_NAME),
    title: PERSON_FULL_NAME,
    content: "persons.aboutPerson",
    created_by: "persons.createdBy",
    created_at: "persons.created_at",
    external_source: None,
    category: None,
    scheduled_publish_time: None,
    text_fields: ["persons.firstName", "persons.lastName"],
};

pub const SOON: SourceTable = SourceTable {
    tag: "soon",
    from: "soon",
    id: "soon.id",
    person_id: None,
    person_name: None,
    title: "soon.title",
    content: "soon.content",
    created_by: "soon.createdBy",
    created_at: "soon.created_at",
    external_source: Some("soon.externalSource"),
    category: Some("soon.category"),
    scheduled_publish_time: Some("soon.scheduledPublishTime"),
    text_fields: ["soon.title", "soon.content"],
};

/// Tables in union order.
pub const SOURCE_TABLES: [SourceTable; 4] = [NEWS, WORKS, PERSONS, SOON];

/// Normalized column names, in projection order.
pub const NORMALIZED_COLUMNS: [&str; 11] = [
    "source_table",
    "id",
    "person_id",
    "person_name",
    "title",
    "content",
    "createdBy",
    "created_at",
    "externalSource",
    "category",
    "scheduledPublishTime",
];

impl SourceTable {
    /// Projection expressions aligned with [`NORMALIZED_COLUMNS`].
    ///
    /// The discriminator is a fixed identifier from this module, never user
    /// input, so it is emitted as a literal.
    pub fn projection(&self) -> Vec<String> {
        let tag = format!("'{}'", self.tag);
        let expressions = [
            Some(tag.as_str()),
            Some(self.id),
            self.person_id,
            self.person_name,
            Some(self.title),
            Some(self.content),
            Some(self.created_by),
            Some(self.created_at),
            self.external_source,
            self.category,
            self.scheduled_publish_time,
        ];

        expressions
            .iter()
            .zip(NORMALIZED_COLUMNS)
            .map(|(expr, alias)| format!("{} AS {}", expr.unwrap_or("NULL"), alias))
            .collect()
    }
}
