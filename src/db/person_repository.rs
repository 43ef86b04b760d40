use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::db::models::{
    CreatePersonRequest, CreatedPerson, Media, Person, PersonBasic, PersonBasicInput,
    PersonWithWorks, Work, WorkInput, WorkWithMedia,
};
use crate::db::news_repository::placeholders;
use crate::error::AppError;
use crate::search::predicate::contains_pattern;

/// Repository trait for persons and their works and media.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn list_basic(&self) -> Result<Vec<PersonBasic>, AppError>;

    /// Persons whose full, first or last name contains `query`.
    async fn find_by_name(&self, query: &str) -> Result<Vec<PersonBasic>, AppError>;

    /// Every person with nested works and media.
    async fn list_with_works(&self) -> Result<Vec<PersonWithWorks>, AppError>;

    async fn find_with_works(&self, id: i64) -> Result<Option<PersonWithWorks>, AppError>;

    /// Insert (or reuse) the person, then a work and its media, atomically.
    async fn create(
        &self,
        request: &CreatePersonRequest,
        work_published: bool,
        created_by: &str,
    ) -> Result<CreatedPerson, AppError>;

    /// Returns `false` when no person has this id. Works and media cascade.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError>;

    /// Rewrite names and biography; a missing `featured` keeps the stored image.
    async fn update_basic(
        &self,
        id: i64,
        input: &PersonBasicInput,
    ) -> Result<Option<PersonBasic>, AppError>;

    async fn find_work(&self, id: i64) -> Result<Option<WorkWithMedia>, AppError>;

    async fn update_work(
        &self,
        id: i64,
        input: &WorkInput,
        is_published: bool,
    ) -> Result<Option<Work>, AppError>;

    /// Returns `false` when no work has this id. Media cascade.
    async fn delete_work(&self, id: i64) -> Result<bool, AppError>;

    async fn find_media(&self, id: i64) -> Result<Option<Media>, AppError>;

    async fn delete_media(&self, id: i64) -> Result<bool, AppError>;
}

const PERSON_COLUMNS: &str =
    "id, firstName, lastName, aboutPerson, featured, visibility, createdBy, created_at";
const BASIC_COLUMNS: &str = "id, firstName, lastName, featured, aboutPerson";
const WORK_COLUMNS: &str = "id, person_id, title, content, category, publishTime, \
    scheduledPublishTime, externalSource, visibility, isPublished, createdBy, created_at";
const MEDIA_COLUMNS: &str = "id, work_id, url, name, fileType, type";

/// Attach works to persons and media to works, keeping the input order of each.
pub fn nest(persons: Vec<Person>, works: Vec<Work>, media: Vec<Media>) -> Vec<PersonWithWorks> {
    let mut media_by_work: HashMap<i64, Vec<Media>> = HashMap::new();
    for item in media {
        media_by_work.entry(item.work_id).or_default().push(item);
    }

    let mut works_by_person: HashMap<i64, Vec<WorkWithMedia>> = HashMap::new();
    for work in works {
        let media = media_by_work.remove(&work.id).unwrap_or_default();
        works_by_person
            .entry(work.person_id)
            .or_default()
            .push(WorkWithMedia { work, media });
    }

    persons
        .into_iter()
        .map(|person| {
            let works = works_by_person.remove(&person.id).unwrap_or_default();
            PersonWithWorks { person, works }
        })
        .collect()
}

/// MySQL implementation of the PersonRepository.
pub struct MySqlPersonRepository {
    pool: MySqlPool,
}

impl MySqlPersonRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn delete_ids(&self, ids: &[i64]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!("DELETE FROM persons WHERE id IN ({})", placeholders(ids.len()));
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let result = query.execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PersonRepository for MySqlPersonRepository {
    async fn list_basic(&self) -> Result<Vec<PersonBasic>, AppError> {
        sqlx::query_as::<_, PersonBasic>(&format!(
            "SELECT {BASIC_COLUMNS} FROM persons ORDER BY lastName ASC, firstName ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_name(&self, query: &str) -> Result<Vec<PersonBasic>, AppError> {
        let pattern = contains_pattern(query);
        sqlx::query_as::<_, PersonBasic>(&format!(
            "SELECT {BASIC_COLUMNS} FROM persons \
             WHERE CONCAT(firstName, ' ', lastName) LIKE ? OR firstName LIKE ? OR lastName LIKE ? \
             ORDER BY lastName ASC, firstName ASC"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_with_works(&self) -> Result<Vec<PersonWithWorks>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;
        let works = sqlx::query_as::<_, Work>(&format!(
            "SELECT {WORK_COLUMNS} FROM works ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;
        let media = sqlx::query_as::<_, Media>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media ORDER BY id ASC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(nest(persons, works, media))
    }

    async fn find_with_works(&self, id: i64) -> Result<Option<PersonWithWorks>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let Some(person) = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        else {
            return Ok(None);
        };

        let works = sqlx::query_as::<_, Work>(&format!(
            "SELECT {WORK_COLUMNS} FROM works WHERE person_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;
        let media = sqlx::query_as::<_, Media>(&format!(
            "SELECT m.id, m.work_id, m.url, m.name, m.fileType, m.type FROM media m \
             JOIN works w ON m.work_id = w.id WHERE w.person_id = ? ORDER BY m.id ASC"
        ))
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(nest(vec![person], works, media).into_iter().next())
    }

    async fn create(
        &self,
        request: &CreatePersonRequest,
        work_published: bool,
        created_by: &str,
    ) -> Result<CreatedPerson, AppError> {
        let person = &request.person;
        let work = &request.work;
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = match person.id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT id FROM persons WHERE id = ? AND firstName = ? AND lastName = ?",
                )
                .bind(id)
                .bind(&person.first_name)
                .bind(&person.last_name)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => None,
        };

        let person_id = match existing {
            Some(id) => {
                if person.featured.is_some() {
                    sqlx::query("UPDATE persons SET featured = ? WHERE id = ?")
                        .bind(&person.featured)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
                id
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO persons (firstName, lastName, aboutPerson, featured, visibility, \
                     createdBy) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&person.first_name)
                .bind(&person.last_name)
                .bind(&person.about_person)
                .bind(&person.featured)
                .bind(&person.visibility)
                .bind(created_by)
                .execute(&mut *tx)
                .await?;
                result.last_insert_id() as i64
            }
        };

        let result = sqlx::query(
            "INSERT INTO works (person_id, title, content, category, publishTime, \
             scheduledPublishTime, externalSource, visibility, isPublished, createdBy) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(person_id)
        .bind(&work.title)
        .bind(&work.content)
        .bind(&work.category)
        .bind(&work.publish_time)
        .bind(work.scheduled_publish_time)
        .bind(&work.external_source)
        .bind(&work.visibility)
        .bind(work_published)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;
        let work_id = result.last_insert_id() as i64;

        for item in &request.media {
            sqlx::query(
                "INSERT INTO media (work_id, url, name, fileType, type) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(work_id)
            .bind(&item.url)
            .bind(&item.name)
            .bind(&item.file_type)
            .bind(&item.media_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(CreatedPerson { person_id, work_id })
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.delete_ids(&[id]).await? > 0)
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.delete_ids(ids).await
    }

    async fn update_basic(
        &self,
        id: i64,
        input: &PersonBasicInput,
    ) -> Result<Option<PersonBasic>, AppError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE persons SET firstName = ?, lastName = ?, aboutPerson = ?, \
             featured = COALESCE(?, featured) WHERE id = ?",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.about_person)
        .bind(&input.featured)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        sqlx::query_as::<_, PersonBasic>(&format!(
            "SELECT {BASIC_COLUMNS} FROM persons WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_work(&self, id: i64) -> Result<Option<WorkWithMedia>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let Some(work) = sqlx::query_as::<_, Work>(&format!(
            "SELECT {WORK_COLUMNS} FROM works WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        else {
            return Ok(None);
        };
        let media = sqlx::query_as::<_, Media>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE work_id = ? ORDER BY id ASC"
        ))
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(WorkWithMedia { work, media }))
    }

    async fn update_work(
        &self,
        id: i64,
        input: &WorkInput,
        is_published: bool,
    ) -> Result<Option<Work>, AppError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE works SET title = ?, content = ?, category = ?, publishTime = ?, \
             scheduledPublishTime = ?, externalSource = ?, visibility = ?, isPublished = ? \
             WHERE id = ?",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(&input.publish_time)
        .bind(input.scheduled_publish_time)
        .bind(&input.external_source)
        .bind(&input.visibility)
        .bind(is_published)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        sqlx::query_as::<_, Work>(&format!("SELECT {WORK_COLUMNS} FROM works WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_work(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM works WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_media(&self, id: i64) -> Result<Option<Media>, AppError> {
        sqlx::query_as::<_, Media>(&format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_media(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
