#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

use folio::app::build_router;
use folio::auth::models::{AuthenticatedUser, Role};
use folio::auth::password::hash_password;
use folio::auth::token::TokenKeys;
use folio::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, PublisherConfig, SearchConfig,
    ServerConfig, StorageConfig,
};
use folio::db::models::{
    Announcement, CreatePersonRequest, CreatedPerson, FooterCompany, FooterCompanyInput,
    HeaderConfig, HeaderUpdate, Media, NewUser, NewsInput, NewsItem, Person, PersonBasic,
    PersonBasicInput, PersonWithWorks, TextSettings, ThemeSettings, UserRecord, UserUpdate,
    Visitor, Work, WorkInput, WorkWithMedia,
};
use folio::db::news_repository::NewsRepository;
use folio::db::person_repository::{nest, PersonRepository};
use folio::db::settings_repository::SettingsRepository;
use folio::db::soon_repository::SoonRepository;
use folio::db::user_repository::UserRepository;
use folio::db::visitor_repository::VisitorRepository;
use folio::error::AppError;
use folio::models::search::SearchRow;
use folio::search::assemble::CompiledQuery;
use folio::search::predicate::BindValue;
use folio::search::store::{SearchConnection, SearchStore};
use folio::state::AppState;
use folio::storage::client::StorageClient;

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "mysql://unused".into(),
            max_connections: 4,
            acquire_timeout_secs: 1,
            run_migrations: false,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.into(),
            token_ttl_hours: 1,
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
        },
        storage: StorageConfig {
            bucket: "folio-test".into(),
            region: "us-east-1".into(),
            endpoint: None,
            public_base_url: "/api/v1/uploads".into(),
        },
        search: SearchConfig {
            default_limit: 10,
            max_limit: 100,
        },
        publisher: PublisherConfig { interval_secs: 60 },
        logging: LoggingConfig {
            filter: "folio=debug".into(),
        },
    }
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// Router wired to in-memory fakes of every backend.
///
/// The fakes are exposed so tests can seed data and inspect writes.
pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenKeys>,
    pub users: Arc<InMemoryUsers>,
    pub news: Arc<InMemoryNews>,
    pub soon: Arc<InMemorySoon>,
    pub persons: Arc<InMemoryPersons>,
    pub settings: Arc<InMemorySettings>,
    pub visitors: Arc<InMemoryVisitors>,
    pub search: Arc<FakeSearchStore>,
    pub storage: Arc<InMemoryStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_search(FakeSearchStore::default())
    }

    pub fn with_search(search: FakeSearchStore) -> Self {
        let config = test_config();
        let tokens = Arc::new(TokenKeys::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours,
        ));
        let users = Arc::new(InMemoryUsers::default());
        let news = Arc::new(InMemoryNews::default());
        let soon = Arc::new(InMemorySoon::default());
        let persons = Arc::new(InMemoryPersons::default());
        let settings = Arc::new(InMemorySettings::default());
        let visitors = Arc::new(InMemoryVisitors::default());
        let search = Arc::new(search);
        let storage = Arc::new(InMemoryStorage::default());

        let state = AppState {
            config: Arc::new(config),
            tokens: tokens.clone(),
            users: users.clone(),
            news: news.clone(),
            soon: soon.clone(),
            persons: persons.clone(),
            settings: settings.clone(),
            visitors: visitors.clone(),
            search: search.clone(),
            storage: storage.clone(),
        };

        Self {
            router: build_router(state),
            tokens,
            users,
            news,
            soon,
            persons,
            settings,
            visitors,
            search,
            storage,
        }
    }

    /// Build an `axum_test::TestServer` that expects 2xx responses.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Issue a token without going through login.
    pub fn token_for(&self, username: &str, role: Role) -> String {
        self.tokens
            .issue(&AuthenticatedUser {
                user_id: 1000,
                username: username.into(),
                role,
            })
            .expect("Failed to issue token")
    }

    /// Issue a token for a stored account.
    pub fn token_for_user(&self, user: &UserRecord) -> String {
        self.tokens
            .issue(&AuthenticatedUser {
                user_id: user.id,
                username: user.username.clone(),
                role: user.role,
            })
            .expect("Failed to issue token")
    }

    pub fn editor_token(&self) -> String {
        self.token_for("editor", Role::Editor)
    }

    pub fn admin_token(&self) -> String {
        self.token_for("admin", Role::Admin)
    }

    /// Store an account with a real password hash.
    pub async fn add_user(&self, username: &str, password: &str, role: Role) -> UserRecord {
        self.users
            .create(NewUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: hash_password(password).expect("hash"),
                role,
            })
            .await
            .expect("Failed to add user")
    }
}

fn news_from_input(
    id: i64,
    input: &NewsInput,
    is_published: bool,
    created_by: &str,
) -> NewsItem {
    NewsItem {
        id,
        category: input.category.clone(),
        title: input.title.clone(),
        content: input.content.clone(),
        publish_time: input.publish_time.clone(),
        scheduled_publish_time: input.scheduled_publish_time,
        external_source: input.external_source.clone(),
        visibility: input.visibility.clone(),
        is_published,
        featured: input.featured.clone(),
        created_by: Some(created_by.into()),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict("Username or email already exists".into()));
        }
        let record = UserRecord {
            id: rows.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, update: UserUpdate) -> Result<Option<UserRecord>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let taken = rows.iter().any(|u| {
            u.id != id
                && (update.username.as_ref() == Some(&u.username)
                    || update.email.as_ref() == Some(&u.email))
        });
        if taken {
            return Err(AppError::Conflict("Username or email already exists".into()));
        }
        let Some(row) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = update.username {
            row.username = username;
        }
        if let Some(email) = update.email {
            row.email = email;
        }
        if let Some(hash) = update.password_hash {
            row.password_hash = hash;
        }
        if let Some(role) = update.role {
            row.role = role;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.delete_many(&[id]).await? > 0)
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| !ids.contains(&u.id));
        Ok((before - rows.len()) as u64)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryNews {
    pub rows: Mutex<Vec<NewsItem>>,
}

impl InMemoryNews {
    pub fn insert(&self, item: NewsItem) {
        self.rows.lock().unwrap().push(item);
    }
}

#[async_trait]
impl NewsRepository for InMemoryNews {
    async fn list_all(&self) -> Result<Vec<NewsItem>, AppError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<NewsItem>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|n| n.id == id).cloned())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<NewsItem>, AppError> {
        let all = self.list_all().await?;
        Ok(all
            .into_iter()
            .filter(|n| n.category.as_deref() == Some(category))
            .collect())
    }

    async fn create(
        &self,
        input: &NewsInput,
        is_published: bool,
        created_by: &str,
    ) -> Result<NewsItem, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let item = news_from_input(id, input, is_published, created_by);
        rows.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: i64,
        input: &NewsInput,
        is_published: bool,
    ) -> Result<Option<NewsItem>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        let created_by = row.created_by.clone().unwrap_or_default();
        let created_at = row.created_at;
        *row = news_from_input(id, input, is_published, &created_by);
        row.created_at = created_at;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.delete_many(&[id]).await? > 0)
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|n| !ids.contains(&n.id));
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemorySoon {
    pub row: Mutex<Option<Announcement>>,
}

#[async_trait]
impl SoonRepository for InMemorySoon {
    async fn get(&self) -> Result<Option<Announcement>, AppError> {
        Ok(self.row.lock().unwrap().clone())
    }

    async fn upsert(
        &self,
        input: &NewsInput,
        is_published: bool,
        created_by: &str,
    ) -> Result<Announcement, AppError> {
        let mut row = self.row.lock().unwrap();
        let item = news_from_input(1, input, is_published, created_by);
        *row = Some(item.clone());
        Ok(item)
    }
}

#[derive(Default)]
pub struct InMemoryPersons {
    pub persons: Mutex<Vec<Person>>,
    pub works: Mutex<Vec<Work>>,
    pub media: Mutex<Vec<Media>>,
}

fn basic(person: &Person) -> PersonBasic {
    PersonBasic {
        id: person.id,
        first_name: person.first_name.clone(),
        last_name: person.last_name.clone(),
        featured: person.featured.clone(),
        about_person: person.about_person.clone(),
    }
}

impl InMemoryPersons {
    fn snapshot(&self) -> Vec<PersonWithWorks> {
        nest(
            self.persons.lock().unwrap().clone(),
            self.works.lock().unwrap().clone(),
            self.media.lock().unwrap().clone(),
        )
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersons {
    async fn list_basic(&self) -> Result<Vec<PersonBasic>, AppError> {
        Ok(self.persons.lock().unwrap().iter().map(basic).collect())
    }

    async fn find_by_name(&self, query: &str) -> Result<Vec<PersonBasic>, AppError> {
        let needle = query.to_lowercase();
        Ok(self
            .persons
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                format!("{} {}", p.first_name, p.last_name)
                    .to_lowercase()
                    .contains(&needle)
            })
            .map(basic)
            .collect())
    }

    async fn list_with_works(&self) -> Result<Vec<PersonWithWorks>, AppError> {
        Ok(self.snapshot())
    }

    async fn find_with_works(&self, id: i64) -> Result<Option<PersonWithWorks>, AppError> {
        Ok(self.snapshot().into_iter().find(|p| p.person.id == id))
    }

    async fn create(
        &self,
        request: &CreatePersonRequest,
        work_published: bool,
        created_by: &str,
    ) -> Result<CreatedPerson, AppError> {
        let mut persons = self.persons.lock().unwrap();
        let mut works = self.works.lock().unwrap();
        let mut media = self.media.lock().unwrap();
        let input = &request.person;

        let existing = input.id.and_then(|id| {
            persons.iter().position(|p| {
                p.id == id && p.first_name == input.first_name && p.last_name == input.last_name
            })
        });
        let person_id = match existing {
            Some(index) => {
                if input.featured.is_some() {
                    persons[index].featured = input.featured.clone();
                }
                persons[index].id
            }
            None => {
                let id = persons.iter().map(|p| p.id).max().unwrap_or(0) + 1;
                persons.push(Person {
                    id,
                    first_name: input.first_name.clone(),
                    last_name: input.last_name.clone(),
                    about_person: input.about_person.clone(),
                    featured: input.featured.clone(),
                    visibility: input.visibility.clone(),
                    created_by: Some(created_by.into()),
                    created_at: Utc::now(),
                });
                id
            }
        };

        let work_id = works.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let work = &request.work;
        works.push(Work {
            id: work_id,
            person_id,
            title: work.title.clone(),
            content: work.content.clone(),
            category: work.category.clone(),
            publish_time: work.publish_time.clone(),
            scheduled_publish_time: work.scheduled_publish_time,
            external_source: work.external_source.clone(),
            visibility: work.visibility.clone(),
            is_published: work_published,
            created_by: Some(created_by.into()),
            created_at: Utc::now(),
        });

        for item in &request.media {
            let id = media.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            media.push(Media {
                id,
                work_id,
                url: item.url.clone(),
                name: item.name.clone(),
                file_type: item.file_type.clone(),
                media_type: item.media_type.clone(),
            });
        }

        Ok(CreatedPerson { person_id, work_id })
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.delete_many(&[id]).await? > 0)
    }

    async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError> {
        let mut persons = self.persons.lock().unwrap();
        let mut works = self.works.lock().unwrap();
        let mut media = self.media.lock().unwrap();

        let before = persons.len();
        persons.retain(|p| !ids.contains(&p.id));
        let removed_works: Vec<i64> = works
            .iter()
            .filter(|w| ids.contains(&w.person_id))
            .map(|w| w.id)
            .collect();
        works.retain(|w| !ids.contains(&w.person_id));
        media.retain(|m| !removed_works.contains(&m.work_id));
        Ok((before - persons.len()) as u64)
    }

    async fn update_basic(
        &self,
        id: i64,
        input: &PersonBasicInput,
    ) -> Result<Option<PersonBasic>, AppError> {
        let mut persons = self.persons.lock().unwrap();
        let Some(person) = persons.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        person.first_name = input.first_name.clone();
        person.last_name = input.last_name.clone();
        person.about_person = input.about_person.clone();
        if input.featured.is_some() {
            person.featured = input.featured.clone();
        }
        Ok(Some(basic(person)))
    }

    async fn find_work(&self, id: i64) -> Result<Option<WorkWithMedia>, AppError> {
        let Some(work) = self.works.lock().unwrap().iter().find(|w| w.id == id).cloned() else {
            return Ok(None);
        };
        let media = self
            .media
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.work_id == id)
            .cloned()
            .collect();
        Ok(Some(WorkWithMedia { work, media }))
    }

    async fn update_work(
        &self,
        id: i64,
        input: &WorkInput,
        is_published: bool,
    ) -> Result<Option<Work>, AppError> {
        let mut works = self.works.lock().unwrap();
        let Some(work) = works.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        work.title = input.title.clone();
        work.content = input.content.clone();
        work.category = input.category.clone();
        work.publish_time = input.publish_time.clone();
        work.scheduled_publish_time = input.scheduled_publish_time;
        work.external_source = input.external_source.clone();
        work.visibility = input.visibility.clone();
        work.is_published = is_published;
        Ok(Some(work.clone()))
    }

    async fn delete_work(&self, id: i64) -> Result<bool, AppError> {
        let mut works = self.works.lock().unwrap();
        let before = works.len();
        works.retain(|w| w.id != id);
        self.media.lock().unwrap().retain(|m| m.work_id != id);
        Ok(works.len() < before)
    }

    async fn find_media(&self, id: i64) -> Result<Option<Media>, AppError> {
        Ok(self.media.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }

    async fn delete_media(&self, id: i64) -> Result<bool, AppError> {
        let mut media = self.media.lock().unwrap();
        let before = media.len();
        media.retain(|m| m.id != id);
        Ok(media.len() < before)
    }
}

#[derive(Default)]
pub struct InMemorySettings {
    pub theme: Mutex<Option<ThemeSettings>>,
    pub text: Mutex<Option<TextSettings>>,
    pub header: Mutex<Option<HeaderConfig>>,
    pub footer: Mutex<Vec<FooterCompany>>,
}

#[async_trait]
impl SettingsRepository for InMemorySettings {
    async fn get_theme(&self) -> Result<Option<ThemeSettings>, AppError> {
        Ok(self.theme.lock().unwrap().clone())
    }

    async fn set_theme(&self, theme: &ThemeSettings) -> Result<(), AppError> {
        *self.theme.lock().unwrap() = Some(theme.clone());
        Ok(())
    }

    async fn get_text(&self) -> Result<Option<TextSettings>, AppError> {
        Ok(self.text.lock().unwrap().clone())
    }

    async fn set_text(&self, text: &TextSettings) -> Result<(), AppError> {
        *self.text.lock().unwrap() = Some(text.clone());
        Ok(())
    }

    async fn get_header(&self) -> Result<Option<HeaderConfig>, AppError> {
        Ok(self.header.lock().unwrap().clone())
    }

    async fn set_header(&self, header: &HeaderUpdate) -> Result<HeaderConfig, AppError> {
        let mut stored = self.header.lock().unwrap();
        let logo_img_path = header
            .logo_img_path
            .clone()
            .or_else(|| stored.as_ref().and_then(|h| h.logo_img_path.clone()));
        let updated = HeaderConfig {
            routes: header.routes.clone(),
            buttons: header.buttons.clone(),
            logo_img_path,
        };
        *stored = Some(updated.clone());
        Ok(updated)
    }

    async fn list_footer(&self) -> Result<Vec<FooterCompany>, AppError> {
        Ok(self.footer.lock().unwrap().clone())
    }

    async fn upsert_footer(
        &self,
        companies: &[FooterCompanyInput],
    ) -> Result<Vec<FooterCompany>, AppError> {
        let mut footer = self.footer.lock().unwrap();
        for company in companies {
            match company.id.and_then(|id| footer.iter_mut().find(|f| f.id == id)) {
                Some(row) => {
                    row.company = company.company.clone();
                    row.description = company.description.clone();
                    row.url = company.url.clone();
                    if company.src.is_some() {
                        row.src = company.src.clone();
                    }
                }
                None => {
                    let id = footer.iter().map(|f| f.id).max().unwrap_or(0) + 1;
                    footer.push(FooterCompany {
                        id,
                        company: company.company.clone(),
                        description: company.description.clone(),
                        url: company.url.clone(),
                        src: company.src.clone(),
                    });
                }
            }
        }
        Ok(footer.clone())
    }
}

#[derive(Default)]
pub struct InMemoryVisitors {
    pub rows: Mutex<Vec<Visitor>>,
    pub total: Mutex<i64>,
}

#[async_trait]
impl VisitorRepository for InMemoryVisitors {
    async fn record(&self, ip_address: &str, system_info: Option<&str>) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        match rows.iter_mut().find(|v| v.ip_address == ip_address) {
            Some(visitor) => {
                visitor.count += 1;
                visitor.last_visit = now;
                if let Some(info) = system_info {
                    visitor.system_info = Some(info.to_string());
                }
            }
            None => {
                let id = rows.iter().map(|v| v.id).max().unwrap_or(0) + 1;
                rows.push(Visitor {
                    id,
                    ip_address: ip_address.to_string(),
                    system_info: system_info.map(str::to_string),
                    count: 1,
                    first_visit: now,
                    last_visit: now,
                });
            }
        }
        Ok(())
    }

    async fn increment_total(&self) -> Result<i64, AppError> {
        let mut total = self.total.lock().unwrap();
        *total += 1;
        Ok(*total)
    }

    async fn list(&self) -> Result<Vec<Visitor>, AppError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.last_visit.cmp(&a.last_visit).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|v| v.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryStorage {
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content, content_type.to_string()));
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(content, _)| content.clone()))
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Search store whose rows are the already-matched union, in order.
///
/// Counting returns the number of rows; fetching applies the trailing
/// `LIMIT ? OFFSET ?` binds. Every statement is recorded.
#[derive(Default)]
pub struct FakeSearchStore {
    pub rows: Vec<SearchRow>,
    pub fail_with: Option<String>,
    pub leased: Arc<AtomicUsize>,
    pub statements: Arc<Mutex<Vec<CompiledQuery>>>,
}

impl FakeSearchStore {
    pub fn with_rows(rows: Vec<SearchRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn leased(&self) -> usize {
        self.leased.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<CompiledQuery> {
        self.statements.lock().unwrap().clone()
    }
}

struct FakeConnection {
    rows: Vec<SearchRow>,
    fail_with: Option<String>,
    leased: Arc<AtomicUsize>,
    statements: Arc<Mutex<Vec<CompiledQuery>>>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.leased.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SearchStore for FakeSearchStore {
    async fn acquire(&self) -> Result<Box<dyn SearchConnection>, AppError> {
        self.leased.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            rows: self.rows.clone(),
            fail_with: self.fail_with.clone(),
            leased: self.leased.clone(),
            statements: self.statements.clone(),
        }))
    }
}

#[async_trait]
impl SearchConnection for FakeConnection {
    async fn count(&mut self, query: &CompiledQuery) -> Result<u64, AppError> {
        self.statements.lock().unwrap().push(query.clone());
        if let Some(message) = &self.fail_with {
            return Err(AppError::Database(message.clone()));
        }
        Ok(self.rows.len() as u64)
    }

    async fn fetch(&mut self, query: &CompiledQuery) -> Result<Vec<SearchRow>, AppError> {
        self.statements.lock().unwrap().push(query.clone());
        let (limit, offset) = match &query.binds[..] {
            [.., BindValue::Int(limit), BindValue::Int(offset)] => (*limit, *offset),
            _ => return Err(AppError::Internal("page query without LIMIT/OFFSET".into())),
        };
        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// A row of the unioned view with the fields most tests care about.
pub fn search_row(source_table: &str, id: i64, title: &str) -> SearchRow {
    SearchRow {
        source_table: source_table.into(),
        id,
        person_id: None,
        person_name: None,
        title: Some(title.into()),
        content: Some(format!("{title} content")),
        created_by: Some("editor".into()),
        created_at: Some(at(2024, 1, id as u32 % 28 + 1)),
        external_source: None,
        category: None,
        scheduled_publish_time: None,
    }
}
