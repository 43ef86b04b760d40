use std::sync::Arc;

use crate::auth::token::TokenKeys;
use crate::config::AppConfig;
use crate::db::news_repository::NewsRepository;
use crate::db::person_repository::PersonRepository;
use crate::db::settings_repository::SettingsRepository;
use crate::db::soon_repository::SoonRepository;
use crate::db::user_repository::UserRepository;
use crate::db::visitor_repository::VisitorRepository;
use crate::search::store::SearchStore;
use crate::storage::client::StorageClient;

/// Shared application state, cloned into every handler.
///
/// Every backend sits behind a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenKeys>,
    pub users: Arc<dyn UserRepository>,
    pub news: Arc<dyn NewsRepository>,
    pub soon: Arc<dyn SoonRepository>,
    pub persons: Arc<dyn PersonRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub visitors: Arc<dyn VisitorRepository>,
    pub search: Arc<dyn SearchStore>,
    pub storage: Arc<dyn StorageClient>,
}
