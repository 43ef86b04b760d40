use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::db::models::{
    FooterCompany, FooterCompanyInput, HeaderConfig, HeaderUpdate, TextSettings, ThemeSettings,
};
use crate::error::AppError;

/// Repository trait for site-wide settings: theme, ticker text, header and
/// footer. Theme, text and header are single rows with id 1.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_theme(&self) -> Result<Option<ThemeSettings>, AppError>;

    async fn set_theme(&self, theme: &ThemeSettings) -> Result<(), AppError>;

    async fn get_text(&self) -> Result<Option<TextSettings>, AppError>;

    async fn set_text(&self, text: &TextSettings) -> Result<(), AppError>;

    async fn get_header(&self) -> Result<Option<HeaderConfig>, AppError>;

    /// Store the header; a `None` logo keeps the stored one.
    async fn set_header(&self, header: &HeaderUpdate) -> Result<HeaderConfig, AppError>;

    async fn list_footer(&self) -> Result<Vec<FooterCompany>, AppError>;

    /// Update entries with an id and insert the rest, in one transaction.
    async fn upsert_footer(
        &self,
        companies: &[FooterCompanyInput],
    ) -> Result<Vec<FooterCompany>, AppError>;
}

/// MySQL implementation of the SettingsRepository.
pub struct MySqlSettingsRepository {
    pool: MySqlPool,
}

impl MySqlSettingsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Header columns hold JSON text; anything unparsable is returned verbatim.
fn json_column(raw: String) -> serde_json::Value {
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

#[async_trait]
impl SettingsRepository for MySqlSettingsRepository {
    async fn get_theme(&self) -> Result<Option<ThemeSettings>, AppError> {
        sqlx::query_as::<_, ThemeSettings>(
            "SELECT headerColor, footerColor, headerTextColor, footerTextColor \
             FROM theme_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_theme(&self, theme: &ThemeSettings) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO theme_settings (id, headerColor, footerColor, headerTextColor, \
             footerTextColor) VALUES (1, ?, ?, ?, ?) ON DUPLICATE KEY UPDATE \
             headerColor = VALUES(headerColor), footerColor = VALUES(footerColor), \
             headerTextColor = VALUES(headerTextColor), footerTextColor = VALUES(footerTextColor)",
        )
        .bind(&theme.header_color)
        .bind(&theme.footer_color)
        .bind(&theme.header_text_color)
        .bind(&theme.footer_text_color)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_text(&self) -> Result<Option<TextSettings>, AppError> {
        sqlx::query_as::<_, TextSettings>(
            "SELECT isPlaying, active, text FROM text_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_text(&self, text: &TextSettings) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO text_settings (id, isPlaying, active, text) VALUES (1, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE isPlaying = VALUES(isPlaying), active = VALUES(active), \
             text = VALUES(text)",
        )
        .bind(text.is_playing)
        .bind(text.active)
        .bind(&text.text)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_header(&self) -> Result<Option<HeaderConfig>, AppError> {
        let row: Option<(String, String, Option<String>)> = sqlx::query_as(
            "SELECT routes, buttons, logo_img_path FROM header_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|(routes, buttons, logo_img_path)| HeaderConfig {
            routes: json_column(routes),
            buttons: json_column(buttons),
            logo_img_path,
        }))
    }

    async fn set_header(&self, header: &HeaderUpdate) -> Result<HeaderConfig, AppError> {
        sqlx::query(
            "INSERT INTO header_config (id, routes, buttons, logo_img_path) VALUES (1, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE routes = VALUES(routes), buttons = VALUES(buttons), \
             logo_img_path = COALESCE(VALUES(logo_img_path), logo_img_path)",
        )
        .bind(header.routes.to_string())
        .bind(header.buttons.to_string())
        .bind(&header.logo_img_path)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.get_header()
            .await?
            .ok_or_else(|| AppError::Database("header row missing after upsert".into()))
    }

    async fn list_footer(&self) -> Result<Vec<FooterCompany>, AppError> {
        sqlx::query_as::<_, FooterCompany>(
            "SELECT id, company, description, url, src FROM footer_companies ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_footer(
        &self,
        companies: &[FooterCompanyInput],
    ) -> Result<Vec<FooterCompany>, AppError> {
        let mut tx = self.pool.begin().await?;

        for company in companies {
            match company.id {
                Some(id) => {
                    sqlx::query(
                        "UPDATE footer_companies SET company = ?, description = ?, url = ?, \
                         src = COALESCE(?, src) WHERE id = ?",
                    )
                    .bind(&company.company)
                    .bind(&company.description)
                    .bind(&company.url)
                    .bind(&company.src)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO footer_companies (company, description, url, src) \
                         VALUES (?, ?, ?, ?)",
                    )
                    .bind(&company.company)
                    .bind(&company.description)
                    .bind(&company.url)
                    .bind(&company.src)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        self.list_footer().await
    }
}
