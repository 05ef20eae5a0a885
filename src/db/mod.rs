use crate::config::SecurityConfig;
use crate::domain::item::ItemFilter;
use crate::entities::claims::ClaimStatus;
use crate::entities::items::ItemStatus;
use crate::entities::{claims, items, notifications};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::claim::{Approval, ClaimCounts, ClaimInsert};
pub use repositories::item::{ItemChanges, ItemCounts, NewItem};
pub use repositories::notification::NewNotification;
pub use repositories::user::{NewUser, User};

/// Current UTC time as an RFC 3339 string with millisecond precision, so
/// stored timestamps sort lexically.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn item_repo(&self) -> repositories::item::ItemRepository {
        repositories::item::ItemRepository::new(self.conn.clone())
    }

    fn claim_repo(&self) -> repositories::claim::ClaimRepository {
        repositories::claim::ClaimRepository::new(self.conn.clone())
    }

    fn notification_repo(&self) -> repositories::notification::NotificationRepository {
        repositories::notification::NotificationRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn create_user(&self, user: NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(user, security).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub async fn create_item(&self, item: NewItem) -> Result<items::Model> {
        self.item_repo().create(item).await
    }

    pub async fn get_item(&self, id: i32) -> Result<Option<items::Model>> {
        self.item_repo().get(id).await
    }

    pub async fn get_items_by_ids(&self, ids: &[i32]) -> Result<Vec<items::Model>> {
        self.item_repo().get_by_ids(ids).await
    }

    pub async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<items::Model>> {
        self.item_repo().list(filter).await
    }

    pub async fn list_items_by_poster(&self, user_id: i32) -> Result<Vec<items::Model>> {
        self.item_repo().list_by_poster(user_id).await
    }

    pub async fn recent_items(&self, limit: u64) -> Result<Vec<items::Model>> {
        self.item_repo().recent(limit).await
    }

    pub async fn recent_items_by_poster(
        &self,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<items::Model>> {
        self.item_repo().recent_by_poster(user_id, limit).await
    }

    pub async fn recent_available_items_from_others(
        &self,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<items::Model>> {
        self.item_repo()
            .recent_available_from_others(user_id, limit)
            .await
    }

    pub async fn update_item(&self, id: i32, changes: ItemChanges) -> Result<Option<items::Model>> {
        self.item_repo().update(id, changes).await
    }

    pub async fn set_item_status(
        &self,
        id: i32,
        status: ItemStatus,
    ) -> Result<Option<items::Model>> {
        self.item_repo().set_status(id, status).await
    }

    pub async fn mark_item_collected(
        &self,
        id: i32,
        collected_by: Option<i32>,
    ) -> Result<Option<items::Model>> {
        self.item_repo().mark_collected(id, collected_by).await
    }

    pub async fn delete_item(&self, id: i32) -> Result<Option<items::Model>> {
        self.item_repo().delete(id).await
    }

    pub async fn item_counts(&self) -> Result<ItemCounts> {
        self.item_repo().counts().await
    }

    pub async fn count_items_by_poster(&self, user_id: i32) -> Result<u64> {
        self.item_repo().count_by_poster(user_id).await
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    pub async fn create_claim(&self, item_id: i32, user_id: i32) -> Result<ClaimInsert> {
        self.claim_repo().create(item_id, user_id).await
    }

    pub async fn get_claim(&self, id: i32) -> Result<Option<claims::Model>> {
        self.claim_repo().get(id).await
    }

    pub async fn claim_exists(&self, item_id: i32, user_id: i32) -> Result<bool> {
        self.claim_repo().exists_for(item_id, user_id).await
    }

    pub async fn list_claims(&self) -> Result<Vec<claims::Model>> {
        self.claim_repo().list_all().await
    }

    pub async fn list_claims_for_user(&self, user_id: i32) -> Result<Vec<claims::Model>> {
        self.claim_repo().list_for_user(user_id).await
    }

    pub async fn recent_claims(&self, limit: u64) -> Result<Vec<claims::Model>> {
        self.claim_repo().recent(limit).await
    }

    pub async fn approve_claim(&self, claim_id: i32, comment: Option<String>) -> Result<Approval> {
        self.claim_repo().approve(claim_id, comment).await
    }

    pub async fn transition_claim(
        &self,
        claim_id: i32,
        from: ClaimStatus,
        to: ClaimStatus,
        comment: Option<String>,
        overwrite_comment: bool,
    ) -> Result<Option<claims::Model>> {
        self.claim_repo()
            .transition(claim_id, from, to, comment, overwrite_comment)
            .await
    }

    pub async fn claim_counts(&self) -> Result<ClaimCounts> {
        self.claim_repo().counts().await
    }

    pub async fn count_claims_for_user(
        &self,
        user_id: i32,
        status: Option<ClaimStatus>,
    ) -> Result<u64> {
        self.claim_repo().count_for_user(user_id, status).await
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<notifications::Model> {
        self.notification_repo().create(notification).await
    }

    pub async fn list_notifications(&self, user_id: i32) -> Result<Vec<notifications::Model>> {
        self.notification_repo().list_for_user(user_id).await
    }

    pub async fn mark_notification_read(&self, id: i32, user_id: i32) -> Result<bool> {
        self.notification_repo().mark_read(id, user_id).await
    }

    pub async fn mark_all_notifications_read(&self, user_id: i32) -> Result<u64> {
        self.notification_repo().mark_all_read(user_id).await
    }

    pub async fn delete_notification(&self, id: i32, user_id: i32) -> Result<bool> {
        self.notification_repo().delete(id, user_id).await
    }
}
