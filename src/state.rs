use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::generate_secret;
use crate::services::{
    AuthService, ClaimService, DashboardService, ImageStore, ItemService, NotificationService,
    SeaOrmAuthService, SeaOrmClaimService, SeaOrmDashboardService, SeaOrmItemService,
    SeaOrmNotificationService, TokenService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub images: ImageStore,

    pub auth_service: Arc<dyn AuthService>,

    pub item_service: Arc<dyn ItemService>,

    pub claim_service: Arc<dyn ClaimService>,

    pub notification_service: Arc<dyn NotificationService>,

    pub dashboard_service: Arc<dyn DashboardService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store).await
    }

    pub async fn with_store(mut config: Config, store: Store) -> anyhow::Result<Self> {
        if config.security.jwt_secret.is_empty() {
            warn!("No JWT secret configured; generated an ephemeral one, tokens will not survive a restart");
            config.security.jwt_secret = generate_secret();
        }

        let images = ImageStore::new(&config.storage.uploads_path);
        images.ensure_dir().await?;

        let tokens = Arc::new(TokenService::new(
            &config.security.jwt_secret,
            config.security.jwt_expiry_days,
        ));

        let notification_service =
            Arc::new(SeaOrmNotificationService::new(store.clone())) as Arc<dyn NotificationService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let item_service = Arc::new(SeaOrmItemService::new(
            store.clone(),
            images.clone(),
            notification_service.clone(),
        )) as Arc<dyn ItemService>;

        let claim_service = Arc::new(SeaOrmClaimService::new(
            store.clone(),
            notification_service.clone(),
        )) as Arc<dyn ClaimService>;

        let dashboard_service =
            Arc::new(SeaOrmDashboardService::new(store.clone())) as Arc<dyn DashboardService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            images,
            auth_service,
            item_service,
            claim_service,
            notification_service,
            dashboard_service,
        })
    }
}
