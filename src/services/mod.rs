pub mod token;
pub use token::{TokenClaims, TokenError, TokenService};

pub mod uploads;
pub use uploads::{ImageStore, PendingImage};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthSession, Registration, UserProfile};
pub use auth_service_impl::SeaOrmAuthService;

pub mod notification_service;
pub mod notification_service_impl;
pub use notification_service::{
    NotificationDto, NotificationError, NotificationService, ReadTarget,
};
pub use notification_service_impl::SeaOrmNotificationService;

pub mod item_service;
pub mod item_service_impl;
pub use item_service::{ItemDto, ItemError, ItemService, ItemSubmission, UploadedFile};
pub use item_service_impl::SeaOrmItemService;

pub mod claim_service;
pub mod claim_service_impl;
pub use claim_service::{ClaimDto, ClaimError, ClaimService};
pub use claim_service_impl::SeaOrmClaimService;

pub mod dashboard_service;
pub mod dashboard_service_impl;
pub use dashboard_service::{AdminStats, DashboardError, DashboardService, MemberStats};
pub use dashboard_service_impl::SeaOrmDashboardService;
