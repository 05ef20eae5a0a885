pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Public URL prefix the uploads directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

pub const AUTO_REJECT_COMMENT: &str = "Item was claimed by another user";

pub mod limits {

    pub const NAME_MIN_LEN: usize = 2;

    pub const NAME_MAX_LEN: usize = 50;

    pub const PASSWORD_MIN_LEN: usize = 6;

    pub const PHONE_DIGITS: usize = 10;

    pub const TITLE_MAX_LEN: usize = 100;

    pub const DESCRIPTION_MAX_LEN: usize = 500;

    pub const ADMIN_RECENT_ACTIVITY: u64 = 5;

    pub const USER_RECENT_ITEMS: u64 = 3;
}

pub mod seed {

    pub const ADMIN_NAME: &str = "Admin User";

    pub const ADMIN_EMAIL: &str = "admin@gym.com";

    pub const ADMIN_PASSWORD: &str = "admin123";

    pub const ADMIN_PHONE: &str = "1234567890";

    pub const ADMIN_MEMBERSHIP: &str = "Staff";

    pub const MEMBER_NAME: &str = "Test User";

    pub const MEMBER_EMAIL: &str = "user@gym.com";

    pub const MEMBER_PASSWORD: &str = "user123";

    pub const MEMBER_PHONE: &str = "9876543210";

    pub const MEMBER_MEMBERSHIP: &str = "Premium";
}
