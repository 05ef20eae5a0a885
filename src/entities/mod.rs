pub mod prelude;

pub mod claims;
pub mod items;
pub mod notifications;
pub mod users;
