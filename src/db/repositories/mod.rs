pub mod claim;
pub mod item;
pub mod notification;
pub mod user;
