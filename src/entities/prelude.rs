pub use super::claims::Entity as Claims;
pub use super::items::Entity as Items;
pub use super::notifications::Entity as Notifications;
pub use super::users::Entity as Users;
