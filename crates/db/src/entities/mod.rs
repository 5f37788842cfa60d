//! Database entities.

#![allow(missing_docs)]

pub mod initiative;
pub mod party;
pub mod politician;
pub mod promise;
pub mod rating;
pub mod user;

pub use initiative::Entity as Initiative;
pub use party::Entity as Party;
pub use politician::Entity as Politician;
pub use promise::Entity as Promise;
pub use rating::Entity as Rating;
pub use user::Entity as User;
