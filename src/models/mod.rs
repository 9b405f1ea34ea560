//! Data models for Bookshelf

pub mod book;
pub mod user;
pub mod volume;

// Re-export commonly used types
pub use book::{Book, CheckoutOutcome, NewBook};
pub use user::{Role, User, UserSummary};
pub use volume::{CatalogEntry, Volume, VolumesPage};
