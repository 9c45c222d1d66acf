//! Storefront-only models.

pub mod session;

pub use session::{Notice, NoticeLevel, keys as session_keys};
