//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{is_negative, to_money_2dp};
pub use pagination::{PageRequest, PageResponse};
