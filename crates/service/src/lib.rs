//! Service layer providing the salon's business operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod pagination;
pub mod listing;
pub mod slug;
pub mod catalog;
pub mod images;
pub mod quotes;
#[cfg(test)]
pub mod test_support;
