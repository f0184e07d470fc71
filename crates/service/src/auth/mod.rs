//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Password login, JWT access/refresh pairs with refresh rotation, and
//! bearer-token authentication for the management API.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod tokens;
pub mod repo;
pub mod maintenance;

pub use service::AuthService;
