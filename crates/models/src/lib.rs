pub mod errors;
pub mod db;
pub mod validators;
pub mod user;
pub mod user_credentials;
pub mod token_blacklist;
pub mod product;
pub mod service_type;
pub mod service;
pub mod master;
pub mod master_service_type;
pub mod portfolio;
pub mod contact;
pub mod image_upload;
pub mod quote;
pub mod daily_quote;

#[cfg(test)]
mod tests;
