pub mod analytics;
pub mod auth;
pub mod logistics;
pub mod report;
pub mod sales;
pub mod technology;
