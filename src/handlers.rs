pub mod auth;
pub mod logistics;
pub mod reports;
pub mod sales;
pub mod technicians;
pub mod technology;
