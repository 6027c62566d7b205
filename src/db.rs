pub mod user_repo;
pub use user_repo::UserRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod technician_repo;
pub use technician_repo::{Removal, TechnicianRepository};
pub mod logistics_repo;
pub use logistics_repo::LogisticsRepository;
pub mod technology_repo;

pub use technology_repo::TechnologyRepository;
