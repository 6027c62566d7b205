pub mod aggregation;
pub mod analytics_service;
pub mod auth;
pub mod commission;
pub mod document_service;
pub mod logistics_service;
pub mod logistics_stats;
pub mod report_service;
pub mod sales_service;
pub mod technician_service;
pub mod technology_service;
