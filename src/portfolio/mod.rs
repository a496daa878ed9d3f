pub mod services;
pub mod types;

pub use services::PortfolioService;
