pub mod services;

pub use services::AuthService;
