pub mod generate;
pub mod health;
pub mod options;
pub mod types;

pub use generate::{GenerateService, error_response, generate_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use options::options_routes;
