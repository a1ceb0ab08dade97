pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod seed;

// Re-export commonly used types
pub use domain::identity;
pub use domain::identity::models::Identity;
pub use domain::identity::service::GatewayService;
