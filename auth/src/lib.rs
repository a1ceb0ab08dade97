//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for services:
//! - Password hashing (Argon2id) behind the [`PasswordEncoder`] capability
//! - Opaque session tokens and an in-process session registry
//! - Ordered, path-based access policy evaluation
//!
//! Services define their own identity types and ports and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{Argon2PasswordEncoder, PasswordEncoder};
//!
//! let encoder = Argon2PasswordEncoder::new();
//! let hash = encoder.hash("my_password").unwrap();
//! let is_valid = encoder.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Sessions
//! ```
//! use auth::SessionRegistry;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let registry: SessionRegistry<String> = SessionRegistry::new();
//! let token = registry.create("alice".to_string()).await;
//! assert_eq!(registry.resolve(&token).await.as_deref(), Some("alice"));
//! assert!(registry.invalidate(&token).await);
//! assert!(!registry.invalidate(&token).await);
//! # });
//! ```
//!
//! ## Access Policy
//! ```
//! use auth::{AccessDecision, AccessPolicy, AccessRule, DenialReason, Requirement};
//!
//! let policy = AccessPolicy::new(vec![
//!     AccessRule::any("/users/{user}/**", Requirement::path_variable("user")).unwrap(),
//! ])
//! .unwrap();
//!
//! assert_eq!(
//!     policy.decide("GET", "/users/alice/profile", Some("bob")),
//!     AccessDecision::Denied(DenialReason::Forbidden)
//! );
//! ```

pub mod password;
pub mod policy;
pub mod session;

// Re-export commonly used items
pub use password::Argon2PasswordEncoder;
pub use password::PasswordEncoder;
pub use password::PasswordError;
pub use policy::AccessDecision;
pub use policy::AccessPolicy;
pub use policy::AccessRule;
pub use policy::DenialReason;
pub use policy::HttpMethod;
pub use policy::PathPattern;
pub use policy::PathVariables;
pub use policy::PolicyError;
pub use policy::Principal;
pub use policy::Requirement;
pub use session::SessionRegistry;
pub use session::SessionToken;
