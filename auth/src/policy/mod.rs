pub mod engine;
pub mod errors;
pub mod pattern;
pub mod rule;

pub use engine::AccessDecision;
pub use engine::AccessPolicy;
pub use engine::DenialReason;
pub use engine::Principal;
pub use errors::PolicyError;
pub use pattern::PathPattern;
pub use pattern::PathVariables;
pub use rule::AccessRule;
pub use rule::HttpMethod;
pub use rule::Requirement;
