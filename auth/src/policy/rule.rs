use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::errors::PolicyError;
use super::pattern::PathPattern;

/// HTTP methods a rule can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            "CONNECT" => Ok(HttpMethod::Connect),
            other => Err(PolicyError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller must satisfy once a rule has matched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Anyone, including anonymous callers.
    PermitAll,
    /// Any caller with a resolved identity.
    Authenticated,
    /// The caller's name must equal the named path variable.
    PathVariableEqualsIdentity { variable: String },
}

impl Requirement {
    pub fn path_variable(variable: impl Into<String>) -> Self {
        Requirement::PathVariableEqualsIdentity {
            variable: variable.into(),
        }
    }
}

/// One entry of an ordered access policy.
///
/// `method: None` matches any method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessRule {
    #[serde(default)]
    pub method: Option<HttpMethod>,
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl AccessRule {
    /// Rule restricted to a single method.
    pub fn new(
        method: HttpMethod,
        pattern: &str,
        requirement: Requirement,
    ) -> Result<Self, PolicyError> {
        Self::build(Some(method), pattern, requirement)
    }

    /// Rule applying to every method.
    pub fn any(pattern: &str, requirement: Requirement) -> Result<Self, PolicyError> {
        Self::build(None, pattern, requirement)
    }

    fn build(
        method: Option<HttpMethod>,
        pattern: &str,
        requirement: Requirement,
    ) -> Result<Self, PolicyError> {
        let rule = Self {
            method,
            pattern: PathPattern::parse(pattern)?,
            requirement,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check that an ownership requirement names a variable the pattern captures.
    ///
    /// Deserialized rules bypass the constructors, so policies re-run this on load.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match &self.requirement {
            Requirement::PathVariableEqualsIdentity { variable }
                if !self.pattern.captures(variable) =>
            {
                Err(PolicyError::UnknownVariable {
                    pattern: self.pattern.to_string(),
                    variable: variable.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn matches_method(&self, method: &str) -> bool {
        self.method.map_or(true, |m| m.as_str() == method)
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            Some(method) => write!(f, "{} {}", method, self.pattern),
            None => write!(f, "ANY {}", self.pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("DELETE".parse::<HttpMethod>(), Ok(HttpMethod::Delete));
        assert!(matches!(
            "BREW".parse::<HttpMethod>(),
            Err(PolicyError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_method_matching() {
        let get_only = AccessRule::new(HttpMethod::Get, "/a", Requirement::PermitAll).unwrap();
        assert!(get_only.matches_method("GET"));
        assert!(!get_only.matches_method("POST"));

        let any = AccessRule::any("/a", Requirement::PermitAll).unwrap();
        assert!(any.matches_method("POST"));
        assert!(any.matches_method("PROPFIND"));
    }

    #[test]
    fn test_ownership_rule_requires_captured_variable() {
        let result = AccessRule::any("/users/{user}/**", Requirement::path_variable("owner"));
        assert!(matches!(result, Err(PolicyError::UnknownVariable { .. })));

        assert!(AccessRule::any("/users/{user}/**", Requirement::path_variable("user")).is_ok());
    }

    #[test]
    fn test_deserialize_rule() {
        let rule: AccessRule = serde_json::from_str(
            r#"{
                "method": "GET",
                "pattern": "/users/exists",
                "requirement": { "kind": "permit_all" }
            }"#,
        )
        .unwrap();
        assert_eq!(rule.method, Some(HttpMethod::Get));
        assert_eq!(rule.requirement, Requirement::PermitAll);

        let rule: AccessRule = serde_json::from_str(
            r#"{
                "pattern": "/users/{user}/**",
                "requirement": { "kind": "path_variable_equals_identity", "variable": "user" }
            }"#,
        )
        .unwrap();
        assert_eq!(rule.method, None);
        assert_eq!(rule.requirement, Requirement::path_variable("user"));
    }

    #[test]
    fn test_display() {
        let rule = AccessRule::new(HttpMethod::Get, "/users/exists", Requirement::PermitAll).unwrap();
        assert_eq!(rule.to_string(), "GET /users/exists");

        let rule = AccessRule::any("/session", Requirement::Authenticated).unwrap();
        assert_eq!(rule.to_string(), "ANY /session");
    }
}
