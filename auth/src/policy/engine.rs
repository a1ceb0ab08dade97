use super::errors::PolicyError;
use super::pattern::PathVariables;
use super::rule::AccessRule;
use super::rule::Requirement;

/// Anything that can be named as the caller of a request.
pub trait Principal {
    fn name(&self) -> &str;
}

impl Principal for str {
    fn name(&self) -> &str {
        self
    }
}

impl Principal for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No caller identity where one is required.
    Unauthenticated,
    /// Caller is known but not entitled to the resource.
    Forbidden,
}

/// Outcome of evaluating a request against an [`AccessPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenialReason),
}

/// Ordered access policy.
///
/// The first rule whose method and pattern match decides; pattern specificity
/// plays no part. Requests no rule matches fall back to `Authenticated`.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    /// Build a policy from rules in evaluation order.
    ///
    /// # Errors
    /// * `UnknownVariable` - An ownership rule names a variable its pattern does not capture
    pub fn new(rules: Vec<AccessRule>) -> Result<Self, PolicyError> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Find the rule that governs a request, with the variables its pattern captured.
    pub fn matching_rule(&self, method: &str, path: &str) -> Option<(&AccessRule, PathVariables)> {
        self.rules.iter().find_map(|rule| {
            if !rule.matches_method(method) {
                return None;
            }
            rule.pattern.matches(path).map(|variables| (rule, variables))
        })
    }

    /// Decide whether `caller` may perform `method` on `path`.
    pub fn decide<P>(&self, method: &str, path: &str, caller: Option<&P>) -> AccessDecision
    where
        P: Principal + ?Sized,
    {
        match self.matching_rule(method, path) {
            Some((rule, variables)) => {
                tracing::trace!(%method, %path, rule = %rule, "Access rule matched");
                Self::apply(&rule.requirement, &variables, caller)
            }
            None => {
                tracing::trace!(%method, %path, "No access rule matched, using fallback");
                Self::apply(&Requirement::Authenticated, &PathVariables::default(), caller)
            }
        }
    }

    fn apply<P>(
        requirement: &Requirement,
        variables: &PathVariables,
        caller: Option<&P>,
    ) -> AccessDecision
    where
        P: Principal + ?Sized,
    {
        match (requirement, caller) {
            (Requirement::PermitAll, _) => AccessDecision::Granted,
            (_, None) => AccessDecision::Denied(DenialReason::Unauthenticated),
            (Requirement::Authenticated, Some(_)) => AccessDecision::Granted,
            (Requirement::PathVariableEqualsIdentity { variable }, Some(caller)) => {
                if variables.get(variable) == Some(caller.name()) {
                    AccessDecision::Granted
                } else {
                    AccessDecision::Denied(DenialReason::Forbidden)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::rule::HttpMethod;

    const ANONYMOUS: Option<&str> = None;

    fn ownership_policy() -> AccessPolicy {
        AccessPolicy::new(vec![AccessRule::any(
            "/users/{user}/**",
            Requirement::path_variable("user"),
        )
        .unwrap()])
        .unwrap()
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let permissive = AccessPolicy::new(vec![
            AccessRule::any("/a", Requirement::PermitAll).unwrap(),
            AccessRule::any("/a", Requirement::Authenticated).unwrap(),
        ])
        .unwrap();
        assert_eq!(permissive.decide("GET", "/a", ANONYMOUS), AccessDecision::Granted);

        let strict = AccessPolicy::new(vec![
            AccessRule::any("/a", Requirement::Authenticated).unwrap(),
            AccessRule::any("/a", Requirement::PermitAll).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            strict.decide("GET", "/a", ANONYMOUS),
            AccessDecision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn test_specificity_is_ignored() {
        let policy = AccessPolicy::new(vec![
            AccessRule::any("/**", Requirement::Authenticated).unwrap(),
            AccessRule::new(HttpMethod::Get, "/users/exists", Requirement::PermitAll).unwrap(),
        ])
        .unwrap();

        assert_eq!(
            policy.decide("GET", "/users/exists", ANONYMOUS),
            AccessDecision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn test_method_restricted_rule() {
        let policy = AccessPolicy::new(vec![AccessRule::new(
            HttpMethod::Get,
            "/users/exists",
            Requirement::PermitAll,
        )
        .unwrap()])
        .unwrap();

        assert_eq!(
            policy.decide("GET", "/users/exists", ANONYMOUS),
            AccessDecision::Granted
        );
        assert_eq!(
            policy.decide("POST", "/users/exists", ANONYMOUS),
            AccessDecision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn test_ownership_rule() {
        let policy = ownership_policy();

        assert_eq!(
            policy.decide("GET", "/users/alice/profile", Some("alice")),
            AccessDecision::Granted
        );
        assert_eq!(
            policy.decide("GET", "/users/bob/profile", Some("alice")),
            AccessDecision::Denied(DenialReason::Forbidden)
        );
        assert_eq!(
            policy.decide("GET", "/users/alice/profile", ANONYMOUS),
            AccessDecision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn test_ownership_rule_is_case_sensitive() {
        let policy = ownership_policy();
        assert_eq!(
            policy.decide("DELETE", "/users/Alice", Some("alice")),
            AccessDecision::Denied(DenialReason::Forbidden)
        );
    }

    #[test]
    fn test_default_requires_authentication() {
        let policy = AccessPolicy::new(Vec::new()).unwrap();

        assert_eq!(
            policy.decide("GET", "/reports/quarterly", ANONYMOUS),
            AccessDecision::Denied(DenialReason::Unauthenticated)
        );
        assert_eq!(
            policy.decide("GET", "/reports/quarterly", Some("alice")),
            AccessDecision::Granted
        );
    }

    #[test]
    fn test_string_principal() {
        let policy = ownership_policy();
        let caller = "alice".to_string();
        assert_eq!(
            policy.decide("GET", "/users/alice", Some(&caller)),
            AccessDecision::Granted
        );
    }

    #[test]
    fn test_matching_rule_exposes_variables() {
        let policy = ownership_policy();
        let (rule, variables) = policy
            .matching_rule("PUT", "/users/carol/settings")
            .expect("rule should match");

        assert_eq!(rule.pattern.as_str(), "/users/{user}/**");
        assert_eq!(variables.get("user"), Some("carol"));
        assert!(policy.matching_rule("PUT", "/session").is_none());
    }

    #[test]
    fn test_new_rejects_invalid_deserialized_rule() {
        let rule: AccessRule = serde_json::from_str(
            r#"{
                "pattern": "/users/{user}",
                "requirement": { "kind": "path_variable_equals_identity", "variable": "owner" }
            }"#,
        )
        .unwrap();

        assert!(matches!(
            AccessPolicy::new(vec![rule]),
            Err(PolicyError::UnknownVariable { .. })
        ));
    }
}
