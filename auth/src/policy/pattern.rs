use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::Deserialize;

use super::errors::PolicyError;

/// Request path pattern.
///
/// Supported segment forms:
/// - literal text, matched exactly
/// - `{name}`, captures one non-empty segment as a path variable
/// - `*`, matches one non-empty segment without capturing
/// - `**`, matches zero or more remaining segments; only valid last
///
/// A single trailing `/` on the request path is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
    Wildcard,
    CatchAll,
}

/// Variables captured by a matching [`PathPattern`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariables(BTreeMap<String, String>);

impl PathVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl PathPattern {
    /// Parse a pattern such as `/users/{user}/**`.
    ///
    /// # Errors
    /// * `MissingLeadingSlash` - Pattern does not start with `/`
    /// * `EmptySegment` - Pattern contains `//`
    /// * `InvalidSegment` - Braces that do not wrap a whole segment, or an invalid variable name
    /// * `MisplacedCatchAll` - `**` used before the last segment
    /// * `DuplicateVariable` - Same variable captured twice
    pub fn parse(pattern: &str) -> Result<Self, PolicyError> {
        let body = pattern
            .strip_prefix('/')
            .ok_or_else(|| PolicyError::MissingLeadingSlash(pattern.to_string()))?;

        let mut segments = Vec::new();
        if !body.is_empty() {
            let parts: Vec<&str> = body.split('/').collect();
            let last = parts.len() - 1;

            for (index, part) in parts.into_iter().enumerate() {
                // "/users/" is accepted and treated like "/users"
                if part.is_empty() && index == last && index > 0 {
                    break;
                }
                let segment = Self::parse_segment(pattern, part)?;
                if segment == Segment::CatchAll && index != last {
                    return Err(PolicyError::MisplacedCatchAll(pattern.to_string()));
                }
                if let Segment::Variable(name) = &segment {
                    let duplicate = segments
                        .iter()
                        .any(|s| matches!(s, Segment::Variable(existing) if existing == name));
                    if duplicate {
                        return Err(PolicyError::DuplicateVariable {
                            pattern: pattern.to_string(),
                            variable: name.clone(),
                        });
                    }
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    fn parse_segment(pattern: &str, part: &str) -> Result<Segment, PolicyError> {
        let invalid = || PolicyError::InvalidSegment {
            pattern: pattern.to_string(),
            segment: part.to_string(),
        };

        match part {
            "" => Err(PolicyError::EmptySegment(pattern.to_string())),
            "*" => Ok(Segment::Wildcard),
            "**" => Ok(Segment::CatchAll),
            _ => {
                if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    let valid_name = !name.is_empty()
                        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
                    if valid_name {
                        Ok(Segment::Variable(name.to_string()))
                    } else {
                        Err(invalid())
                    }
                } else if part.contains(['{', '}', '*']) {
                    Err(invalid())
                } else {
                    Ok(Segment::Literal(part.to_string()))
                }
            }
        }
    }

    /// Match a request path, capturing variables on success.
    ///
    /// Each segment is percent-decoded after splitting, so an encoded `/`
    /// stays inside its segment. Invalid UTF-8 is decoded lossily.
    pub fn matches(&self, path: &str) -> Option<PathVariables> {
        let body = path.strip_prefix('/')?;
        let body = body.strip_suffix('/').unwrap_or(body);
        let parts: Vec<Cow<'_, str>> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/')
                .map(|part| percent_decode_str(part).decode_utf8_lossy())
                .collect()
        };

        let mut variables = BTreeMap::new();
        let mut position = 0;

        for segment in &self.segments {
            match segment {
                Segment::CatchAll => return Some(PathVariables(variables)),
                Segment::Literal(expected) => {
                    if parts.get(position).map(|part| &**part) != Some(expected.as_str()) {
                        return None;
                    }
                }
                Segment::Wildcard => {
                    if parts.get(position).map_or(true, |p| p.is_empty()) {
                        return None;
                    }
                }
                Segment::Variable(name) => match parts.get(position) {
                    Some(value) if !value.is_empty() => {
                        variables.insert(name.clone(), value.to_string());
                    }
                    _ => return None,
                },
            }
            position += 1;
        }

        if position == parts.len() {
            Some(PathVariables(variables))
        } else {
            None
        }
    }

    /// Whether this pattern captures a variable called `name`.
    pub fn captures(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Variable(v) if v == name))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for PathPattern {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
