// Version constraints such as ">=1.2.0"

use super::{Version, VersionError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    pub fn apply(&self, version: &Version, target: &Version) -> bool {
        match self {
            Operator::Eq => version.equal(target),
            Operator::Ne => !version.equal(target),
            Operator::Gt => version.greater_than(target),
            Operator::Ge => version.greater_or_equal(target),
            Operator::Lt => version.less_than(target),
            Operator::Le => version.less_or_equal(target),
        }
    }
}

impl FromStr for Operator {
    type Err = VersionError;

    /// An empty operator means equality.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            other => Err(VersionError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator paired with the version it compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub operator: Operator,
    pub version: Version,
}

impl Constraint {
    pub fn new(operator: &str, version: &str) -> Result<Self, VersionError> {
        Ok(Self {
            operator: operator.parse()?,
            version: Version::parse(version)?,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.operator.apply(version, &self.version)
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    /// Parse compact text like `>=1.2.0`, `!=2.0` or a bare `1.4.0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '!'))
            .unwrap_or(s.len());
        let (operator, version) = s.split_at(split);
        Self::new(operator, version.trim())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Check `version` against an operator and a constraint version string.
pub fn check(
    operator: &str,
    constraint_version: &str,
    version: &Version,
) -> Result<bool, VersionError> {
    Ok(Constraint::new(operator, constraint_version)?.matches(version))
}
