use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity selecting which persisted habit collection is active.
///
/// Supplied by the account session when logged in; otherwise the
/// anonymous sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    const ANONYMOUS: &'static str = "anonymous";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Sentinel identity used when nobody is logged in.
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
