//! Per-request query types.

use serde::{Deserialize, Serialize};

/// Caller role declared on the wire via the `user_type` field.
///
/// `Master` is the only privileged role and is matched by exact,
/// case-sensitive string equality. Anything else is `Regular`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Regular,
    Master,
}

impl CallerRole {
    /// Map the wire value of `user_type` to a role.
    pub fn from_user_type(user_type: &str) -> Self {
        if user_type == "master" {
            CallerRole::Master
        } else {
            CallerRole::Regular
        }
    }

    /// Whether this role may mutate the knowledge base.
    pub fn is_master(self) -> bool {
        matches!(self, CallerRole::Master)
    }
}

/// One user question. Ephemeral, one per request.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub role: CallerRole,
}

impl Query {
    pub fn new(text: impl Into<String>, role: CallerRole) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}
