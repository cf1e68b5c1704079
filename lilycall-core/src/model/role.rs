use serde::{Deserialize, Serialize};

/// Collision tie-breaker role, fixed for the whole session.
///
/// When both sides produce an offer in the same window, the polite side
/// yields and answers; the impolite side ignores the incoming offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Polite,
    Impolite,
}

impl Role {
    pub fn is_polite(self) -> bool {
        matches!(self, Role::Polite)
    }
}
