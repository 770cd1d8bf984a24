//! # Domain Entities
//!
//! The authenticated session and its profile.

use serde::{Deserialize, Serialize};
use shared_types::Address;
use uuid::Uuid;

/// Account role in the payroll system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A company funding streams for its employees.
    Company,
    /// An employee withdrawing salary from a stream.
    Employee,
}

/// Plaintext profile fields. Salary and balance values never appear here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub full_name: String,
    /// Account role.
    pub role: Role,
    /// Wallet address the account is keyed by.
    pub wallet_address: Address,
}

/// An authenticated backend session.
///
/// Created on sign-in or registration, mutated by profile updates,
/// destroyed on sign-out or wallet disconnect. Owned exclusively by
/// `SessionService`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user identifier.
    pub user_id: Uuid,
    /// Profile fields.
    pub profile: Profile,
    /// Whether the session is live.
    pub authenticated: bool,
}

impl Session {
    /// Whether this session belongs to the given wallet address.
    #[must_use]
    pub fn matches_address(&self, address: &Address) -> bool {
        self.authenticated && self.profile.wallet_address == *address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address() -> Address {
        Address::parse("0x0000000000000000000000000000000000000b01").unwrap()
    }

    fn test_session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            profile: Profile {
                full_name: "Ada".to_string(),
                role: Role::Employee,
                wallet_address: test_address(),
            },
            authenticated: true,
        }
    }

    #[test]
    fn test_matches_address() {
        let session = test_session();
        assert!(session.matches_address(&test_address()));
    }

    #[test]
    fn test_does_not_match_other_address() {
        let session = test_session();
        let other = Address::parse("0x0000000000000000000000000000000000000b02").unwrap();
        assert!(!session.matches_address(&other));
    }

    #[test]
    fn test_unauthenticated_never_matches() {
        let mut session = test_session();
        session.authenticated = false;
        assert!(!session.matches_address(&test_address()));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Company).unwrap(), "\"company\"");
    }
}
