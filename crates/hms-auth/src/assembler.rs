//! Final assembly of the authenticated user.

use crate::credentials::CredentialKind;
use crate::identity::Verification;
use crate::seat::SeatResolution;
use crate::types::{AuthenticatedUser, UserValidationError};

/// Combines a verified identity and its seat resolution into an
/// [`AuthenticatedUser`], applying the default-role policy.
///
/// Gateway identities whose seat yields no role receive exactly the
/// configured default role. Bearer and cookie identities never do; a
/// directly authenticated user without a seat has no elevated privilege.
#[derive(Debug, Clone)]
pub struct UserAssembler {
    default_gateway_role: String,
}

impl UserAssembler {
    /// Creates an assembler with the role granted to unseated gateway users.
    #[must_use]
    pub fn new(default_gateway_role: impl Into<String>) -> Self {
        Self {
            default_gateway_role: default_gateway_role.into().trim().to_ascii_lowercase(),
        }
    }

    /// Returns the default gateway role.
    #[must_use]
    pub fn default_gateway_role(&self) -> &str {
        &self.default_gateway_role
    }

    /// Builds the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the verified id or email is empty.
    pub fn assemble(
        &self,
        verification: Verification,
        seat: SeatResolution,
    ) -> Result<AuthenticatedUser, UserValidationError> {
        let roles = if seat.roles.is_empty() && verification.kind == CredentialKind::GatewayAsserted
        {
            std::iter::once(self.default_gateway_role.clone()).collect()
        } else {
            seat.roles
        };

        Ok(
            AuthenticatedUser::new(verification.id, verification.email, verification.kind)?
                .with_platform_id(seat.platform_id)
                .with_entity_id(seat.entity_id)
                .with_roles(roles),
        )
    }
}

impl Default for UserAssembler {
    fn default() -> Self {
        Self::new("employee")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::SeatOutcome;
    use crate::types::UserEmail;
    use indexmap::IndexSet;

    fn verification(kind: CredentialKind) -> Verification {
        Verification {
            id: "u-1".to_string(),
            email: UserEmail::Verified("u1@example.org".to_string()),
            kind,
        }
    }

    fn unseated() -> SeatResolution {
        SeatResolution {
            platform_id: None,
            entity_id: None,
            roles: IndexSet::new(),
            outcome: SeatOutcome::NoProfile,
        }
    }

    fn seated(role: &str) -> SeatResolution {
        SeatResolution {
            platform_id: Some("p-1".to_string()),
            entity_id: Some("hospital-7".to_string()),
            roles: std::iter::once(role.to_string()).collect(),
            outcome: SeatOutcome::Seated,
        }
    }

    #[test]
    fn test_gateway_without_seat_gets_default_role() {
        let user = UserAssembler::default()
            .assemble(verification(CredentialKind::GatewayAsserted), unseated())
            .unwrap();
        assert_eq!(user.roles().len(), 1);
        assert!(user.has_role("employee"));
        assert!(user.is_unaffiliated());
    }

    #[test]
    fn test_gateway_with_seat_keeps_seat_role() {
        let user = UserAssembler::default()
            .assemble(verification(CredentialKind::GatewayAsserted), seated("admin"))
            .unwrap();
        assert!(user.has_role("admin"));
        assert!(!user.has_role("employee"));
    }

    #[test]
    fn test_bearer_without_seat_has_no_roles() {
        let user = UserAssembler::default()
            .assemble(verification(CredentialKind::BearerToken), unseated())
            .unwrap();
        assert!(user.roles().is_empty());
    }

    #[test]
    fn test_cookie_with_seat() {
        let user = UserAssembler::default()
            .assemble(verification(CredentialKind::CookieSession), seated("nurse"))
            .unwrap();
        assert_eq!(user.platform_id(), Some("p-1"));
        assert_eq!(user.entity_id(), Some("hospital-7"));
        assert!(user.has_role("nurse"));
    }

    #[test]
    fn test_configured_default_role_is_normalized() {
        let assembler = UserAssembler::new(" Staff ");
        assert_eq!(assembler.default_gateway_role(), "staff");
    }
}
