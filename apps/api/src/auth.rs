//! Actor identity consumed from the upstream gateway.
//!
//! JWT verification happens at the edge; by the time a request reaches this
//! service the gateway has injected `x-user-id` and `x-user-role` headers.
//! This extractor only parses that interface.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// The authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and managers may create/update employees and assessments.
    pub fn can_manage(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(AppError::Unauthorized)?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
            .ok_or(AppError::Unauthorized)?;

        Ok(Actor { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_known_values() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse("user"), Some(Role::User));
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn test_manager_can_manage_but_is_not_admin() {
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Manager,
        };
        assert!(actor.can_manage());
        assert!(!actor.is_admin());
    }

    #[test]
    fn test_plain_user_cannot_manage() {
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(!actor.can_manage());
    }
}
