//! User domain entity

use chrono::{DateTime, Utc};

/// User role
///
/// Every account starts as `User`; listing a charger promotes it to `Host`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserRole {
    #[default]
    User,
    Host,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Host => "host",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "host" => Self::Host,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User model
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    /// Unique, stored lowercase
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub verified: bool,
    pub is_active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into().trim().to_lowercase(),
            name: name.into(),
            avatar_url: None,
            role,
            verified: false,
            is_active: true,
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Promote a plain user to host. Admins keep their role.
    pub fn promote_to_host(&mut self) -> bool {
        if self.role == UserRole::User {
            self.role = UserRole::Host;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let u = User::new("  Alex@Example.COM ", "Alex", "hash", UserRole::User);
        assert_eq!(u.email, "alex@example.com");
        assert!(u.is_active);
        assert!(!u.verified);
    }

    #[test]
    fn promote_to_host_once() {
        let mut u = User::new("a@b.co", "A", "h", UserRole::User);
        assert!(u.promote_to_host());
        assert_eq!(u.role, UserRole::Host);
        assert!(!u.promote_to_host());

        let mut admin = User::new("root@b.co", "Root", "h", UserRole::Admin);
        assert!(!admin.promote_to_host());
        assert!(admin.is_admin());
    }

    #[test]
    fn unknown_role_is_user() {
        assert_eq!(UserRole::from_str("operator"), UserRole::User);
        assert_eq!(UserRole::from_str("admin"), UserRole::Admin);
    }
}
