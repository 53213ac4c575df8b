//! The authenticated caller of an application service

use crate::domain::{User, UserRole};

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
