/// Catalog users, provisioned on first federated login
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn from_i64(v: i64) -> Self {
        match v {
            1 => Self::Admin,
            _ => Self::User,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Self::User => 0,
            Self::Admin => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    pub role: i64,
    pub created_at: i64,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_i64(self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_and_defaults_to_user() {
        assert_eq!(Role::from_i64(0), Role::User);
        assert_eq!(Role::from_i64(1), Role::Admin);
        assert_eq!(Role::from_i64(42), Role::User);
        assert_eq!(Role::Admin.as_i64(), 1);
    }
}
