//! Core domain types shared across the client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege tier of an account.
///
/// The wire representation is the raw integer the backend stores, so the
/// ordering of the variants must match the numeric ordering of the tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Role {
    Guest,
    User,
    Admin,
    Root,
}

impl Role {
    pub fn as_i32(self) -> i32 {
        i32::from(self)
    }

    /// Human-readable tier name
    pub fn label(self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::User => "user",
            Role::Admin => "admin",
            Role::Root => "root",
        }
    }

    /// Whether this role grants access to the admin surface
    pub fn is_admin(self) -> bool {
        self >= Role::Admin
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> i32 {
        match role {
            Role::Guest => 0,
            Role::User => 1,
            Role::Admin => 10,
            Role::Root => 100,
        }
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Guest),
            1 => Ok(Role::User),
            10 => Ok(Role::Admin),
            100 => Ok(Role::Root),
            other => Err(format!("unknown role tier: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Account status. The backend never uses 0 because it is the zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum UserStatus {
    Enabled,
    Disabled,
}

impl From<UserStatus> for i32 {
    fn from(status: UserStatus) -> i32 {
        match status {
            UserStatus::Enabled => 1,
            UserStatus::Disabled => 2,
        }
    }
}

impl TryFrom<i32> for UserStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(UserStatus::Enabled),
            2 => Ok(UserStatus::Disabled),
            other => Err(format!("unknown user status: {}", other)),
        }
    }
}

/// API token status. Expired and exhausted are set server-side only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum TokenStatus {
    Enabled,
    Disabled,
    Expired,
    Exhausted,
}

impl From<TokenStatus> for i32 {
    fn from(status: TokenStatus) -> i32 {
        match status {
            TokenStatus::Enabled => 1,
            TokenStatus::Disabled => 2,
            TokenStatus::Expired => 3,
            TokenStatus::Exhausted => 4,
        }
    }
}

impl TryFrom<i32> for TokenStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TokenStatus::Enabled),
            2 => Ok(TokenStatus::Disabled),
            3 => Ok(TokenStatus::Expired),
            4 => Ok(TokenStatus::Exhausted),
            other => Err(format!("unknown token status: {}", other)),
        }
    }
}

/// The authenticated user record cached client-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    /// Long-lived bearer credential, interchangeable with the session cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<i64>,
}

impl Identity {
    /// Bearer credential, if one is present and non-empty
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Name to show in UIs: display name when set, username otherwise
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Usage allowance of an API token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Unlimited,
    Remaining(i64),
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quota::Unlimited => write!(f, "unlimited"),
            Quota::Remaining(n) => write!(f, "{}", n),
        }
    }
}

/// A named, revocable credential for third-party programmatic access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: i64,
    pub user_id: i64,
    /// Secret key, shown once at creation
    pub key: String,
    pub name: String,
    pub status: TokenStatus,
    pub created_time: DateTime<Utc>,
    pub accessed_time: DateTime<Utc>,
    pub expired_time: DateTime<Utc>,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
}

impl ApiToken {
    pub fn quota(&self) -> Quota {
        if self.unlimited_quota {
            Quota::Unlimited
        } else {
            Quota::Remaining(self.remain_quota)
        }
    }
}

/// One page of a listing endpoint
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Number of pages needed to show `total` items at this page size
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        ((self.total.max(0) as u64).div_ceil(self.page_size as u64)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tiers_are_ordered() {
        assert!(Role::Guest < Role::User);
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::Root);
        assert!(Role::Root.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn role_round_trips_through_wire_integers() {
        for role in [Role::Guest, Role::User, Role::Admin, Role::Root] {
            assert_eq!(Role::try_from(role.as_i32()), Ok(role));
        }
        assert!(Role::try_from(7).is_err());
    }

    #[test]
    fn identity_deserializes_from_backend_shape() {
        let identity: Identity = serde_json::from_str(
            r#"{
                "id": 3,
                "username": "alice",
                "display_name": "Alice",
                "email": "alice@example.com",
                "role": 1,
                "status": 1,
                "access_token": "tok-123"
            }"#,
        )
        .unwrap();
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.status, UserStatus::Enabled);
        assert_eq!(identity.bearer_token(), Some("tok-123"));
    }

    #[test]
    fn empty_access_token_is_not_a_bearer_credential() {
        let identity = Identity {
            id: 1,
            username: "bob".to_string(),
            display_name: None,
            email: None,
            role: Role::User,
            status: UserStatus::Enabled,
            access_token: Some(String::new()),
            quota: None,
        };
        assert_eq!(identity.bearer_token(), None);
        assert_eq!(identity.display_label(), "bob");
    }

    #[test]
    fn unknown_role_tier_fails_deserialization() {
        let result = serde_json::from_str::<Identity>(
            r#"{"id": 1, "username": "x", "role": 5, "status": 1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn token_quota_projection() {
        let mut token = ApiToken {
            id: 1,
            user_id: 1,
            key: "k".to_string(),
            name: "ci".to_string(),
            status: TokenStatus::Enabled,
            created_time: Utc::now(),
            accessed_time: Utc::now(),
            expired_time: Utc::now(),
            remain_quota: 50,
            unlimited_quota: false,
        };
        assert_eq!(token.quota(), Quota::Remaining(50));
        token.unlimited_quota = true;
        assert_eq!(token.quota(), Quota::Unlimited);
    }

    #[test]
    fn page_math_rounds_up() {
        let page = Page::<i32> {
            items: vec![],
            total: 25,
            page: 2,
            page_size: 10,
        };
        assert_eq!(page.total_pages(), 3);

        let exact = Page::<i32> {
            items: vec![],
            total: 30,
            page: 1,
            page_size: 10,
        };
        assert_eq!(exact.total_pages(), 3);

        let empty = Page::<i32> {
            items: vec![],
            total: 0,
            page: 1,
            page_size: 10,
        };
        assert_eq!(empty.total_pages(), 0);
    }
}
