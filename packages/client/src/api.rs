//! API request and response models for the Konto backend

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::types::{Quota, Role, TokenStatus, UserStatus};

/// Backend route table
pub mod routes {
    pub const USER_LOGIN: &str = "/api/user/login";
    pub const USER_REGISTER: &str = "/api/user/register";
    pub const USER_LOGOUT: &str = "/api/user/logout";
    pub const USER_SELF: &str = "/api/user/self";
    /// Personal access-token (re)generation
    pub const USER_ACCESS_TOKEN: &str = "/api/user/token";
    /// Admin surface: list/create/update at the collection, `/{id}` for
    /// get/delete
    pub const USERS: &str = "/api/user";
    pub const USERS_SEARCH: &str = "/api/user/search";
    pub const TOKENS: &str = "/api/token";
    pub const TOKENS_SEARCH: &str = "/api/token/search";
}

/// Response envelope shared by every backend endpoint.
///
/// Non-2xx statuses and `success: false` are the uniform failure signal;
/// list endpoints additionally carry `total`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub total: Option<i64>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Business failure check for endpoints that return no payload
    pub fn ok(self) -> ClientResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(ClientError::Api(self.message))
        }
    }

    /// Extract the payload, treating a missing body on success as a
    /// malformed response
    pub fn into_data(self) -> ClientResult<T> {
        if !self.success {
            return Err(ClientError::Api(self.message));
        }
        self.data
            .ok_or_else(|| ClientError::Serialization("response is missing data".to_string()))
    }

    /// Extract the payload and the listing total
    pub fn into_listing(self) -> ClientResult<(T, i64)> {
        if !self.success {
            return Err(ClientError::Api(self.message));
        }
        let total = self.total.unwrap_or(0);
        let data = self
            .data
            .ok_or_else(|| ClientError::Serialization("response is missing data".to_string()))?;
        Ok((data, total))
    }
}

/// Login credentials
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::validation(
                "username and password must not be empty",
            ));
        }
        Ok(())
    }
}

/// Minimum password length accepted by the backend
pub const MIN_PASSWORD_LEN: usize = 8;

fn validate_password(password: &str) -> ClientResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// New account registration
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::validation(
                "username and password must not be empty",
            ));
        }
        validate_password(&self.password)
    }
}

/// Self-service profile update. Only the password is optional; the other
/// fields fully replace their server-side values.
#[derive(Debug, Serialize)]
pub struct SelfUpdateRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl SelfUpdateRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.username.trim().is_empty() {
            return Err(ClientError::validation("username must not be empty"));
        }
        match self.password.as_deref() {
            Some(p) => validate_password(p),
            None => Ok(()),
        }
    }
}

/// Administrator-side account creation
#[derive(Debug, Serialize)]
pub struct UserCreateRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub status: UserStatus,
}

impl UserCreateRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::validation(
                "username and password must not be empty",
            ));
        }
        validate_password(&self.password)
    }
}

/// Administrator-side account update, addressed by id
#[derive(Debug, Serialize)]
pub struct UserUpdateRequest {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub status: UserStatus,
}

impl UserUpdateRequest {
    pub fn validate(&self) -> ClientResult<()> {
        if self.id == 0 {
            return Err(ClientError::validation("user id must not be empty"));
        }
        if self.username.trim().is_empty() {
            return Err(ClientError::validation("username must not be empty"));
        }
        match self.password.as_deref() {
            Some(p) => validate_password(p),
            None => Ok(()),
        }
    }
}

/// API token creation. The numeric quota is only meaningful when the
/// unlimited flag is off; an unlimited token always serializes a zero count.
#[derive(Debug, Serialize)]
pub struct TokenCreateRequest {
    pub name: String,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
}

impl TokenCreateRequest {
    pub fn new(name: impl Into<String>, quota: Quota) -> Self {
        let (remain_quota, unlimited_quota) = match quota {
            Quota::Unlimited => (0, true),
            Quota::Remaining(n) => (n, false),
        };
        Self {
            name: name.into(),
            remain_quota,
            unlimited_quota,
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("token name must not be empty"));
        }
        if !self.unlimited_quota && self.remain_quota < 0 {
            return Err(ClientError::validation("token quota must not be negative"));
        }
        Ok(())
    }
}

/// API token update. The backend preserves the key, owner and creation time
/// regardless of what is sent, so only the mutable fields are carried.
#[derive(Debug, Serialize)]
pub struct TokenUpdateRequest {
    pub id: i64,
    pub name: String,
    pub status: TokenStatus,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
}

impl TokenUpdateRequest {
    /// Start from the current server-side state of a token
    pub fn from_token(token: &crate::types::ApiToken) -> Self {
        Self {
            id: token.id,
            name: token.name.clone(),
            status: token.status,
            remain_quota: token.remain_quota,
            unlimited_quota: token.unlimited_quota,
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.id == 0 {
            return Err(ClientError::validation("token id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("token name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_with_data() {
        let envelope: ApiEnvelope<String> = serde_json::from_str(
            r#"{"success": true, "message": "ok", "data": "payload"}"#,
        )
        .unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.into_data().unwrap(), "payload");
    }

    #[test]
    fn envelope_business_failure_carries_message_verbatim() {
        let envelope: ApiEnvelope<String> =
            serde_json::from_str(r#"{"success": false, "message": "用戶名已存在"}"#).unwrap();
        match envelope.into_data() {
            Err(ClientError::Api(msg)) => assert_eq!(msg, "用戶名已存在"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn short_password_is_rejected_locally() {
        let request = RegisterRequest {
            username: "carol".to_string(),
            password: "short1".to_string(),
            email: None,
        };
        let err = request.validate().unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn unlimited_quota_ignores_numeric_count() {
        let request = TokenCreateRequest::new("ci", Quota::Unlimited);
        assert!(request.unlimited_quota);
        assert_eq!(request.remain_quota, 0);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["unlimited_quota"], true);
        assert_eq!(body["remain_quota"], 0);
    }

    #[test]
    fn self_update_skips_absent_password() {
        let request = SelfUpdateRequest {
            username: "alice".to_string(),
            display_name: Some("Alice".to_string()),
            email: None,
            password: None,
        };
        request.validate().unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("password").is_none());
    }
}
