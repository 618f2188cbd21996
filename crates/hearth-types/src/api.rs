use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// Bearer token claims. Shared by hearth-api (issue/verify) and
/// hearth-client (payload decoding for the local session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub family_code: String,
    pub iat: usize,
    /// Only present when the server is configured with a token TTL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

// -- Auth --

/// Absent fields decode as empty strings so they fail the server's
/// required-field check rather than JSON extraction.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub family_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub family_code: String,
}

// -- Messages --

/// One entry of `GET /api/messages/{room}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub username: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_uses_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"kim","email":"kim@x.com","password":"pw1","familyCode":"F1"}"#,
        )
        .unwrap();
        assert_eq!(req.family_code, "F1");
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"kim","email":"kim@x.com","password":"pw1"}"#).unwrap();
        assert_eq!(req.family_code, "");

        let req: LoginRequest = serde_json::from_str(r#"{"email":"kim@x.com"}"#).unwrap();
        assert_eq!(req.password, "");
    }

    #[test]
    fn claims_omit_exp_when_unset() {
        let claims = Claims {
            user_id: Uuid::nil(),
            username: "kim".into(),
            family_code: "F1".into(),
            iat: 0,
            exp: None,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["familyCode"], "F1");
        assert!(json.get("userId").is_some());
        assert!(json.get("exp").is_none());
    }
}
