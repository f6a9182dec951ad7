//! Request and response bodies for the HTTP surface

use serde::{Deserialize, Serialize};

/// Runtime flags the frontend needs before its first coach call.
/// Field names are camelCase to match the client contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(rename = "isDemoMode")]
    pub is_demo_mode: bool,
    #[serde(rename = "hasOpenAIKey")]
    pub has_openai_key: bool,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(rename = "demoMode")]
    pub demo_mode: bool,
    #[serde(rename = "authBackend")]
    pub auth_backend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestKeyResponse {
    pub success: bool,
    pub model: String,
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_response_uses_client_field_names() {
        let response = ConfigResponse {
            is_demo_mode: true,
            has_openai_key: false,
            environment: "development".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["isDemoMode"], true);
        assert_eq!(value["hasOpenAIKey"], false);
        assert!(value.get("is_demo_mode").is_none());
    }

    #[test]
    fn test_update_password_request_field_name() {
        let request: UpdatePasswordRequest =
            serde_json::from_str(r#"{"newPassword": "s3cret-pw"}"#).unwrap();
        assert_eq!(request.new_password, "s3cret-pw");
    }
}
