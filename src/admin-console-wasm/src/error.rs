use school_admin_api::ApiError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Error types for the admin console
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdminError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// JS exception or a page element that is not there
    #[error("Browser error: {0}")]
    Browser(String),
}

pub type Result<T> = std::result::Result<T, AdminError>;

impl AdminError {
    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::Validation(message.into())
    }

    pub fn browser(message: impl Into<String>) -> Self {
        AdminError::Browser(message.into())
    }

    /// Text for an alert, prefixed per operation when the backend rejected it
    pub fn user_message(&self, rejected_prefix: &str) -> String {
        match self {
            AdminError::Api(ApiError::Rejected { message }) => format!("{}: {}", rejected_prefix, message),
            AdminError::Validation(message) | AdminError::Browser(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<JsValue> for AdminError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", value));
        AdminError::Browser(message)
    }
}

impl From<serde_wasm_bindgen::Error> for AdminError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        AdminError::Browser(err.to_string())
    }
}

impl From<AdminError> for JsValue {
    fn from(err: AdminError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefixes_rejections() {
        let err = AdminError::from(ApiError::Rejected {
            message: "Not allowed".to_string(),
        });
        assert_eq!(err.user_message("Upload failed"), "Upload failed: Not allowed");
    }

    #[test]
    fn test_user_message_for_other_errors() {
        let err = AdminError::validation("Student ID and Name are required");
        assert_eq!(err.user_message("Save failed"), "Student ID and Name are required");

        let err = AdminError::NotFound {
            kind: "video",
            id: "9".to_string(),
        };
        assert_eq!(err.to_string(), "video not found: 9");

        let err = AdminError::browser("jspdf library not loaded");
        assert_eq!(err.user_message("Export failed"), "jspdf library not loaded");
        assert_eq!(err.to_string(), "Browser error: jspdf library not loaded");
    }
}
