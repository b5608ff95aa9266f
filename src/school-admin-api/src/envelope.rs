use serde_json::Value;

use crate::error::{ApiError, Result};

const UNKNOWN_ERROR: &str = "Unknown error";

/// `{ success, data?, message? }` wrapper every endpoint answers with
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub data: Option<Value>,
    pub message: Option<String>,
}

/// Acknowledgement returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    pub message: Option<String>,
}

impl Envelope {
    /// Parse a response body.
    ///
    /// `status` is the HTTP status; a body that is not JSON is reported as
    /// `Status` when the status was an error, `Malformed` otherwise.
    pub fn parse(status: u16, body: &str) -> Result<Self> {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(err) => {
                if !(200..300).contains(&status) {
                    return Err(ApiError::Status {
                        status,
                        body: body.chars().take(200).collect(),
                    });
                }
                return Err(ApiError::Malformed(format!("body is not JSON: {}", err)));
            }
        };

        let Value::Object(mut map) = value else {
            return Err(ApiError::Malformed("body is not a JSON object".to_string()));
        };

        let success = match map.get("success") {
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(ApiError::Malformed("`success` is not a boolean".to_string())),
            None => return Err(ApiError::Malformed("missing `success`".to_string())),
        };

        let message = match map.remove("message") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        Ok(Self {
            success,
            data: map.remove("data"),
            message,
        })
    }

    /// Turn `success: false` into `Rejected`
    pub fn into_accepted(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            })
        }
    }

    /// Accepted envelope whose `data` must be an array
    pub fn into_list(self) -> Result<Vec<Value>> {
        match self.into_accepted()?.data {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(ApiError::Malformed("`data` is not an array".to_string())),
            None => Err(ApiError::Malformed("missing `data`".to_string())),
        }
    }

    /// Accepted envelope with nothing but an optional message
    pub fn into_ack(self) -> Result<Ack> {
        let accepted = self.into_accepted()?;
        Ok(Ack {
            message: accepted.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_envelope() {
        let items = Envelope::parse(200, r#"{"success":true,"data":[1,2,3]}"#)
            .and_then(Envelope::into_list)
            .unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = Envelope::parse(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn test_non_json_error_status_is_status() {
        let err = Envelope::parse(502, "Bad Gateway").unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 502,
                body: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_missing_success_is_malformed() {
        let err = Envelope::parse(200, r#"{"data":[]}"#).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn test_non_array_data_is_malformed() {
        let err = Envelope::parse(200, r#"{"success":true,"data":{"id":1}}"#)
            .and_then(Envelope::into_list)
            .unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn test_rejection_carries_message() {
        let err = Envelope::parse(400, r#"{"success":false,"message":"Duplicate student"}"#)
            .and_then(Envelope::into_ack)
            .unwrap_err();
        assert_eq!(err.rejection_message(), Some("Duplicate student"));
    }

    #[test]
    fn test_rejection_without_message_defaults() {
        let err = Envelope::parse(200, r#"{"success":false}"#)
            .and_then(Envelope::into_ack)
            .unwrap_err();
        assert_eq!(err.rejection_message(), Some("Unknown error"));
    }
}
