use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope wrapping every JSON body the API returns.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "data": 42, "message": null })
        );
    }

    #[test]
    fn test_error_envelope_has_no_data() {
        let response = ApiResponse::<()>::error("Failed to create job");
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "data": null,
                "message": "Failed to create job",
            })
        );
    }
}
