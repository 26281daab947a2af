use serde::{Deserialize, Serialize};

/// User record the backend attaches to a valid session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Response from `GET /api/auth/status`. A successful response without a
/// user record means the session is not valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Body for `POST /api/convert`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertRequest {
    pub playlist_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_name: Option<String>,
}

/// Response from `POST /api/convert`. `success: false` with a data payload
/// is a partial conversion, not a hard failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ConvertData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertData {
    #[serde(default)]
    pub playlist_url: Option<String>,
    #[serde(default)]
    pub playlist_name: Option<String>,
    #[serde(default)]
    pub total_source_tracks: Option<u32>,
    #[serde(default)]
    pub matched_tracks: Option<u32>,
    #[serde(default)]
    pub added_tracks: Option<u32>,
    #[serde(default)]
    pub api_errors: Vec<String>,
    #[serde(default)]
    pub unmatched_tracks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_request_omits_absent_playlist_name() {
        let request = ConvertRequest {
            playlist_url: "https://youtube.com/playlist?list=PL1".to_string(),
            playlist_name: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("playlist_name").is_none());
    }

    #[test]
    fn partial_convert_response_deserializes() {
        let body = r#"{
            "success": false,
            "data": {
                "matched_tracks": 8,
                "total_source_tracks": 10,
                "unmatched_tracks": ["Song A", "Song B"],
                "api_errors": []
            }
        }"#;
        let response: ConvertResponse = serde_json::from_str(body).unwrap();
        assert!(!response.success);
        let data = response.data.unwrap();
        assert_eq!(data.matched_tracks, Some(8));
        assert_eq!(data.unmatched_tracks, vec!["Song A", "Song B"]);
        assert!(data.api_errors.is_empty());
    }

    #[test]
    fn status_response_tolerates_missing_user() {
        let response: StatusResponse = serde_json::from_str("{}").unwrap();
        assert!(response.user.is_none());
    }
}
