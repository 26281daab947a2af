use tunelift_api::models::{ConvertData, ConvertRequest, ConvertResponse};
use tunelift_api::{Api, GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The job ran but some or all tracks could not be matched or added.
    /// A valid terminal state, not an error.
    Partial,
    Failure,
}

/// Normalized result of one conversion submission. Immutable after creation
/// and replaced wholesale by the next submission, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub outcome: Outcome,
    pub playlist_url: Option<String>,
    pub playlist_name: Option<String>,
    pub total_source_tracks: Option<u32>,
    pub matched_tracks: Option<u32>,
    pub added_tracks: Option<u32>,
    pub api_errors: Vec<String>,
    pub unmatched_tracks: Vec<String>,
    pub message: Option<String>,
}

impl ConversionResult {
    fn from_response(response: ConvertResponse) -> Self {
        match (response.success, response.data) {
            (true, Some(data)) => Self::with_data(Outcome::Success, data, response.message),
            (false, Some(data)) => {
                Self::with_data(Outcome::Partial, data, response.message.or(response.error))
            }
            // A response with no data at all is a hard failure regardless of
            // its success flag.
            (_, None) => Self::failure(
                response
                    .error
                    .or(response.message)
                    .unwrap_or_else(|| "Conversion failed".to_string()),
            ),
        }
    }

    fn from_error(error: &GatewayError) -> Self {
        Self::failure(error.to_string())
    }

    fn with_data(outcome: Outcome, data: ConvertData, message: Option<String>) -> Self {
        Self {
            outcome,
            playlist_url: data.playlist_url,
            playlist_name: data.playlist_name,
            total_source_tracks: data.total_source_tracks,
            matched_tracks: data.matched_tracks,
            added_tracks: data.added_tracks,
            api_errors: data.api_errors,
            unmatched_tracks: data.unmatched_tracks,
            message,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            outcome: Outcome::Failure,
            playlist_url: None,
            playlist_name: None,
            total_source_tracks: None,
            matched_tracks: None,
            added_tracks: None,
            api_errors: Vec::new(),
            unmatched_tracks: Vec::new(),
            message: Some(message),
        }
    }
}

/// Submits conversion jobs through the gateway and holds the single most
/// recent result.
#[derive(Default)]
pub struct ConversionWorkflow {
    last: Option<ConversionResult>,
}

impl ConversionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ConversionResult> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Submit a conversion, replacing the previous result wholesale.
    ///
    /// A gateway error still produces a stored `Failure` result; the error is
    /// also returned so the caller can thread `SessionExpired` back to the
    /// session controller.
    pub async fn submit<A: Api>(
        &mut self,
        api: &A,
        playlist_url: &str,
        playlist_name: Option<&str>,
    ) -> Result<(), GatewayError> {
        let request = ConvertRequest {
            playlist_url: playlist_url.to_string(),
            playlist_name: playlist_name.map(str::to_string),
        };

        tracing::info!(playlist_url = %request.playlist_url, "Submitting conversion");
        match api.convert(&request).await {
            Ok(response) => {
                self.last = Some(ConversionResult::from_response(response));
                Ok(())
            }
            Err(error) => {
                tracing::warn!(error = %error, "Conversion failed");
                self.last = Some(ConversionResult::from_error(&error));
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ConvertResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn successful_response_maps_to_success() {
        let result = ConversionResult::from_response(response(
            r#"{
                "success": true,
                "data": {
                    "playlist_url": "https://music.example/playlist/p1",
                    "playlist_name": "Road Trip",
                    "total_source_tracks": 12,
                    "matched_tracks": 12,
                    "added_tracks": 12
                }
            }"#,
        ));

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(
            result.playlist_url.as_deref(),
            Some("https://music.example/playlist/p1")
        );
        assert_eq!(result.added_tracks, Some(12));
        assert!(result.unmatched_tracks.is_empty());
    }

    #[test]
    fn unsuccessful_response_with_data_maps_to_partial() {
        let result = ConversionResult::from_response(response(
            r#"{
                "success": false,
                "data": {
                    "matched_tracks": 1,
                    "unmatched_tracks": ["Song A"],
                    "api_errors": []
                }
            }"#,
        ));

        assert_eq!(result.outcome, Outcome::Partial);
        assert_eq!(result.unmatched_tracks, vec!["Song A"]);
        assert_eq!(result.matched_tracks, Some(1));
        assert!(result.api_errors.is_empty());
    }

    #[test]
    fn response_without_data_maps_to_failure_with_backend_message() {
        let result = ConversionResult::from_response(response(
            r#"{"success": false, "error": "Playlist not found"}"#,
        ));

        assert_eq!(result.outcome, Outcome::Failure);
        assert_eq!(result.message.as_deref(), Some("Playlist not found"));
    }

    #[test]
    fn gateway_error_maps_to_failure() {
        let error = GatewayError::Unreachable("connection refused".to_string());
        let result = ConversionResult::from_error(&error);

        assert_eq!(result.outcome, Outcome::Failure);
        assert_eq!(
            result.message.as_deref(),
            Some("Could not reach the server: connection refused")
        );
    }
}
