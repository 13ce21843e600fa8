//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use serde::Serialize;
use std::fmt;
use std::path::Path;
use stocktake_backend::BackendError;
use stocktake_model::LocationId;
use stocktake_session::CaptureError;

/// An error with helpful context and suggestions
#[derive(Debug, Serialize)]
pub struct HelpfulError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Translate a backend failure into something a user can act on.
    pub fn from_backend(err: &BackendError, api_url: &str) -> Self {
        match err {
            BackendError::Unreachable(details) => Self::new(
                "Unable to connect to inventory server. Check network connection and API configuration.",
            )
            .with_context(details.clone())
            .with_suggestions([
                format!("TRY: Check the server address: {}", api_url),
                "TRY: Set STOCKTAKE_API_URL or [backend].api_url in ~/.stocktake/config.toml"
                    .to_string(),
                "TRY: Use the built-in sample data: stocktake --mock <command>".to_string(),
            ]),
            BackendError::Remote { status: 401, .. } | BackendError::Remote { status: 403, .. } => {
                Self::new("Inventory server rejected the API token")
                    .with_context(err.to_string())
                    .with_suggestions([
                        "TRY: Generate a new personal access token in Snipe-IT",
                        "TRY: Set STOCKTAKE_API_TOKEN or pass --api-token",
                    ])
            }
            BackendError::Remote { .. } => Self::new("Inventory server reported an error")
                .with_context(err.to_string())
                .with_suggestion("TRY: Re-run with -v and check the log in ~/.stocktake/logs"),
            BackendError::NotFound(what) => Self::new(format!("Not found: {}", what))
                .with_suggestion("TRY: List what exists: stocktake locations"),
            BackendError::Decode(details) => {
                Self::new("Unexpected response from inventory server")
                    .with_context(details.clone())
                    .with_suggestions([
                        format!("TRY: Confirm {} is a Snipe-IT server", api_url),
                        "TRY: Check that the URL does not already end in /api/v1".to_string(),
                    ])
            }
            BackendError::Config(details) => Self::new("Invalid backend configuration")
                .with_context(details.clone())
                .with_suggestion("TRY: api_url must be absolute, e.g. https://assets.example.com"),
        }
    }

    pub fn location_not_found(id: LocationId) -> Self {
        Self::new(format!("Location not found: {}", id))
            .with_context("The inventory server has no location with this id")
            .with_suggestion("TRY: List locations and their ids: stocktake locations")
    }

    pub fn capture_unavailable(err: &CaptureError) -> Self {
        let base = Self::new("Cannot start code capture").with_context(err.to_string());
        match err {
            CaptureError::PermissionDenied(_) => {
                base.with_suggestion("TRY: Check read permissions on the capture input")
            }
            CaptureError::Unavailable(_) => base.with_suggestions([
                "TRY: Pipe codes on stdin: cat codes.txt | stocktake inventory <location-id>",
                "TRY: Read codes from a file: stocktake inventory <location-id> --codes codes.txt",
            ]),
        }
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestion(format!("TRY: Check if the file exists: ls -la {}", path.display()))
    }

    pub fn json_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("JSON parse error: {}", details))
            .with_context(format!("Failed to parse JSON file: {}", path.display()))
            .with_suggestions([
                "TRY: Validate the JSON: cat FILE | python -m json.tool".to_string(),
                "TRY: Registered assets are an array of assets or a {\"total\", \"rows\"} page"
                    .to_string(),
            ])
    }

    pub fn config_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid config file: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestion("TRY: Expected a [backend] table with api_url, api_token, use_mock, timeout_secs")
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print a command failure as `{"error": {...}}` on stdout for `--json` callers.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({ "error": helpful }),
        None => {
            let causes: Vec<String> = err.chain().skip(1).map(|c| c.to_string()).collect();
            serde_json::json!({
                "error": {
                    "message": err.to_string(),
                    "causes": causes,
                }
            })
        }
    };
    println!("{}", payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While loading assets")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While loading assets"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_unreachable_backend_message() {
        let err = HelpfulError::from_backend(
            &BackendError::Unreachable("connection refused".into()),
            "https://assets.example.com",
        );
        assert!(err.message.starts_with("Unable to connect to inventory server"));
        assert_eq!(err.context.as_deref(), Some("connection refused"));
        assert!(err
            .suggestions
            .iter()
            .any(|s| s.contains("https://assets.example.com")));
    }

    #[test]
    fn test_rejected_token_suggests_new_token() {
        let err = HelpfulError::from_backend(
            &BackendError::Remote {
                status: 401,
                message: "Unauthenticated.".into(),
            },
            "https://assets.example.com",
        );
        assert!(err.message.contains("API token"));
        assert!(err.suggestions.iter().any(|s| s.contains("STOCKTAKE_API_TOKEN")));
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let json = serde_json::to_value(HelpfulError::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "boom" }));
    }
}
