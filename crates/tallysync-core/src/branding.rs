//! Centralized branding constants
//!
//! All product naming comes from this module.

/// Product display name
pub const DISPLAY_NAME: &str = "TallySync";

/// Route on the application origin that receives authorization redirects
pub const CALLBACK_PATH: &str = "/connect";

/// Default backend API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default application origin (used to validate relayed messages)
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

/// Get the callback URL on a given application origin
pub fn callback_url(origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), CALLBACK_PATH)
}
