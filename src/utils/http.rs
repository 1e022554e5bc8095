use crate::error::{config_error, AppResult};
use reqwest::redirect::Policy;
use reqwest::Client;

/// User agent sent on every outbound request
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; EventParser/1.0)";

/// Shared outbound HTTP client
pub fn build_client() -> AppResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(10))
        .build()
        .map_err(|e| config_error(&format!("Failed to build HTTP client: {}", e)))
}
