use reqwest::Url;

use crate::error::{DeckError, Result};
use crate::settings::{load_settings, save_settings};

/// Store the server URL (and optionally a token) in settings, after a
/// parse check so a typo fails here rather than on the first request.
pub fn run(url: &str, token: Option<String>) -> Result<()> {
    Url::parse(url).map_err(|e| DeckError::Validation(format!("Invalid server URL: {e}")))?;

    let token = match token {
        Some(t) => t,
        None => rpassword::prompt_password("API token (blank for none): ")?,
    };

    let mut settings = load_settings();
    settings.server_url = url.trim_end_matches('/').to_string();
    settings.api_token = token.trim().to_string();
    save_settings(&settings)?;

    println!("Connected to {}", settings.server_url);
    if settings.api_token.is_empty() {
        println!("No token stored; requests will be unauthenticated.");
    }
    Ok(())
}
