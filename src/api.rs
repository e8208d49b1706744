use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DeckError, Result};
use crate::models::{
    AccountsResponse, ExchangeRequest, ExchangeResponse, Institution, LinkTokenResponse,
    NetWorthHistory, Overview, PasswordChange, PortfolioResponse, ProfileUpdate, SyncAllResult,
    SyncResult, TransactionPage,
};
use crate::settings::Settings;

/// Blocking client for the dashboard REST API.
///
/// Policy: no automatic retries — a financial action must never silently
/// repeat. Failures map to `DeckError::Network` (request never completed)
/// or `DeckError::Http` (non-2xx, carrying the server's message if its
/// JSON error body had one).
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(&settings.server_url)
            .map_err(|e| DeckError::Settings(format!("invalid server_url: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !settings.api_token.is_empty() {
            let bearer = format!("Bearer {}", settings.api_token);
            let value = HeaderValue::from_str(&bearer)
                .map_err(|_| DeckError::Settings("api_token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DeckError::Network(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Issue one request and parse the JSON response. Non-2xx responses
    /// become `DeckError::Http` with the server's message field if present.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| DeckError::Other(format!("bad request path {path}: {e}")))?;

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().map_err(DeckError::from)?;
        let status = response.status();
        let text = response.text().map_err(DeckError::from)?;

        if !status.is_success() {
            return Err(DeckError::Http {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T> {
        self.request(Method::POST, path, body)
    }

    // --- Plaid item endpoints -------------------------------------------

    pub fn list_items(&self) -> Result<Vec<Institution>> {
        self.get("/api/plaid/items")
    }

    pub fn create_link_token(&self) -> Result<LinkTokenResponse> {
        self.post("/api/plaid/create-link-token", None)
    }

    pub fn exchange_token(&self, exchange: &ExchangeRequest) -> Result<ExchangeResponse> {
        let body = serde_json::to_value(exchange)?;
        self.post("/api/plaid/exchange-token", Some(&body))
    }

    pub fn sync_item(&self, item_id: &str) -> Result<SyncResult> {
        self.post(&format!("/api/plaid/items/{item_id}/sync"), None)
    }

    pub fn sync_all(&self) -> Result<SyncAllResult> {
        self.post("/api/plaid/sync-all", None)
    }

    pub fn remove_item(&self, item_id: &str) -> Result<Value> {
        self.request(Method::DELETE, &format!("/api/plaid/items/{item_id}"), None)
    }

    // --- Dashboard endpoints --------------------------------------------

    pub fn overview(&self) -> Result<Overview> {
        self.get("/api/dashboard/overview")
    }

    pub fn accounts(&self) -> Result<AccountsResponse> {
        self.get("/api/dashboard/accounts")
    }

    /// `query` is the already-encoded filter/pagination query string.
    pub fn transactions(&self, query: &str) -> Result<TransactionPage> {
        if query.is_empty() {
            self.get("/api/dashboard/transactions")
        } else {
            self.get(&format!("/api/dashboard/transactions?{query}"))
        }
    }

    pub fn portfolio(&self) -> Result<PortfolioResponse> {
        self.get("/api/dashboard/portfolio")
    }

    pub fn net_worth(&self, days: u32) -> Result<NetWorthHistory> {
        self.get(&format!("/api/dashboard/net-worth?days={days}"))
    }

    // --- User endpoints -------------------------------------------------

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<Value> {
        let body = serde_json::to_value(update)?;
        self.request(Method::PATCH, "/api/user/profile", Some(&body))
    }

    pub fn change_password(&self, change: &PasswordChange) -> Result<Value> {
        let body = serde_json::to_value(change)?;
        self.request(Method::PATCH, "/api/user/password", Some(&body))
    }

    pub fn delete_account(&self) -> Result<Value> {
        self.request(Method::DELETE, "/api/user/account", None)
    }
}

/// Extract a human-readable message from a JSON error body. The server
/// uses `error` for failures and occasionally `message`; anything else
/// falls back to a generic line carrying the status.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    format!(
        "Request failed: {}",
        status.canonical_reason().unwrap_or("server error")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_error_field() {
        let body = r#"{"error": "Missing public_token"}"#;
        let msg = error_message(StatusCode::BAD_REQUEST, body);
        assert_eq!(msg, "Missing public_token");
    }

    #[test]
    fn test_error_message_falls_back_to_message_field() {
        let body = r#"{"message": "Current password is incorrect"}"#;
        let msg = error_message(StatusCode::BAD_REQUEST, body);
        assert_eq!(msg, "Current password is incorrect");
    }

    #[test]
    fn test_error_message_generic_on_unparseable_body() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(msg, "Request failed: Internal Server Error");
    }

    #[test]
    fn test_error_message_generic_on_empty_fields() {
        let msg = error_message(StatusCode::NOT_FOUND, r#"{"error": ""}"#);
        assert_eq!(msg, "Request failed: Not Found");
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let settings = Settings {
            server_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ApiClient::new(&settings),
            Err(DeckError::Settings(_))
        ));
    }
}
