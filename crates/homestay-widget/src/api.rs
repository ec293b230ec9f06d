use std::future::Future;

use serde::Deserialize;
use serde_json::json;

use crate::error::WidgetError;

/// Body of a favourites endpoint response. Every field is optional so that
/// partial or legacy (`{ "error": ... }`) bodies still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_favourite: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` when the body was not JSON.
    pub body: Option<FavouriteEnvelope>,
}

impl ApiResponse {
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Why the call failed, or `None` if it succeeded.
    pub fn failure_message(&self) -> Option<String> {
        let ok_status = (200..300).contains(&self.status);
        let reported_failure = self.body.as_ref().and_then(|b| b.success) == Some(false);
        if ok_status && !reported_failure {
            return None;
        }
        let message = self
            .body
            .as_ref()
            .and_then(|b| b.message.clone().or_else(|| b.error.clone()));
        Some(message.unwrap_or_else(|| format!("Request failed ({})", self.status)))
    }
}

/// The server calls the widget makes.
pub trait FavouritesApi {
    fn check_session(&self) -> impl Future<Output = Result<bool, WidgetError>> + Send;

    fn add(&self, listing_id: &str) -> impl Future<Output = Result<ApiResponse, WidgetError>> + Send;

    fn remove(&self, listing_id: &str) -> impl Future<Output = Result<ApiResponse, WidgetError>> + Send;

    fn toggle(&self, listing_id: &str) -> impl Future<Output = Result<ApiResponse, WidgetError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionStatus {
    logged_in: bool,
}

/// [`FavouritesApi`] over HTTP. Cookies are kept between calls, so a
/// successful [`login`](Self::login) authenticates later requests.
#[derive(Debug, Clone)]
pub struct HttpFavouritesApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFavouritesApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WidgetError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(WidgetError::BaseUrl(base_url));
        }
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `/favourites/delete/<id>` with the id escaped as a single segment.
    fn delete_url(&self, listing_id: &str) -> Result<reqwest::Url, WidgetError> {
        if matches!(listing_id, "" | "." | "..") {
            return Err(WidgetError::ListingId(listing_id.to_string()));
        }
        let mut url = reqwest::Url::parse(&self.url("/favourites/delete"))
            .map_err(|_| WidgetError::BaseUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|()| WidgetError::BaseUrl(self.base_url.clone()))?
            .push(listing_id);
        Ok(url)
    }

    /// Returns whether the server accepted the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, WidgetError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    async fn post(
        &self,
        url: impl reqwest::IntoUrl,
        home_id: Option<&str>,
    ) -> Result<ApiResponse, WidgetError> {
        let mut request = self.client.post(url);
        if let Some(home_id) = home_id {
            request = request.json(&json!({ "homeId": home_id }));
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = match response.json::<FavouriteEnvelope>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(status, "Non-JSON response from server: {e}");
                None
            }
        };
        Ok(ApiResponse { status, body })
    }
}

impl FavouritesApi for HttpFavouritesApi {
    async fn check_session(&self) -> Result<bool, WidgetError> {
        let status: SessionStatus = self
            .client
            .get(self.url("/api/check-session"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(status.logged_in)
    }

    async fn add(&self, listing_id: &str) -> Result<ApiResponse, WidgetError> {
        self.post(self.url("/favourites"), Some(listing_id)).await
    }

    async fn remove(&self, listing_id: &str) -> Result<ApiResponse, WidgetError> {
        self.post(self.delete_url(listing_id)?, None).await
    }

    async fn toggle(&self, listing_id: &str) -> Result<ApiResponse, WidgetError> {
        self.post(self.url("/favourites/toggle"), Some(listing_id)).await
    }
}
