//! Cloudflare Images REST client
//!
//! Wraps the account-scoped `images/v1` and `images/v2` endpoints used by the
//! migration jobs: upload (by URL or bytes), list, get, patch metadata, delete.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use ventdir_core::SiteConfig;

pub const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Images per page on the v1 list endpoint
pub const LIST_PAGE_SIZE: u32 = 100;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

#[derive(Debug, thiserror::Error)]
pub enum CloudflareError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudflare API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to download image: HTTP {status}")]
    Download { status: u16 },
}

impl CloudflareError {
    /// Upstream refused the fetch; Cloudflare reports Google 403s in the message.
    pub fn is_forbidden(&self) -> bool {
        match self {
            Self::Api { status, message } => *status == 403 || message.contains("403"),
            Self::Download { status } => *status == 403,
            Self::Http(e) => e.status() == Some(StatusCode::FORBIDDEN),
        }
    }

    /// Network failures and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_connect()
                    || e.is_timeout()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::Api { status, .. } | Self::Download { status } => *status >= 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn error_message(&self, status: StatusCode) -> String {
        let joined = self
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            joined
        }
    }
}

/// One stored image
#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareImage {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, alias = "metadata")]
    pub meta: Option<Map<String, Value>>,
    #[serde(default)]
    pub uploaded: Option<String>,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl CloudflareImage {
    pub fn site(&self) -> Option<&str> {
        self.meta.as_ref()?.get("site")?.as_str()
    }
}

#[derive(Debug, Deserialize)]
struct ImageList {
    #[serde(default)]
    images: Vec<CloudflareImage>,
}

/// Page from the cursor-based v2 list endpoint
#[derive(Debug, Deserialize)]
pub struct ImageListV2 {
    #[serde(default)]
    pub images: Vec<CloudflareImage>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

pub struct CloudflareClient {
    http: Client,
    api_token: String,
    images_url: String,
}

impl CloudflareClient {
    pub fn new(account_id: &str, api_token: impl Into<String>) -> Result<Self, CloudflareError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            api_token: api_token.into(),
            images_url: format!("{API_BASE}/accounts/{account_id}/images"),
        })
    }

    pub fn from_config(config: &SiteConfig) -> anyhow::Result<Self> {
        let (account_id, token) = config.cloudflare_credentials()?;
        Ok(Self::new(account_id, token)?)
    }

    fn v1(&self, path: &str) -> String {
        format!("{}/v1{}", self.images_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CloudflareError> {
        let response = request.bearer_auth(&self.api_token).send().await?;
        let status = response.status();

        let envelope: Envelope<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(CloudflareError::Api {
                    status: status.as_u16(),
                    message: format!("HTTP {}", status.as_u16()),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() || !envelope.success {
            return Err(CloudflareError::Api {
                status: status.as_u16(),
                message: envelope.error_message(status),
            });
        }
        envelope.result.ok_or(CloudflareError::Api {
            status: status.as_u16(),
            message: "response had no result".to_string(),
        })
    }

    async fn upload(&self, form: Form) -> Result<String, CloudflareError> {
        let image: CloudflareImage = self.send(self.http.post(self.v1("")).multipart(form)).await?;
        debug!(id = %image.id, "uploaded image");
        Ok(image.id)
    }

    /// Cloudflare fetches `url` itself. Returns the new image id.
    pub async fn upload_from_url(&self, url: &str, metadata: &Value) -> Result<String, CloudflareError> {
        let form = Form::new()
            .text("url", url.to_string())
            .text("metadata", metadata.to_string());
        self.upload(form).await
    }

    /// Upload already downloaded JPEG bytes. Returns the new image id.
    pub async fn upload_bytes(&self, bytes: Vec<u8>, metadata: &Value) -> Result<String, CloudflareError> {
        let file = Part::bytes(bytes)
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .part("file", file)
            .text("metadata", metadata.to_string());
        self.upload(form).await
    }

    pub async fn list_page(&self, page: u32, per_page: u32) -> Result<Vec<CloudflareImage>, CloudflareError> {
        let request = self
            .http
            .get(self.v1(""))
            .query(&[("page", page), ("per_page", per_page)]);
        let list: ImageList = self.send(request).await?;
        Ok(list.images)
    }

    /// Every image in the account, paging until a short page.
    pub async fn list_all(&self) -> Result<Vec<CloudflareImage>, CloudflareError> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let images = self.list_page(page, LIST_PAGE_SIZE).await?;
            let count = images.len();
            all.extend(images);
            debug!(page, count, total = all.len(), "listed images");
            if count < LIST_PAGE_SIZE as usize {
                return Ok(all);
            }
            page += 1;
        }
    }

    pub async fn list_v2(&self) -> Result<ImageListV2, CloudflareError> {
        let url = format!("{}/v2", self.images_url);
        self.send(self.http.get(url)).await
    }

    pub async fn get_image(&self, id: &str) -> Result<CloudflareImage, CloudflareError> {
        self.send(self.http.get(self.v1(&format!("/{id}")))).await
    }

    /// Replace the image's metadata object.
    pub async fn update_metadata(&self, id: &str, metadata: &Map<String, Value>) -> Result<CloudflareImage, CloudflareError> {
        let request = self
            .http
            .patch(self.v1(&format!("/{id}")))
            .json(&json!({ "metadata": metadata }));
        self.send(request).await
    }

    pub async fn delete_image(&self, id: &str) -> Result<(), CloudflareError> {
        let _: Value = self.send(self.http.delete(self.v1(&format!("/{id}")))).await?;
        Ok(())
    }
}

/// Fetches source images the way a browser would, optionally via a proxy.
pub struct ImageDownloader {
    http: Client,
}

impl ImageDownloader {
    pub fn new(proxy: Option<&str>) -> Result<Self, CloudflareError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    pub async fn download(&self, url: &str) -> Result<Vec<u8>, CloudflareError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CloudflareError::Download {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
