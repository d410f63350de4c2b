// src/remote/client.rs
// =============================================================================
// The reqwest-backed ContentApi.
//
// One reqwest::Client is built per run and shared by every request. It owns a
// cookie jar, so once the session has logged in every item/listing/media
// request carries the authentication cookie automatically.
//
// Response handling for the item API:
// 1. Read the whole body (even for non-2xx statuses: Sitecore reports its own
//    failures inside the envelope)
// 2. Decode the envelope; failure = FetchError::Decode
// 3. statusCode != 200 inside the envelope = FetchError::RemoteFault
//
// Rust concepts:
// - Arc<Jar>: one cookie jar shared by the client and the login session
// - Streaming response bodies with Response::chunk()
// - Closures as reusable error mappers for map_err
// =============================================================================

use super::session::Session;
use super::types::Envelope;
use super::ContentApi;
use crate::config::Endpoints;
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use url::Url;

// How much of an undecodable body we keep for the error message
const SNIPPET_LEN: usize = 240;

#[derive(Debug, Clone)]
pub struct SitecoreClient {
    http: Client,
    jar: Arc<Jar>,
    endpoints: Endpoints,
}

impl SitecoreClient {
    // Creates the shared HTTP client
    //
    // Parameters:
    //   endpoints: every URL derived from --host
    //   insecure:  accept invalid TLS certificates (self-signed dev boxes)
    pub fn new(endpoints: Endpoints, insecure: bool) -> Result<Self, ConfigError> {
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(SitecoreClient {
            http,
            jar,
            endpoints,
        })
    }

    /// Login/logout handle sharing this client's cookie jar.
    pub fn session(&self) -> Session {
        Session::new(self.http.clone(), self.jar.clone(), self.endpoints.clone())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn item_url(&self, id: &str) -> Url {
        let mut url = self.endpoints.item_api.clone();
        url.query_pairs_mut()
            .append_pair("sc_itemid", id)
            .append_pair("payload", "full");
        url
    }

    fn children_url(&self, id: &str, page: u32, page_size: u32) -> Url {
        let mut url = self.endpoints.item_api.clone();
        url.query_pairs_mut()
            .append_pair("sc_itemid", id)
            .append_pair("payload", "min")
            .append_pair("scope", "c")
            .append_pair("page", &page.to_string())
            .append_pair("pageSize", &page_size.to_string());
        url
    }

    fn media_url(&self, media_key: &str, extension: &str) -> Result<Url, FetchError> {
        let name = format!("{}.{}", media_key, extension);
        self.endpoints
            .media
            .join(&name)
            .map_err(|e| FetchError::transport(&name, e))
    }

    async fn get_envelope(&self, url: Url) -> Result<Envelope, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "item API returned non-success status");
        }

        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                url: url.to_string(),
                status: status.as_u16(),
                message: e.to_string(),
                snippet: snippet(&body),
            })?;

        if envelope.status_code != 200 {
            return Err(FetchError::RemoteFault {
                url: url.to_string(),
                code: envelope.status_code,
                message: envelope.error_message().to_string(),
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl ContentApi for SitecoreClient {
    async fn fetch_item(&self, id: &str) -> Result<Envelope, FetchError> {
        self.get_envelope(self.item_url(id)).await
    }

    async fn fetch_children(
        &self,
        id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Envelope, FetchError> {
        self.get_envelope(self.children_url(id, page, page_size))
            .await
    }

    async fn download_media(
        &self,
        media_key: &str,
        extension: &str,
        target: &Path,
    ) -> Result<u64, FetchError> {
        let url = self.media_url(media_key, extension)?;
        tracing::debug!(url = %url, target = %target.display(), "fetching binary");

        let mut response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(FetchError::transport(
                url.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let fs_error = |source: std::io::Error| FetchError::Filesystem {
            path: target.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(target).await.map_err(fs_error)?;

        let mut written: u64 = 0;
        let copied: Result<(), FetchError> = async {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| FetchError::transport(url.as_str(), e))?
            {
                file.write_all(&chunk).await.map_err(fs_error)?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(fs_error)
        }
        .await;

        if let Err(e) = copied {
            drop(file);
            // A half-written file would be mistaken for a finished one next run
            if let Err(remove_err) = tokio::fs::remove_file(target).await {
                tracing::warn!(path = %target.display(), error = %remove_err, "unable to remove partial binary");
            }
            return Err(e);
        }

        Ok(written)
    }
}

fn snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.into_owned(),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is Arc?
//    - An atomically reference-counted pointer
//    - Cloning it gives another handle to the same Jar, not a copy of the cookies
//
// 2. Why read the media body chunk by chunk?
//    - Memory use stays at one chunk, whatever the file size
//    - bytes() would hold the whole file in memory first
//
// 3. How can `fs_error` be passed to map_err more than once?
//    - It only captures a shared reference (`target`)
//    - Closures whose captures are all Copy are Copy themselves
// -----------------------------------------------------------------------------
