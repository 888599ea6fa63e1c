//! HTTP implementation of [`ForumApi`] on top of `reqwest`.
//!
//! Every call follows the same shape: build the URL from the configured base,
//! send, treat any non-2xx status as failure, then unwrap the `{message,
//! status, data}` envelope. Timeouts are owned by the underlying client.

use crate::api::backend::ForumApi;
use crate::api::models::{
    ApiEnvelope, CommentRecord, CommentReplyRequest, CommentRequest, CreatePostRequest,
    NookRecord, PostRecord, ReactionRequest,
};
use crate::domain::error::{FesnukError, Result};
use crate::domain::{CommentId, PostId};
use crate::Config;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header Azure blob storage requires on single-shot uploads.
const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";

/// The only blob type the client writes.
const BLOCK_BLOB: &str = "BlockBlob";

/// `reqwest`-backed forum API client.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted and keeps
/// one connection pool for all requests.
#[derive(Debug, Clone)]
pub struct HttpForumApi {
    client: Client,
    base_url: Url,
}

impl HttpForumApi {
    /// Creates a client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FesnukError::Config`] if the base URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = normalize_base_url(&config.api_base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FesnukError::Config(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(base_url = %base_url, timeout_secs = config.request_timeout_secs, "http api client ready");

        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint path is joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FesnukError::Config(format!("invalid endpoint {path}: {e}")))
    }

    /// Sends a request and decodes the envelope's `data`, which must be present.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = Self::send(request).await?;
        decode_data(&body)
    }

    /// Sends a request and decodes a list, treating a missing body as empty.
    async fn fetch_list<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>> {
        let body = Self::send(request).await?;
        decode_list(&body)
    }

    /// Sends a request whose response body is irrelevant.
    async fn acknowledge(&self, request: RequestBuilder) -> Result<()> {
        Self::send(request).await.map(|_| ())
    }

    async fn send(request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %response.url(), "request failed");
            return Err(FesnukError::Status {
                code: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ForumApi for HttpForumApi {
    async fn list_nooks(&self) -> Result<Vec<NookRecord>> {
        let url = self.endpoint("nooks")?;
        self.fetch(self.client.get(url)).await
    }

    async fn get_nook(&self, nook_id: &str) -> Result<NookRecord> {
        let url = self.endpoint(&format!("nooks/{nook_id}"))?;
        self.fetch(self.client.get(url)).await
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>> {
        let url = self.endpoint("posts")?;
        self.fetch(self.client.get(url)).await
    }

    async fn list_posts_by_nook(&self, nook_id: &str) -> Result<Vec<PostRecord>> {
        let url = self.endpoint(&format!("posts/nook/{nook_id}"))?;
        self.fetch(self.client.get(url)).await
    }

    async fn get_post(&self, post_id: PostId) -> Result<PostRecord> {
        let url = self.endpoint(&format!("posts/{post_id}"))?;
        self.fetch(self.client.get(url)).await
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<PostRecord> {
        let url = self.endpoint("posts")?;
        self.fetch(self.client.post(url).json(request)).await
    }

    async fn react(&self, request: &ReactionRequest) -> Result<()> {
        let url = self.endpoint("posts/react")?;
        self.acknowledge(self.client.post(url).json(request)).await
    }

    async fn post_comment(&self, request: &CommentRequest) -> Result<()> {
        let url = self.endpoint("comments")?;
        self.acknowledge(self.client.post(url).json(request)).await
    }

    async fn reply_to_comment(&self, request: &CommentReplyRequest) -> Result<()> {
        let url = self.endpoint("comments/reply")?;
        self.acknowledge(self.client.post(url).json(request)).await
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentRecord>> {
        let url = self.endpoint(&format!("comments/post/{post_id}"))?;
        self.fetch_list(self.client.get(url)).await
    }

    async fn list_replies(&self, comment_id: CommentId) -> Result<Vec<CommentRecord>> {
        let url = self.endpoint(&format!("comments/{comment_id}/replies"))?;
        self.fetch_list(self.client.get(url)).await
    }

    async fn upload_file(&self, url: &str, bytes: Vec<u8>) -> Result<()> {
        let url = Url::parse(url)
            .map_err(|e| FesnukError::Config(format!("invalid upload url: {e}")))?;
        let request = self
            .client
            .put(url)
            .header(BLOB_TYPE_HEADER, BLOCK_BLOB)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        self.acknowledge(request).await
    }
}

/// Parses the base URL and makes sure it ends with `/` so `join` appends.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|e| FesnukError::Config(format!("invalid api_base_url {raw}: {e}")))
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Unwraps the envelope of a response whose `data` is required.
pub(crate) fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if is_blank(body) {
        return Err(FesnukError::EmptyBody);
    }
    let envelope: ApiEnvelope<T> = serde_json::from_slice(body)?;
    envelope.data.ok_or(FesnukError::EmptyBody)
}

/// Unwraps a list envelope; no body or `null` data means no items.
pub(crate) fn decode_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    if is_blank(body) {
        return Ok(Vec::new());
    }
    let envelope: ApiEnvelope<Vec<T>> = serde_json::from_slice(body)?;
    Ok(envelope.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base_url("https://api.example.com/v1").unwrap();
        assert_eq!(url.join("posts").unwrap().as_str(), "https://api.example.com/v1/posts");
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn client_joins_nested_paths() {
        let config = Config {
            api_base_url: "http://localhost:8080".to_string(),
            ..Config::default()
        };
        let api = HttpForumApi::new(&config).unwrap();
        let url = api.endpoint("comments/7/replies").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/comments/7/replies");
    }

    #[test]
    fn required_data_rejects_empty_and_null() {
        assert!(matches!(decode_data::<NookRecord>(b""), Err(FesnukError::EmptyBody)));
        assert!(matches!(
            decode_data::<NookRecord>(br#"{"message":"ok","status":200,"data":null}"#),
            Err(FesnukError::EmptyBody)
        ));
        assert!(matches!(decode_data::<NookRecord>(b"<html>"), Err(FesnukError::Decode(_))));
    }

    #[test]
    fn required_data_decodes_records() {
        let body = br#"{"message":"ok","status":200,"data":{"id":"n1","name":"Rust","description":"crabs","created_at":"","updated_at":""}}"#;
        let nook: NookRecord = decode_data(body).unwrap();
        assert_eq!(nook.name, "Rust");
    }

    #[test]
    fn lists_default_to_empty() {
        assert!(decode_list::<CommentRecord>(b"  ").unwrap().is_empty());
        let body = br#"{"message":"ok","status":200,"data":null}"#;
        assert!(decode_list::<CommentRecord>(body).unwrap().is_empty());
    }
}
