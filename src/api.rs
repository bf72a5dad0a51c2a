//! Typed binding to the remote feed registry.
//!
//! The registry exposes a single collection resource under `feed`:
//! `GET feed` lists, `POST feed` creates, `PUT feed/{name}` replaces the
//! mutable fields of one entry, `DELETE feed/{name}` flags one entry for the
//! server-side deletion sweep. [`FeedClient`] wraps exactly these calls and
//! nothing else; it never touches UI state.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// ============================================================================
// Wire Types
// ============================================================================

/// A single named subscription as stored by the registry.
///
/// `name` is the unique key and never changes after creation; everything else
/// is mutable through the edit form. The server serializes additional
/// bookkeeping fields (last-modified date, download state) which this client
/// ignores and never sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub name: String,
    pub url: String,
    pub content_type: String,
    #[serde(default)]
    pub marked_for_deletion: bool,
}

/// Payload for creating a feed. The server fills in everything else
/// (content type detection, deletion flag default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFeed {
    pub name: String,
    pub url: String,
}

/// The mutable field set of a feed, as captured by the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPatch {
    pub url: String,
    pub content_type: String,
    pub marked_for_deletion: bool,
}

impl FeedPatch {
    /// Join the patch with its immutable key to form the full wire body
    /// expected by `PUT feed/{name}`.
    pub fn into_feed(self, name: String) -> Feed {
        Feed {
            name,
            url: self.url,
            content_type: self.content_type,
            marked_for_deletion: self.marked_for_deletion,
        }
    }
}

/// Error body the registry returns on rejected input.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors crossing the registry boundary.
///
/// `Rejected` is the validation class: the server understood the request and
/// refused it, with a human-readable message shown to the user verbatim.
/// `Network` and `Status` are the transport class; no structured message is
/// guaranteed for either.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the input (duplicate name, malformed URL, ...).
    #[error("{0}")]
    Rejected(String),
    /// Connection, TLS, timeout, or body-decode failure.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response without a parseable error body.
    #[error("server returned status {0}")]
    Status(u16),
}

/// The configured base URL cannot serve as a base for the collection path
/// (e.g. `mailto:` or other cannot-be-a-base schemes).
#[derive(Debug, Error)]
#[error("not a usable registry base URL: {0}")]
pub struct InvalidBaseUrl(pub Url);

// ============================================================================
// Client
// ============================================================================

/// HTTP client rooted at the registry's `feed` collection.
///
/// Cheap to clone (the inner reqwest client is reference-counted), which is
/// how submits travel into spawned tasks.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    collection: Url,
}

impl FeedClient {
    /// Build a client for the registry at `base`.
    ///
    /// The collection URL is derived once here; a trailing slash is enforced
    /// so joining does not drop the base path's last segment.
    pub fn new(http: reqwest::Client, base: Url) -> Result<Self, InvalidBaseUrl> {
        if base.cannot_be_a_base() {
            return Err(InvalidBaseUrl(base));
        }

        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let collection = match base.join("feed") {
            Ok(url) => url,
            Err(_) => return Err(InvalidBaseUrl(base)),
        };

        Ok(Self { http, collection })
    }

    /// URL of a single entry, with the name percent-encoded as a path segment.
    fn item(&self, name: &str) -> Url {
        let mut url = self.collection.clone();
        // Cannot fail: the base was validated in new().
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(name);
        }
        url
    }

    /// Fetch the whole collection.
    pub async fn list(&self) -> Result<Vec<Feed>, ApiError> {
        let resp = self.http.get(self.collection.clone()).send().await?;
        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    /// Submit a new feed and return the canonical stored record, which may
    /// differ from the draft (server-normalized fields).
    pub async fn create(&self, draft: &NewFeed) -> Result<Feed, ApiError> {
        tracing::debug!(name = %draft.name, "Creating feed");
        let resp = self
            .http
            .post(self.collection.clone())
            .json(draft)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    /// Replace the mutable fields of the feed identified by `name`.
    ///
    /// The response body is not relied upon beyond confirming the operation.
    pub async fn update(&self, name: &str, feed: &Feed) -> Result<(), ApiError> {
        tracing::debug!(name = %name, "Updating feed");
        let resp = self.http.put(self.item(name)).json(feed).send().await?;
        check(resp).await?;
        Ok(())
    }

    /// Flag the feed for the server-side deletion sweep. Advisory only: the
    /// entry stays in the collection until the server acts on the flag.
    pub async fn mark_deleted(&self, name: &str) -> Result<(), ApiError> {
        tracing::debug!(name = %name, "Marking feed for deletion");
        let resp = self.http.delete(self.item(name)).send().await?;
        check(resp).await?;
        Ok(())
    }
}

/// Map a non-2xx response to an [`ApiError`].
///
/// 4xx responses carrying a JSON `{message}` body become `Rejected`; anything
/// else collapses to `Status`.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    if status.is_client_error() {
        if let Ok(body) = resp.json::<ErrorBody>().await {
            return Err(ApiError::Rejected(body.message));
        }
    }
    Err(ApiError::Status(status.as_u16()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str) -> FeedClient {
        let base = Url::parse(uri).unwrap();
        FeedClient::new(reqwest::Client::new(), base).unwrap()
    }

    #[test]
    fn test_item_url_percent_encodes_name() {
        let client = client_for("http://localhost:8080/");
        let url = client.item("my feed/one");
        assert_eq!(url.as_str(), "http://localhost:8080/feed/my%20feed%2Fone");
    }

    #[test]
    fn test_base_without_trailing_slash_keeps_path() {
        let client = client_for("http://localhost:8080/registry");
        assert_eq!(
            client.collection.as_str(),
            "http://localhost:8080/registry/feed"
        );
    }

    #[test]
    fn test_cannot_be_a_base_rejected() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        assert!(FeedClient::new(reqwest::Client::new(), base).is_err());
    }

    #[tokio::test]
    async fn test_list_ignores_unknown_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "name": "news",
                "url": "http://example.com/rss",
                "contentType": "application/rss+xml",
                "markedForDeletion": false,
                "lastModified": "2020-01-01T00:00:00Z",
                "allFilesUpdated": true
            }])))
            .mount(&server)
            .await;

        let feeds = client_for(&server.uri()).list().await.unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].name, "news");
        assert_eq!(feeds[0].content_type, "application/rss+xml");
        assert!(!feeds[0].marked_for_deletion);
    }

    #[tokio::test]
    async fn test_create_returns_canonical_record() {
        let server = MockServer::start().await;
        let draft = NewFeed {
            name: "news".into(),
            url: "http://example.com/rss".into(),
        };
        Mock::given(method("POST"))
            .and(path("/feed"))
            .and(body_json(serde_json::json!({
                "name": "news",
                "url": "http://example.com/rss"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "news",
                "url": "http://example.com/rss",
                "contentType": "application/rss+xml",
                "markedForDeletion": false
            })))
            .mount(&server)
            .await;

        let created = client_for(&server.uri()).create(&draft).await.unwrap();
        assert_eq!(created.name, "news");
        assert_eq!(created.content_type, "application/rss+xml");
    }

    #[tokio::test]
    async fn test_create_rejection_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({"message": "name already exists"})),
            )
            .mount(&server)
            .await;

        let draft = NewFeed {
            name: "news".into(),
            url: "http://example.com/rss".into(),
        };
        let err = client_for(&server.uri()).create(&draft).await.unwrap_err();
        match err {
            ApiError::Rejected(msg) => assert_eq!(msg, "name already exists"),
            e => panic!("Expected Rejected, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_client_error_without_body_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).list().await.unwrap_err();
        match err {
            ApiError::Status(404) => {}
            e => panic!("Expected Status(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/feed/news"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let feed = Feed {
            name: "news".into(),
            url: "http://example.com/rss".into(),
            content_type: "application/rss+xml".into(),
            marked_for_deletion: false,
        };
        let err = client_for(&server.uri())
            .update("news", &feed)
            .await
            .unwrap_err();
        match err {
            ApiError::Status(500) => {}
            e => panic!("Expected Status(500), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_hits_encoded_item_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/feed/daily%20news"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let feed = Feed {
            name: "daily news".into(),
            url: "http://example.com/rss".into(),
            content_type: "application/rss+xml".into(),
            marked_for_deletion: false,
        };
        client_for(&server.uri())
            .update("daily news", &feed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_deleted_sends_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/feed/news"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server.uri()).mark_deleted("news").await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_network() {
        // Nothing listens here; reqwest fails at connect time.
        let client = client_for("http://127.0.0.1:1/");
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
