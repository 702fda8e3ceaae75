//! Container source backed by the Firebase Realtime Database REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use binwatch_core::{
    model::{ContainerDocument, RawPair},
    ports::{ContainerSource, FetchError, Resource},
};

/// Database the sensor writes to.
pub const DEFAULT_BASE_URL: &str = "https://iot-waste-06052025-default-rtdb.firebaseio.com";

const CONTAINER_PATH: &str = "Container.json";
const TRASH_PATH: &str = "Trash.json";

/// Reads the `Container` and `Trash` documents of one database.
pub struct FirebaseSource {
    client: Client,
    container_url: String,
    trash_url: String,
}

impl FirebaseSource {
    /// Create a source for the database at `base_url`, bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client,
            container_url: format!("{base}/{CONTAINER_PATH}"),
            trash_url: format!("{base}/{TRASH_PATH}"),
        }
    }

    /// URL of the container document.
    #[must_use]
    pub fn container_url(&self) -> &str {
        &self.container_url
    }

    /// URL of the trash indicator document.
    #[must_use]
    pub fn trash_url(&self) -> &str {
        &self.trash_url
    }
}

#[async_trait]
impl ContainerSource for FirebaseSource {
    async fn fetch(&self) -> Result<RawPair, FetchError> {
        let (container, trash) = tokio::join!(
            fetch_json::<Option<ContainerDocument>>(
                self.client.get(&self.container_url),
                Resource::Container,
            ),
            fetch_json::<Value>(self.client.get(&self.trash_url), Resource::Trash),
        );

        // Status failures win over an empty document, container before trash.
        let container = container?;
        let trash = trash?;
        debug!(?container, %trash, "fetched documents");

        let container = container.ok_or(FetchError::EmptyContainer)?;
        Ok(RawPair { container, trash })
    }
}

// Fetch and decode one JSON document, tagging failures with the resource name.
async fn fetch_json<T: DeserializeOwned>(
    req: RequestBuilder,
    resource: Resource,
) -> Result<T, FetchError> {
    let resp = req
        .send()
        .await
        .map_err(|source| FetchError::Network { resource, source })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            resource,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown Status").to_owned(),
        });
    }

    let body = resp
        .bytes()
        .await
        .map_err(|source| FetchError::Network { resource, source })?;

    serde_json::from_slice(&body).map_err(|err| FetchError::Decode {
        resource,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use binwatch_core::{
        classify::{FillTier, derive},
        clock::SystemClock,
        model::{Connection, Snapshot, TrashKind},
        sync::Synchronizer,
    };
    use mockito::{Mock, Server, ServerGuard};
    use serde_json::json;

    use super::*;

    async fn mock_json(server: &mut ServerGuard, path: &str, status: usize, body: &str) -> Mock {
        server
            .mock("GET", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    fn firebase(server: &ServerGuard) -> FirebaseSource {
        FirebaseSource::new(Client::new(), &server.url())
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let source = FirebaseSource::new(Client::new(), "https://example.firebaseio.com/");
        assert_eq!(
            source.container_url(),
            "https://example.firebaseio.com/Container.json"
        );
        assert_eq!(source.trash_url(), "https://example.firebaseio.com/Trash.json");
    }

    #[tokio::test]
    async fn returns_raw_documents() {
        let mut server = Server::new_async().await;
        let container = mock_json(
            &mut server,
            "/Container.json",
            200,
            r#"{"Price":-12,"Weight":-430}"#,
        )
        .await;
        let trash = mock_json(&mut server, "/Trash.json", 200, "1").await;

        let raw = firebase(&server).fetch().await.expect("fetch succeeds");

        assert_eq!(
            raw.container,
            ContainerDocument {
                price: Some(-12.0),
                weight: Some(-430.0),
            }
        );
        assert_eq!(raw.trash, json!(1));
        container.assert_async().await;
        trash.assert_async().await;
    }

    #[tokio::test]
    async fn null_trash_is_passed_through() {
        let mut server = Server::new_async().await;
        let _container =
            mock_json(&mut server, "/Container.json", 200, r#"{"Weight":55}"#).await;
        let _trash = mock_json(&mut server, "/Trash.json", 200, "null").await;

        let raw = firebase(&server).fetch().await.expect("fetch succeeds");
        assert_eq!(raw.container.price, None);
        assert_eq!(raw.trash, Value::Null);
    }

    #[tokio::test]
    async fn container_status_error_names_resource_and_code() {
        let mut server = Server::new_async().await;
        let _container = mock_json(&mut server, "/Container.json", 500, "{}").await;
        let _trash = mock_json(&mut server, "/Trash.json", 200, "1").await;

        let err = firebase(&server).fetch().await.expect_err("status error");
        assert!(matches!(
            err,
            FetchError::HttpStatus {
                resource: Resource::Container,
                status: 500,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Failed to fetch container data: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn trash_status_error_discards_container() {
        let mut server = Server::new_async().await;
        let _container =
            mock_json(&mut server, "/Container.json", 200, r#"{"Price":1,"Weight":2}"#).await;
        let _trash = mock_json(&mut server, "/Trash.json", 404, "null").await;

        let err = firebase(&server).fetch().await.expect_err("status error");
        assert!(matches!(
            err,
            FetchError::HttpStatus {
                resource: Resource::Trash,
                status: 404,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn container_failure_reported_when_both_fail() {
        let mut server = Server::new_async().await;
        let _container = mock_json(&mut server, "/Container.json", 503, "null").await;
        let _trash = mock_json(&mut server, "/Trash.json", 500, "null").await;

        let err = firebase(&server).fetch().await.expect_err("status error");
        assert!(matches!(
            err,
            FetchError::HttpStatus {
                resource: Resource::Container,
                status: 503,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn trash_status_error_wins_over_null_container() {
        let mut server = Server::new_async().await;
        let _container = mock_json(&mut server, "/Container.json", 200, "null").await;
        let _trash = mock_json(&mut server, "/Trash.json", 500, "null").await;

        let err = firebase(&server).fetch().await.expect_err("status error");
        assert!(matches!(
            err,
            FetchError::HttpStatus {
                resource: Resource::Trash,
                status: 500,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Failed to fetch trash data: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn string_readings_are_read_as_numbers() {
        let mut server = Server::new_async().await;
        let _container = mock_json(
            &mut server,
            "/Container.json",
            200,
            r#"{"Price":"12","Weight":"abc"}"#,
        )
        .await;
        let _trash = mock_json(&mut server, "/Trash.json", 200, "0").await;

        let raw = firebase(&server).fetch().await.expect("fetch succeeds");
        assert_eq!(raw.container.price, Some(12.0));
        assert_eq!(raw.container.weight, None);
    }

    #[tokio::test]
    async fn null_container_is_an_error() {
        let mut server = Server::new_async().await;
        let _container = mock_json(&mut server, "/Container.json", 200, "null").await;
        let _trash = mock_json(&mut server, "/Trash.json", 200, "0").await;

        let err = firebase(&server).fetch().await.expect_err("empty container");
        assert!(matches!(err, FetchError::EmptyContainer));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = Server::new_async().await;
        let _container = mock_json(&mut server, "/Container.json", 200, "<html>").await;
        let _trash = mock_json(&mut server, "/Trash.json", 200, "0").await;

        let err = firebase(&server).fetch().await.expect_err("decode error");
        assert!(matches!(
            err,
            FetchError::Decode {
                resource: Resource::Container,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let source = FirebaseSource::new(Client::new(), "http://127.0.0.1:1");

        let err = source.fetch().await.expect_err("connection refused");
        assert!(matches!(
            err,
            FetchError::Network {
                resource: Resource::Container,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn synchronizer_keeps_reading_when_store_goes_down() {
        let mut server = Server::new_async().await;
        let container = mock_json(
            &mut server,
            "/Container.json",
            200,
            r#"{"Price":-12,"Weight":-430}"#,
        )
        .await;
        let trash = mock_json(&mut server, "/Trash.json", 200, "1").await;

        let sync = Synchronizer::new(Arc::new(firebase(&server)), Arc::new(SystemClock));
        sync.refresh_now().await.expect("fetch succeeds");

        let expected = Snapshot {
            price: -12.0,
            weight: -430.0,
            trash_kind: TrashKind::Dry,
        };
        assert_eq!(sync.state().snapshot, expected);
        assert_eq!(derive(&expected).fill_tier, FillTier::Critical);

        container.remove_async().await;
        trash.remove_async().await;
        let _container = mock_json(&mut server, "/Container.json", 500, "{}").await;
        let _trash = mock_json(&mut server, "/Trash.json", 200, "1").await;

        sync.refresh_now().await.expect_err("store is down");
        let state = sync.state();
        assert_eq!(state.snapshot, expected);
        assert_eq!(state.status.connection, Connection::Disconnected);
        assert!(
            state.status.last_error.as_deref().is_some_and(|msg| msg.contains("500")),
            "status code surfaced"
        );
    }
}
