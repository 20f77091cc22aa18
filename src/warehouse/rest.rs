//! Snowflake REST API v2 client using `reqwest`.

use crate::config::{SnowflakeConfig, TokenType};
use crate::error::{WarehouseError, WarehouseResult};
use crate::warehouse::client::WarehouseClient;
use crate::warehouse::types::{CollectionPath, CreateMode, DropOptions, ObjectPayload, RemoteObject};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Warehouse client speaking the Snowflake REST API.
pub struct RestWarehouseClient {
    http: Client,
    base: Url,
    token: String,
    token_type: TokenType,
    role: Option<String>,
    warehouse: Option<String>,
    timeout: Duration,
}

impl RestWarehouseClient {
    pub fn new(config: &SnowflakeConfig) -> WarehouseResult<Self> {
        let base = Url::parse(&config.base_url())
            .map_err(|e| WarehouseError::NotConnected(format!("invalid host '{}': {}", config.host, e)))?;
        if base.cannot_be_a_base() {
            return Err(WarehouseError::NotConnected(format!(
                "invalid host '{}'",
                config.host
            )));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("snowflake-object-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WarehouseError::NotConnected(e.to_string()))?;

        info!("Snowflake REST client ready for {}", base);

        Ok(Self {
            http,
            base,
            token: config.token.clone(),
            token_type: config.token_type,
            role: config.role.clone(),
            warehouse: config.warehouse.clone(),
            timeout: config.request_timeout,
        })
    }

    /// `/api/v2/<collection path>[/<item>]`. Collection names use hyphens on the wire.
    fn url(&self, collection: &CollectionPath, item: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "v2"]);
            for segment in collection.segments() {
                segments.push(&segment.collection.replace('_', "-"));
                if let Some(item) = &segment.item {
                    segments.push(item);
                }
            }
            if let Some(item) = item {
                segments.push(item);
            }
        }
        url
    }

    fn statements_url(&self) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "v2", "statements"]);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> WarehouseResult<Response> {
        let response = request
            .bearer_auth(&self.token)
            .header(TOKEN_TYPE_HEADER, self.token_type.header_value())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
        let (code, message) = match parsed {
            Some(ApiErrorBody { code, message: Some(message) }) => (code, message),
            Some(ApiErrorBody { code, message: None }) => (code, truncate(&body)),
            None => (None, truncate(&body)),
        };
        debug!("Snowflake API returned {}: {}", status, message);

        if status == StatusCode::NOT_FOUND {
            return Err(WarehouseError::NotFound(message));
        }
        Err(WarehouseError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn list_all(
        &self,
        collection: &CollectionPath,
        like: Option<&str>,
    ) -> WarehouseResult<Vec<RemoteObject>> {
        let mut request = self.http.get(self.url(collection, None));
        if let Some(pattern) = like {
            request = request.query(&[("like", pattern)]);
        }
        let response = self.send(request).await?;
        response
            .json::<Vec<RemoteObject>>()
            .await
            .map_err(|e| WarehouseError::Decode(e.to_string()))
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}

#[async_trait]
impl WarehouseClient for RestWarehouseClient {
    fn name(&self) -> &'static str {
        "snowflake-rest"
    }

    #[instrument(skip(self, collection, payload), fields(collection = %collection))]
    async fn create(
        &self,
        collection: &CollectionPath,
        payload: &ObjectPayload,
        mode: CreateMode,
    ) -> WarehouseResult<()> {
        let request = self
            .http
            .post(self.url(collection, None))
            .query(&[("createMode", mode.as_str())])
            .json(payload);
        self.send(request).await?;
        Ok(())
    }

    fn iter<'a>(
        &'a self,
        collection: &'a CollectionPath,
        like: Option<&'a str>,
    ) -> BoxStream<'a, WarehouseResult<RemoteObject>> {
        // One page per listing call; items are yielded lazily from it.
        stream::once(self.list_all(collection, like))
            .flat_map(|page| {
                let items: Vec<WarehouseResult<RemoteObject>> = match page {
                    Ok(items) => items.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed()
    }

    #[instrument(skip(self, collection), fields(collection = %collection))]
    async fn fetch(&self, collection: &CollectionPath, name: &str) -> WarehouseResult<Value> {
        let response = self.send(self.http.get(self.url(collection, Some(name)))).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| WarehouseError::Decode(e.to_string()))
    }

    #[instrument(skip(self, collection), fields(collection = %collection))]
    async fn drop_object(
        &self,
        collection: &CollectionPath,
        name: &str,
        options: DropOptions,
    ) -> WarehouseResult<()> {
        let mut request = self
            .http
            .delete(self.url(collection, Some(name)))
            .query(&[("ifExists", options.if_exists)]);
        if options.cascade {
            request = request.query(&[("restrict", false)]);
        }
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self, statement))]
    async fn execute(&self, statement: &str) -> WarehouseResult<()> {
        let mut body = json!({
            "statement": statement,
            "timeout": self.timeout.as_secs(),
        });
        if let Some(role) = &self.role {
            body["role"] = Value::String(role.clone());
        }
        if let Some(warehouse) = &self.warehouse {
            body["warehouse"] = Value::String(warehouse.clone());
        }
        self.send(self.http.post(self.statements_url()).json(&body)).await?;
        Ok(())
    }
}
