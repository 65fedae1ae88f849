//! Resilient client for the GitHub GraphQL (v4) and REST (v3) APIs.
//!
//! Every request passes through one shared concurrency gate. Transport-level
//! failures fall back once to a synchronous client; a still-failing request
//! degrades to an empty result. Nothing past this boundary raises for
//! transport reasons, so callers must treat empty as "no data this round".

pub mod queries;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;
use console::style;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("octostat/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Polling bounds for resources the service materializes asynchronously
/// (HTTP 202 means "accepted, not ready").
const MAX_POLL_ATTEMPTS: u32 = 60;
const POLL_DELAY: Duration = Duration::from_secs(2);

pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Seam between the statistics layer and the network. The scripted fake in
/// the test support module implements this too.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST one document to the structured query endpoint. Returns
    /// `Value::Null` when both transports fail.
    async fn graphql(&self, query: &str) -> Value;

    /// GET a resource path, polling through "not ready yet" responses.
    /// Returns `Value::Null` on failure or poll exhaustion.
    async fn rest(&self, path: &str, params: &[(String, String)]) -> Value;
}

enum RestOutcome {
    Ready(Value),
    NotReady,
    Failed,
}

pub struct Client {
    http: reqwest::Client,
    token: String,
    gate: Arc<Semaphore>,
    base: String,
}

impl Client {
    pub fn new(token: String, max_connections: usize) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            token,
            gate: Arc::new(Semaphore::new(max_connections.max(1))),
            base: API_BASE.to_string(),
        })
    }

    fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    async fn graphql_primary(&self, body: &Value) -> Option<Value> {
        let _permit = self.gate.acquire().await.ok()?;
        let response = self
            .http
            .post(self.graphql_url())
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .ok()?;
        response.json::<Value>().await.ok()
    }

    /// Retry over the synchronous transport after the async client failed.
    async fn graphql_fallback(&self, body: Value) -> Option<Value> {
        let _permit = self.gate.acquire().await.ok()?;
        let url = self.graphql_url();
        let token = self.token.clone();
        tokio::task::spawn_blocking(move || -> Option<Value> {
            let client = reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .ok()?;
            client
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .ok()?
                .json::<Value>()
                .ok()
        })
        .await
        .ok()
        .flatten()
    }

    async fn rest_primary(&self, url: &str, params: &[(String, String)]) -> RestOutcome {
        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => return RestOutcome::Failed,
        };
        let request = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
            .query(params);
        match request.send().await {
            Ok(response) if response.status() == reqwest::StatusCode::ACCEPTED => {
                RestOutcome::NotReady
            }
            Ok(response) => match response.json::<Value>().await {
                Ok(value) => RestOutcome::Ready(value),
                Err(_) => RestOutcome::Failed,
            },
            Err(_) => RestOutcome::Failed,
        }
    }

    async fn rest_fallback(&self, url: &str, params: &[(String, String)]) -> RestOutcome {
        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => return RestOutcome::Failed,
        };
        let url = url.to_string();
        let token = self.token.clone();
        let params = params.to_vec();
        let joined = tokio::task::spawn_blocking(move || {
            let client = match reqwest::blocking::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()
            {
                Ok(client) => client,
                Err(_) => return RestOutcome::Failed,
            };
            let response = client
                .get(&url)
                .header(reqwest::header::AUTHORIZATION, format!("token {token}"))
                .query(&params)
                .send();
            match response {
                Ok(response) if response.status() == reqwest::StatusCode::ACCEPTED => {
                    RestOutcome::NotReady
                }
                Ok(response) => match response.json::<Value>() {
                    Ok(value) => RestOutcome::Ready(value),
                    Err(_) => RestOutcome::Failed,
                },
                Err(_) => RestOutcome::Failed,
            }
        })
        .await;
        joined.unwrap_or(RestOutcome::Failed)
    }
}

#[async_trait]
impl Transport for Client {
    async fn graphql(&self, query: &str) -> Value {
        let body = serde_json::json!({ "query": query });
        if let Some(value) = self.graphql_primary(&body).await {
            return value;
        }
        eprintln!(
            "{}",
            style("async transport failed for GraphQL query, retrying synchronously").yellow()
        );
        match self.graphql_fallback(body).await {
            Some(value) => value,
            None => {
                eprintln!(
                    "{}",
                    style("GraphQL query failed on both transports, continuing without data")
                        .yellow()
                );
                Value::Null
            }
        }
    }

    async fn rest(&self, path: &str, params: &[(String, String)]) -> Value {
        let url = self.rest_url(path);
        for _ in 0..MAX_POLL_ATTEMPTS {
            match self.rest_primary(&url, params).await {
                RestOutcome::Ready(value) => return value,
                RestOutcome::NotReady => {
                    tokio::time::sleep(POLL_DELAY).await;
                    continue;
                }
                RestOutcome::Failed => {}
            }
            eprintln!(
                "{}",
                style("async transport failed for REST query, retrying synchronously").yellow()
            );
            match self.rest_fallback(&url, params).await {
                RestOutcome::Ready(value) => return value,
                RestOutcome::NotReady => {
                    tokio::time::sleep(POLL_DELAY).await;
                }
                RestOutcome::Failed => return Value::Null,
            }
        }
        eprintln!(
            "{}",
            style("too many 202 responses, data for this resource will be incomplete").yellow()
        );
        Value::Null
    }
}
