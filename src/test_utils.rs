//! Scripted transport for exercising the statistics layer without a network.

use crate::api::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// GraphQL responses are served in push order; REST responses are routed by
/// exact path. Unrouted requests degrade to `Value::Null`, matching the real
/// client's failure behavior. Every request is logged for assertions.
#[derive(Default)]
pub struct FakeTransport {
    graphql_queue: Mutex<VecDeque<Value>>,
    rest_routes: Mutex<Vec<(String, Value)>>,
    graphql_log: Mutex<Vec<String>>,
    rest_log: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_graphql(&self, response: Value) {
        self.graphql_queue.lock().unwrap().push_back(response);
    }

    pub fn route_rest(&self, path: &str, response: Value) {
        self.rest_routes
            .lock()
            .unwrap()
            .push((path.trim_start_matches('/').to_string(), response));
    }

    pub fn graphql_calls(&self) -> usize {
        self.graphql_log.lock().unwrap().len()
    }

    pub fn graphql_log(&self) -> Vec<String> {
        self.graphql_log.lock().unwrap().clone()
    }

    pub fn rest_log(&self) -> Vec<String> {
        self.rest_log.lock().unwrap().clone()
    }

    pub fn rest_calls_matching(&self, needle: &str) -> usize {
        self.rest_log
            .lock()
            .unwrap()
            .iter()
            .filter(|path| path.contains(needle))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn graphql(&self, query: &str) -> Value {
        self.graphql_log.lock().unwrap().push(query.to_string());
        self.graphql_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::Null)
    }

    async fn rest(&self, path: &str, _params: &[(String, String)]) -> Value {
        let path = path.trim_start_matches('/').to_string();
        self.rest_log.lock().unwrap().push(path.clone());
        self.rest_routes
            .lock()
            .unwrap()
            .iter()
            .find(|(route, _)| *route == path)
            .map(|(_, response)| response.clone())
            .unwrap_or(Value::Null)
    }
}
