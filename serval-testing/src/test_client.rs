// In-process test client over a Dispatcher

use serval_core::{Dispatcher, Error, HttpMethod, HttpRequest, HttpResponse};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Test client dispatching requests without a transport
#[derive(Clone)]
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
}

impl TestClient {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn from_shared(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::DELETE, path, None).await
    }

    /// Make a request with a custom method
    pub async fn request(&self, method: HttpMethod, path: &str, body: Option<Vec<u8>>) -> TestResponse {
        let mut req = HttpRequest::new(method.as_str(), path);
        req.body = body.unwrap_or_default();
        self.send(req).await
    }

    /// Dispatch a fully built request
    pub async fn send(&self, request: HttpRequest) -> TestResponse {
        TestResponse::new(self.dispatcher.dispatch(request).await)
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    request: HttpRequest,
    query: BTreeMap<String, String>,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            request: HttpRequest::new(method.as_str(), path),
            query: BTreeMap::new(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request = self.request.with_header(key, value);
        self
    }

    /// Set the `Accept` header
    pub fn accept(self, media_type: &str) -> Self {
        self.header("Accept", media_type)
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.request.body = body;
        self
    }

    /// Set a JSON body and its content type
    pub fn json<T: serde::Serialize>(mut self, data: &T) -> Result<Self, Error> {
        self.request.body = serde_json::to_vec(data)?;
        Ok(self.header("Content-Type", "application/json"))
    }

    /// Add a query parameter; it is encoded into the request path
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    /// Set a request attribute
    pub fn attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.request = self.request.with_attribute(key, value);
        self
    }

    pub fn remote_addr(mut self, addr: &str) -> Self {
        self.request = self.request.with_remote_addr(addr);
        self
    }

    pub fn build(self) -> HttpRequest {
        let mut request = self.request;
        if !self.query.is_empty() {
            let params: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            let separator = if request.path.contains('?') { '&' } else { '?' };
            request.path = format!("{}{}{}", request.path, separator, params.join("&"));
        }
        request
    }

    pub async fn send(self, client: &TestClient) -> TestResponse {
        client.send(self.build()).await
    }
}

/// Response from a test request
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: HttpResponse,
}

impl TestResponse {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.response.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.response.body
    }

    /// Body as UTF-8 text, `None` for binary bodies
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.response.body.clone()).ok()
    }

    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_slice(&self.response.body).map_err(|e| format!("Serialization error: {}", e))
    }

    /// Header value, matched case-insensitively
    pub fn header(&self, key: &str) -> Option<&str> {
        self.response.header(key)
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Panic unless the status matches
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.response.status,
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.response.body)
        );
        self
    }
}
