//! Per-request context handed to controllers.
//!
//! Aggregates everything resolution produced for one request (resource
//! chain, extension, controller and serializer identities, action) with the
//! request parameters, and gives controllers their output operations:
//! rendering a page or serializing a value.
//!
//! A context lives for exactly one request. Parameters put by a controller
//! are visible to every later read within that request and nowhere else.

use crate::controller::Action;
use crate::http::HttpResponse;
use crate::path::{ResourcePath, ResourceSegment};
use crate::registry::SerializerRegistry;
use crate::render::{self, NoViews, ViewRenderer};
use crate::serializer::page_serializer;
use crate::Error;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Request parameters: query string pairs and request attributes.
pub type Params = HashMap<String, serde_json::Value>;

pub struct RequestContext {
    path: ResourcePath,
    extension: Option<String>,
    action: Option<Action>,
    controller: Option<String>,
    serializer: Option<String>,
    params: Params,
    headers: HashMap<String, String>,
    remote_addr: Option<String>,
    scheme: String,
    renderer: Arc<dyn ViewRenderer>,
    serializers: Arc<SerializerRegistry>,
    response: Option<HttpResponse>,
}

impl RequestContext {
    /// Context for `path`, with no views, no serializers and the URL
    /// extension as the effective one.
    pub fn new(path: ResourcePath) -> Self {
        let extension = path.extension().map(str::to_string);
        Self {
            path,
            extension,
            action: None,
            controller: None,
            serializer: None,
            params: Params::new(),
            headers: HashMap::new(),
            remote_addr: None,
            scheme: "http".to_string(),
            renderer: Arc::new(NoViews),
            serializers: Arc::new(SerializerRegistry::new()),
            response: None,
        }
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_action(mut self, action: Option<Action>) -> Self {
        self.action = action;
        self
    }

    pub fn with_controller(mut self, controller: Option<String>) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_serializer(mut self, serializer: Option<String>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Merge `params` in; existing keys are overwritten.
    pub fn with_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        self.params.extend(params);
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_remote_addr(mut self, remote_addr: Option<String>, scheme: impl Into<String>) -> Self {
        self.remote_addr = remote_addr;
        self.scheme = scheme.into();
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_serializers(mut self, serializers: Arc<SerializerRegistry>) -> Self {
        self.serializers = serializers;
        self
    }

    // ========================================================================
    // Resolution results
    // ========================================================================

    pub fn resources(&self) -> &ResourcePath {
        &self.path
    }

    pub fn chain(&self) -> &[ResourceSegment] {
        self.path.chain()
    }

    /// Name of the current (most deeply nested) resource.
    pub fn resource(&self) -> Option<&str> {
        self.path.resource()
    }

    /// Identifier of the current resource.
    ///
    /// `/sessions/1` gives `1`; `/sessions/1/users/2` gives `2`.
    pub fn id(&self) -> Option<&str> {
        self.path.id()
    }

    /// Identifier of a resource by name: on `/sessions/1/users/2`,
    /// `id_of("session")` gives `1`. Absent resources give `None`.
    pub fn id_of(&self, resource: &str) -> Option<&str> {
        self.path.id_of(resource)
    }

    /// Identifier at nesting depth `depth`, outermost first.
    pub fn id_at(&self, depth: usize) -> Option<&str> {
        self.path.id_at(depth)
    }

    /// Effective extension: from the URL, or derived from the request's
    /// content type. `None` means page rendering.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    /// Identifier of the serializer used by [`RequestContext::serialize`].
    /// Page requests carry the page serializer; an unknown extension with
    /// no custom serializer carries `None` and renders a page as well.
    pub fn serializer(&self) -> Option<&str> {
        self.serializer.as_deref()
    }

    /// Whether the response should be a rendered page.
    pub fn renders_page(&self) -> bool {
        self.serializer
            .as_deref()
            .is_none_or(|id| id == page_serializer())
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.get(name)
    }

    /// A parameter's value when it is a string.
    pub fn string_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(serde_json::Value::as_str)
    }

    /// Put a parameter, visible to every later read in this request and to
    /// rendered pages.
    pub fn put_param(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Client address with scheme, e.g. `http://192.168.12.10`.
    ///
    /// Proxies are honoured through `x-forwarded-for` and `X_FORWARDED_FOR`
    /// before the transport's remote address.
    pub fn remote_address(&self) -> String {
        let ip = self
            .header("x-forwarded-for")
            .or_else(|| self.header("X_FORWARDED_FOR"))
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
            .or(self.remote_addr.as_deref())
            .unwrap_or("unknown");
        format!("{}://{}", self.scheme, ip)
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Render the default page of the current resource: `<resource>/<action>`
    /// (`index` when there is no action).
    ///
    /// # Errors
    ///
    /// [`Error::RenderMissing`] if the page does not exist.
    pub fn render_page(&mut self) -> Result<(), Error> {
        let page = self.action.map_or("index", |action| action.as_str());
        let resource = self.resource().map(str::to_string);
        self.render(resource.as_deref(), page)
    }

    /// Render `page` from the current resource's views. Without an
    /// extension, `page.html` then `page.htm` are tried.
    pub fn render_page_named(&mut self, page: &str) -> Result<(), Error> {
        let resource = self.resource().map(str::to_string);
        self.render(resource.as_deref(), page)
    }

    /// Render `page` from `resource`'s views.
    pub fn render_resource_page(&mut self, resource: &str, page: &str) -> Result<(), Error> {
        self.render(Some(resource), page)
    }

    fn render(&mut self, resource: Option<&str>, page: &str) -> Result<(), Error> {
        let body = render::render_view(self.renderer.as_ref(), resource, page, &self.params)?;
        let content_type = self.renderer.content_type().to_string();
        self.response = Some(HttpResponse::ok().content_type(content_type).with_body(body));
        Ok(())
    }

    /// Serialize `value` with the resolved serializer.
    ///
    /// # Errors
    ///
    /// [`Error::HandlerNotRegistered`] when no serializer was resolved or
    /// the resolved one is not registered; serializer failures as-is.
    pub fn serialize<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let identifier = self.serializer.as_deref().ok_or_else(|| {
            Error::HandlerNotRegistered(format!(
                "no serializer resolved for extension {}",
                self.extension.as_deref().unwrap_or("page")
            ))
        })?;
        let serializer = self.serializers.instantiate(identifier)?;
        let value = serde_json::to_value(value)?;
        let body = serializer.serialize(&value)?;
        tracing::debug!(serializer = %identifier, bytes = body.len(), "Serialized response");
        self.response = Some(
            HttpResponse::ok()
                .content_type(serializer.content_type())
                .with_body(body),
        );
        Ok(())
    }

    /// Set the response directly.
    pub fn respond(&mut self, response: HttpResponse) {
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    pub fn into_response(self) -> Option<HttpResponse> {
        self.response
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("path", &self.path)
            .field("extension", &self.extension)
            .field("action", &self.action)
            .field("controller", &self.controller)
            .field("serializer", &self.serializer)
            .field("params", &self.params)
            .field("response", &self.response.as_ref().map(|r| r.status))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ObjectSerializer;
    use serde_json::json;

    struct Views;

    impl ViewRenderer for Views {
        fn exists(&self, view: &str) -> bool {
            view == "sessions/show.htm" || view == "index.html"
        }

        fn render(&self, view: &str, params: &Params) -> Result<Vec<u8>, Error> {
            Ok(format!("{} {}", view, params.len()).into_bytes())
        }
    }

    struct Plain;

    impl ObjectSerializer for Plain {
        fn content_type(&self) -> &str {
            "text/plain"
        }

        fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>, Error> {
            Ok(value.to_string().into_bytes())
        }
    }

    fn context(path: &str) -> RequestContext {
        RequestContext::new(ResourcePath::parse(path))
    }

    #[test]
    fn test_identifier_accessors() {
        let ctx = context("/sessions/1/users/2");
        assert_eq!(ctx.id(), Some("2"));
        assert_eq!(ctx.id_of("sessions"), Some("1"));
        assert_eq!(ctx.id_of("orders"), None);
        assert_eq!(ctx.id_at(0), Some("1"));
        assert_eq!(ctx.resource(), Some("users"));
    }

    #[test]
    fn test_put_param_overrides() {
        let mut ctx = context("/sessions").with_params([("page".to_string(), json!("1"))]);
        assert_eq!(ctx.string_param("page"), Some("1"));

        ctx.put_param("page", 2);
        assert_eq!(ctx.param("page"), Some(&json!(2)));
        assert_eq!(ctx.string_param("page"), None);
        assert_eq!(ctx.params().len(), 1);
    }

    #[test]
    fn test_remote_address() {
        let mut headers = HashMap::new();
        headers.insert("X-Forwarded-For".to_string(), "10.0.0.1, 10.0.0.2".to_string());
        let proxied = context("/").with_headers(headers).with_remote_addr(Some("127.0.0.1".into()), "https");
        assert_eq!(proxied.remote_address(), "https://10.0.0.1");

        let mut legacy = HashMap::new();
        legacy.insert("X_FORWARDED_FOR".to_string(), "10.0.0.9".to_string());
        assert_eq!(context("/").with_headers(legacy).remote_address(), "http://10.0.0.9");

        let direct = context("/").with_remote_addr(Some("192.168.12.10".into()), "http");
        assert_eq!(direct.remote_address(), "http://192.168.12.10");
    }

    #[test]
    fn test_render_default_page() {
        let mut ctx = context("/sessions/1")
            .with_action(Some(Action::Show))
            .with_renderer(Arc::new(Views));
        ctx.put_param("user", "alice");
        ctx.render_page().unwrap();

        let response = ctx.response().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"sessions/show.htm 1".to_vec());
        assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_render_missing_page() {
        let mut ctx = context("/sessions").with_renderer(Arc::new(Views));
        assert!(matches!(ctx.render_page_named("edit"), Err(Error::RenderMissing(_))));
        assert!(!ctx.has_response());

        ctx.render_resource_page("", "index").unwrap();
        assert!(ctx.has_response());
    }

    #[test]
    fn test_serialize_with_resolved_serializer() {
        let mut registry = SerializerRegistry::new();
        registry.register("app.PlainSerializer", || Box::new(Plain));

        let mut ctx = context("/sessions/1.txt")
            .with_serializer(Some("app.PlainSerializer".to_string()))
            .with_serializers(Arc::new(registry));
        assert!(!ctx.renders_page());

        ctx.serialize(&json!({"id": 1})).unwrap();
        let response = ctx.into_response().unwrap();
        assert_eq!(response.body, br#"{"id":1}"#.to_vec());
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_serialize_without_serializer() {
        let mut ctx = context("/sessions/1");
        assert!(ctx.renders_page());
        assert!(matches!(ctx.serialize("x"), Err(Error::HandlerNotRegistered(_))));
    }
}
