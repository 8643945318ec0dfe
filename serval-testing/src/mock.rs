// Mock collaborators: serializer, view renderer and controller

use async_trait::async_trait;
use parking_lot::Mutex;
use serval_core::{Action, Error, ObjectSerializer, Params, RequestContext, RestController, ViewRenderer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Serializer writing compact JSON under a configurable content type and
/// recording every value it was given.
///
/// Clones share their record, so a clone can be registered while the
/// original is inspected:
///
/// ```
/// use serval_core::SerializerRegistry;
/// use serval_testing::MockSerializer;
///
/// let mock = MockSerializer::new("application/json");
/// let mut registry = SerializerRegistry::new();
/// let registered = mock.clone();
/// registry.register("serval.serializers.JsonSerializer", move || Box::new(registered.clone()));
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Clone)]
pub struct MockSerializer {
    content_type: String,
    values: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockSerializer {
    pub fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.values.lock().len()
    }

    /// Values serialized so far, oldest first
    pub fn values(&self) -> Vec<serde_json::Value> {
        self.values.lock().clone()
    }

    pub fn clear(&self) {
        self.values.lock().clear();
    }
}

impl Default for MockSerializer {
    fn default() -> Self {
        Self::new("application/json")
    }
}

impl ObjectSerializer for MockSerializer {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn serialize(&self, value: &serde_json::Value) -> Result<Vec<u8>, Error> {
        self.values.lock().push(value.clone());
        Ok(serde_json::to_vec(value)?)
    }
}

/// View renderer backed by an in-memory set of views.
///
/// `{name}` placeholders in a view body are replaced with the request
/// parameter of that name.
#[derive(Clone, Default)]
pub struct MockViewRenderer {
    views: HashMap<String, String>,
    rendered: Arc<Mutex<Vec<String>>>,
}

impl MockViewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view, e.g. `sessions/show.html`
    pub fn with_view(mut self, name: &str, body: &str) -> Self {
        self.views.insert(name.to_string(), body.to_string());
        self
    }

    /// Names of the views rendered so far, oldest first
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().clone()
    }

    pub fn was_rendered(&self, view: &str) -> bool {
        self.rendered.lock().iter().any(|v| v == view)
    }
}

impl ViewRenderer for MockViewRenderer {
    fn exists(&self, view: &str) -> bool {
        self.views.contains_key(view)
    }

    fn render(&self, view: &str, params: &Params) -> Result<Vec<u8>, Error> {
        let template = self
            .views
            .get(view)
            .ok_or_else(|| Error::RenderMissing(view.to_string()))?;
        self.rendered.lock().push(view.to_string());

        let body = params.iter().fold(template.clone(), |body, (key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            body.replace(&format!("{{{}}}", key), &text)
        });
        Ok(body.into_bytes())
    }
}

/// One action invocation seen by a [`MockController`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerCall {
    pub action: Action,
    pub resource: Option<String>,
    pub id: Option<String>,
    pub extension: Option<String>,
    pub params: Params,
}

/// Controller recording every action it receives.
///
/// Supports every action unless restricted with [`MockController::supporting`].
/// A configured JSON reply is serialized in serializer mode; in page mode the
/// reply's fields are put as parameters and the default page is left to the
/// dispatcher.
#[derive(Clone, Default)]
pub struct MockController {
    supported: Option<HashSet<Action>>,
    replies: HashMap<Action, serde_json::Value>,
    calls: Arc<Mutex<Vec<ControllerCall>>>,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only handle `actions`; the others stay unsupported.
    pub fn supporting(mut self, actions: &[Action]) -> Self {
        self.supported = Some(actions.iter().copied().collect());
        self
    }

    /// Reply to `action` with `value`
    pub fn with_reply(mut self, action: Action, value: serde_json::Value) -> Self {
        self.replies.insert(action, value);
        self
    }

    pub fn calls(&self) -> Vec<ControllerCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn action_call_count(&self, action: Action) -> usize {
        self.calls.lock().iter().filter(|call| call.action == action).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn handle(&self, action: Action, ctx: &mut RequestContext) -> Result<(), Error> {
        if self.supported.as_ref().is_some_and(|s| !s.contains(&action)) {
            return Err(Error::ActionNotSupported(format!(
                "{} on {}",
                action,
                ctx.controller().unwrap_or("mock")
            )));
        }

        self.calls.lock().push(ControllerCall {
            action,
            resource: ctx.resource().map(str::to_string),
            id: ctx.id().map(str::to_string),
            extension: ctx.extension().map(str::to_string),
            params: ctx.params().clone(),
        });

        match self.replies.get(&action) {
            Some(reply) if !ctx.renders_page() => ctx.serialize(reply),
            Some(serde_json::Value::Object(fields)) => {
                for (key, value) in fields {
                    ctx.put_param(key.clone(), value.clone());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RestController for MockController {
    async fn index(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        self.handle(Action::Index, ctx)
    }

    async fn show(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        self.handle(Action::Show, ctx)
    }

    async fn create(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        self.handle(Action::Create, ctx)
    }

    async fn update(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        self.handle(Action::Update, ctx)
    }

    async fn destroy(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        self.handle(Action::Destroy, ctx)
    }
}
