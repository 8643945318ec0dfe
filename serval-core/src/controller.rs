// Controller contract: the actions a resource controller may implement

use crate::context::RequestContext;
use crate::http::HttpMethod;
use crate::Error;
use async_trait::async_trait;
use std::fmt;

/// Standard REST actions, inferred from the method and whether the current
/// resource carries an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Index,
    Show,
    Create,
    Update,
    Destroy,
}

impl Action {
    /// `GET /sessions` is `Index`, `GET /sessions/1` is `Show`, `POST` is
    /// `Create`, `PUT`/`PATCH /sessions/1` is `Update` and
    /// `DELETE /sessions/1` is `Destroy`. Anything else has no action.
    pub fn infer(method: HttpMethod, has_id: bool) -> Option<Self> {
        match (method, has_id) {
            (HttpMethod::GET, false) => Some(Action::Index),
            (HttpMethod::GET, true) => Some(Action::Show),
            (HttpMethod::POST, _) => Some(Action::Create),
            (HttpMethod::PUT | HttpMethod::PATCH, true) => Some(Action::Update),
            (HttpMethod::DELETE, true) => Some(Action::Destroy),
            _ => None,
        }
    }

    /// Action name, also the default page rendered for it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Show => "show",
            Action::Create => "create",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource controller.
///
/// Every action defaults to [`Error::ActionNotSupported`]; implement the
/// ones the resource supports. Actions read parameters and identifiers from
/// the context and produce output through its render and serialize calls.
/// An action that produces nothing gets the default page (page requests) or
/// `204 No Content` (serialized requests).
#[async_trait]
pub trait RestController: Send + Sync {
    async fn index(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        unsupported(ctx, Action::Index)
    }

    async fn show(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        unsupported(ctx, Action::Show)
    }

    async fn create(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        unsupported(ctx, Action::Create)
    }

    async fn update(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        unsupported(ctx, Action::Update)
    }

    async fn destroy(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        unsupported(ctx, Action::Destroy)
    }
}

fn unsupported(ctx: &RequestContext, action: Action) -> Result<(), Error> {
    Err(Error::ActionNotSupported(format!(
        "{} on {}",
        action,
        ctx.controller().unwrap_or("<none>")
    )))
}

/// Run `action` on `controller`.
pub async fn invoke(
    controller: &dyn RestController,
    action: Action,
    ctx: &mut RequestContext,
) -> Result<(), Error> {
    match action {
        Action::Index => controller.index(ctx).await,
        Action::Show => controller.show(ctx).await,
        Action::Create => controller.create(ctx).await,
        Action::Update => controller.update(ctx).await,
        Action::Destroy => controller.destroy(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ResourcePath;

    #[test]
    fn test_infer_actions() {
        assert_eq!(Action::infer(HttpMethod::GET, false), Some(Action::Index));
        assert_eq!(Action::infer(HttpMethod::GET, true), Some(Action::Show));
        assert_eq!(Action::infer(HttpMethod::POST, false), Some(Action::Create));
        assert_eq!(Action::infer(HttpMethod::PUT, true), Some(Action::Update));
        assert_eq!(Action::infer(HttpMethod::PATCH, true), Some(Action::Update));
        assert_eq!(Action::infer(HttpMethod::DELETE, true), Some(Action::Destroy));
    }

    #[test]
    fn test_infer_rejects_incomplete_requests() {
        assert_eq!(Action::infer(HttpMethod::PUT, false), None);
        assert_eq!(Action::infer(HttpMethod::DELETE, false), None);
        assert_eq!(Action::infer(HttpMethod::HEAD, true), None);
        assert_eq!(Action::infer(HttpMethod::OPTIONS, false), None);
    }

    struct ReadOnly;

    #[async_trait]
    impl RestController for ReadOnly {
        async fn show(&self, ctx: &mut RequestContext) -> Result<(), Error> {
            ctx.put_param("seen", true);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_invoke_dispatches_and_defaults() {
        let mut ctx = RequestContext::new(ResourcePath::parse("/sessions/1"))
            .with_controller(Some("app.ReadOnly".to_string()));

        invoke(&ReadOnly, Action::Show, &mut ctx).await.unwrap();
        assert_eq!(ctx.param("seen"), Some(&serde_json::Value::Bool(true)));

        let err = invoke(&ReadOnly, Action::Destroy, &mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::ActionNotSupported(msg) if msg == "destroy on app.ReadOnly"));
    }
}
