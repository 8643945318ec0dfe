//! Request dispatch: one resolution pass, then controller invocation.
//!
//! The dispatcher sits between a transport and the user's controllers. For
//! every request it:
//!
//! 1. splits the path into a resource chain and picks the effective
//!    extension (URL, then `Content-Type`, then `Accept`),
//! 2. resolves the controller and serializer identities for the current
//!    resource and infers the action,
//! 3. builds a [`RequestContext`], instantiates the controller and runs
//!    the action,
//! 4. falls back to the default page (page requests) or `204 No Content`
//!    (serialized requests) when the action produced nothing.
//!
//! Every failure becomes a response carrying [`Error::status_code`].

use crate::context::RequestContext;
use crate::controller::{self, Action};
use crate::finder::{PackageStyle, ResourceFinder};
use crate::http::{parse_query_string, HttpRequest, HttpResponse};
use crate::media_type::{Accept, MediaType};
use crate::path::ResourcePath;
use crate::registry::{ControllerRegistry, SerializerRegistry};
use crate::render::{NoViews, ViewRenderer};
use crate::serializer::{self, ExtensionMapping, SerializerFinder};
use crate::settings::ResolverSettings;
use crate::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Page rendered for requests without any resource.
pub const INDEX_PAGE: &str = "index";

/// Everything one resolution pass decided about a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: ResourcePath,
    /// Effective extension; `None` renders a page.
    pub extension: Option<String>,
    pub controller: Option<String>,
    pub serializer: Option<String>,
    pub action: Option<Action>,
}

pub struct Dispatcher {
    settings: ResolverSettings,
    controller_finder: ResourceFinder,
    controllers: Arc<ControllerRegistry>,
    serializers: Arc<SerializerRegistry>,
    renderer: Arc<dyn ViewRenderer>,
}

impl Dispatcher {
    pub fn builder(settings: ResolverSettings) -> DispatcherBuilder {
        DispatcherBuilder::new(settings)
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    pub fn serializers(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Resolve `request` without invoking anything.
    ///
    /// # Errors
    ///
    /// Only for malformed internal state (an empty resource name); missing
    /// handlers are `None` fields of the [`Resolution`].
    pub fn resolve(&self, request: &HttpRequest) -> Result<Resolution, Error> {
        let path = ResourcePath::parse(&request.path);
        let extension = path
            .extension()
            .map(str::to_string)
            .or_else(|| header_extension(request).map(str::to_string));

        let Some(resource) = path.resource() else {
            return Ok(Resolution {
                path,
                extension,
                controller: None,
                serializer: Some(serializer::page_serializer()),
                action: None,
            });
        };

        let controller = self.controller_finder.resolve(resource, self.controllers.as_ref())?;
        let serializer = SerializerFinder::from_settings(&self.settings, extension.as_deref())?
            .resolve(resource, self.serializers.as_ref())?;
        if let Some(id) = serializer.as_deref() {
            if !self.serializers.contains(id) && id != serializer::page_serializer() {
                warn!(resource = %resource, serializer = %id, "Resolved serializer is not registered");
            }
        }

        let action = request
            .http_method()
            .and_then(|method| Action::infer(method, path.id().is_some()));

        debug!(
            resource = %resource,
            controller = ?controller,
            serializer = ?serializer,
            action = ?action,
            "Resolved request"
        );

        Ok(Resolution {
            path,
            extension,
            controller,
            serializer,
            action,
        })
    }

    /// Handle one request end to end.
    pub async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match self.handle(&request).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_client_error() {
                    debug!(method = %request.method, path = %request.path, error = %err, "Request rejected");
                } else {
                    warn!(method = %request.method, path = %request.path, error = %err, "Request failed");
                }
                HttpResponse::from_error(&err)
            }
        }
    }

    async fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let resolution = self.resolve(request)?;
        let controller_id = resolution.controller.clone();
        let action = resolution.action;
        let mut ctx = self.context(request, resolution);

        if ctx.resources().is_empty() {
            ctx.render_page_named(INDEX_PAGE)?;
            return Ok(finish(ctx));
        }

        let controller_id = controller_id.ok_or_else(|| {
            Error::NotFound(format!(
                "no controller for resource {}",
                ctx.resource().unwrap_or_default()
            ))
        })?;
        let action = action.ok_or_else(|| {
            Error::ActionNotSupported(format!("{} {} on {}", request.method, request.path_only(), controller_id))
        })?;

        let controller = self.controllers.instantiate(&controller_id)?;
        controller::invoke(controller.as_ref(), action, &mut ctx).await?;

        if !ctx.has_response() {
            if ctx.renders_page() {
                ctx.render_page()?;
            } else {
                ctx.respond(HttpResponse::no_content());
            }
        }
        Ok(finish(ctx))
    }

    fn context(&self, request: &HttpRequest, resolution: Resolution) -> RequestContext {
        let mut query = request.query_string().map(parse_query_string).unwrap_or_default();
        query.extend(request.query_params.clone());
        let query = query
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)));
        let attributes = request
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()));

        RequestContext::new(resolution.path)
            .with_extension(resolution.extension)
            .with_action(resolution.action)
            .with_controller(resolution.controller)
            .with_serializer(resolution.serializer)
            .with_params(query.chain(attributes))
            .with_headers(request.headers.clone())
            .with_remote_addr(request.remote_addr.clone(), request.scheme.clone())
            .with_renderer(Arc::clone(&self.renderer))
            .with_serializers(Arc::clone(&self.serializers))
    }
}

fn finish(ctx: RequestContext) -> HttpResponse {
    ctx.into_response().unwrap_or_else(HttpResponse::no_content)
}

/// Extension derived from the request's `Content-Type`, else its preferred
/// `Accept` entry.
fn header_extension(request: &HttpRequest) -> Option<&'static str> {
    let content_type = request
        .header("content-type")
        .and_then(MediaType::parse)
        .and_then(|mt| serializer::get_extension(&mt.mime_type()));

    content_type.or_else(|| {
        let accept = Accept::parse(request.header("accept")?);
        serializer::get_extension(&accept.preferred()?.mime_type())
    })
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("settings", &self.settings)
            .field("controllers", &self.controllers)
            .field("serializers", &self.serializers)
            .finish()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    settings: ResolverSettings,
    controllers: ControllerRegistry,
    serializers: SerializerRegistry,
    renderer: Arc<dyn ViewRenderer>,
}

impl DispatcherBuilder {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            controllers: ControllerRegistry::new(),
            serializers: SerializerRegistry::new(),
            renderer: Arc::new(NoViews),
        }
    }

    pub fn controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = controllers;
        self
    }

    pub fn serializers(mut self, serializers: SerializerRegistry) -> Self {
        self.serializers = serializers;
        self
    }

    pub fn renderer<R: ViewRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn shared_renderer(mut self, renderer: Arc<dyn ViewRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validate the settings and build the dispatcher. The extension table
    /// is populated here, before any request is served.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the settings cannot drive resolution.
    pub fn build(self) -> Result<Dispatcher, Error> {
        let controller_finder = ResourceFinder::for_controllers(&self.settings)?;
        SerializerFinder::from_settings(&self.settings, None)?;
        ExtensionMapping::init();

        if self.settings.packages_style == PackageStyle::Off {
            warn!("Package style is off: controllers are not resolved, resource requests get 404");
        }

        info!(
            main_package = ?self.settings.main_package,
            style = %self.settings.packages_style,
            controllers = self.controllers.len(),
            serializers = self.serializers.len(),
            "Dispatcher ready"
        );

        Ok(Dispatcher {
            settings: self.settings,
            controller_finder,
            controllers: Arc::new(self.controllers),
            serializers: Arc::new(self.serializers),
            renderer: self.renderer,
        })
    }
}
