// Serval - convention-over-configuration resource resolution for REST-style APIs
//
// Requests are mapped to controllers and serializers by naming convention:
// `/sessions/1.json` is handled by `SessionController` and rendered by a
// `JsonSessionSerializer`, or the built-in JSON serializer when none exists.

// Re-export core functionality
pub use serval_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use serval_config;

#[cfg(feature = "testing")]
pub use serval_testing;

pub mod prelude {
    pub use crate::{
        Action,
        ControllerRegistry,
        Dispatcher,
        Error,
        HttpMethod,
        HttpRequest,
        HttpResponse,
        ObjectSerializer,
        PackageStyle,
        Params,
        RequestContext,
        ResolverSettings,
        RestController,
        SerializerRegistry,
        ViewRenderer,
        async_trait,
        register_controller,
        register_serializer,
    };

    #[cfg(feature = "config")]
    pub use serval_config::{ConfigManager, FileFormat};
}
