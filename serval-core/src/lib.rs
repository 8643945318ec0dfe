// Core library for the Serval resolution engine
// Naming conventions, handler finders, resource paths, and request dispatch

pub mod context;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod finder;
pub mod http;
pub mod logging;
pub mod media_type;
pub mod naming;
pub mod path;
pub mod registry;
pub mod render;
pub mod serializer;
pub mod settings;

// Re-export commonly used types
pub use context::{Params, RequestContext};
pub use controller::{Action, RestController};
pub use dispatch::{Dispatcher, DispatcherBuilder, Resolution};
pub use error::*;
pub use finder::{FallbackFn, HandlerLookup, PackageStyle, ResourceFinder};
pub use http::*;
pub use media_type::{Accept, MediaType};
pub use path::{ResourcePath, ResourceSegment};
pub use registry::{ControllerRegistry, Registry, SerializerRegistry};
pub use render::{NoViews, ObjectSerializer, ViewRenderer};
pub use serializer::{get_extension, ExtensionMapping, SerializerFinder};
pub use settings::ResolverSettings;

// Used by register_controller! / register_serializer!
pub use async_trait::async_trait;
pub use inventory;
