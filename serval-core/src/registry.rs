//! Handler registry: identifier strings mapped to factories.
//!
//! Handlers are registered under the identifiers the finders build
//! (`com.acme.SessionController`), either explicitly or at compile time
//! through [`inventory`] with [`register_controller!`] and
//! [`register_serializer!`]:
//!
//! ```ignore
//! #[derive(Default)]
//! struct SessionController;
//!
//! #[async_trait::async_trait]
//! impl RestController for SessionController { /* ... */ }
//!
//! serval_core::register_controller!("com.acme.SessionController", SessionController);
//!
//! let controllers = ControllerRegistry::from_inventory();
//! ```
//!
//! Registries are built before requests are served and only read after that.

use crate::controller::RestController;
use crate::finder::HandlerLookup;
use crate::render::ObjectSerializer;
use crate::Error;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

/// Identifier → factory table for one kind of handler.
pub struct Registry<T: ?Sized> {
    factories: HashMap<String, Factory<T>>,
}

pub type ControllerRegistry = Registry<dyn RestController>;
pub type SerializerRegistry = Registry<dyn ObjectSerializer>;

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` under `identifier`, replacing any previous entry.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        if self.factories.insert(identifier.clone(), Arc::new(factory)).is_some() {
            tracing::warn!(handler = %identifier, "Handler registered twice, keeping the last one");
        }
        self
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Create a fresh handler instance.
    ///
    /// # Errors
    ///
    /// [`Error::HandlerNotRegistered`] for unknown identifiers.
    pub fn instantiate(&self, identifier: &str) -> Result<Box<T>, Error> {
        self.factories
            .get(identifier)
            .map(|factory| factory())
            .ok_or_else(|| Error::HandlerNotRegistered(identifier.to_string()))
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> HandlerLookup for Registry<T> {
    fn exists(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.identifiers())
            .finish()
    }
}

/// A controller submitted through [`register_controller!`].
pub struct ControllerEntry {
    pub identifier: &'static str,
    pub factory: fn() -> Box<dyn RestController>,
}

/// A serializer submitted through [`register_serializer!`].
pub struct SerializerEntry {
    pub identifier: &'static str,
    pub factory: fn() -> Box<dyn ObjectSerializer>,
}

inventory::collect!(ControllerEntry);
inventory::collect!(SerializerEntry);

impl ControllerEntry {
    pub const fn new(identifier: &'static str, factory: fn() -> Box<dyn RestController>) -> Self {
        Self { identifier, factory }
    }
}

impl SerializerEntry {
    pub const fn new(identifier: &'static str, factory: fn() -> Box<dyn ObjectSerializer>) -> Self {
        Self { identifier, factory }
    }
}

/// Factory used by [`register_controller!`].
pub fn controller_factory<C: RestController + Default + 'static>() -> Box<dyn RestController> {
    Box::new(C::default())
}

/// Factory used by [`register_serializer!`].
pub fn serializer_factory<S: ObjectSerializer + Default + 'static>() -> Box<dyn ObjectSerializer> {
    Box::new(S::default())
}

impl Registry<dyn RestController> {
    /// Build a registry from every [`register_controller!`] in the binary.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for entry in inventory::iter::<ControllerEntry> {
            registry.register(entry.identifier, entry.factory);
        }
        tracing::debug!(count = registry.len(), "Collected controllers");
        registry
    }
}

impl Registry<dyn ObjectSerializer> {
    /// Build a registry from every [`register_serializer!`] in the binary.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for entry in inventory::iter::<SerializerEntry> {
            registry.register(entry.identifier, entry.factory);
        }
        tracing::debug!(count = registry.len(), "Collected serializers");
        registry
    }
}

/// Register a `Default` controller type under an identifier at compile time.
#[macro_export]
macro_rules! register_controller {
    ($identifier:expr, $controller:ty) => {
        $crate::inventory::submit! {
            $crate::registry::ControllerEntry::new(
                $identifier,
                $crate::registry::controller_factory::<$controller>,
            )
        }
    };
}

/// Register a `Default` serializer type under an identifier at compile time.
#[macro_export]
macro_rules! register_serializer {
    ($identifier:expr, $serializer:ty) => {
        $crate::inventory::submit! {
            $crate::registry::SerializerEntry::new(
                $identifier,
                $crate::registry::serializer_factory::<$serializer>,
            )
        }
    };
}
