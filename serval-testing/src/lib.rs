//! Testing utilities for Serval.
//!
//! - **TestClient** - dispatch requests in-process and inspect responses
//! - **TestRequestBuilder** - requests with headers, query and attributes
//! - **MockSerializer** / **MockViewRenderer** - output collaborators that
//!   record what they produced
//! - **MockController** - a controller recording every action it receives
//!
//! ## Quick Start
//!
//! ```
//! use serval_core::{ControllerRegistry, Dispatcher, ResolverSettings};
//! use serval_testing::*;
//!
//! # tokio_test::block_on(async {
//! let sessions = MockController::new();
//! let registered = sessions.clone();
//! let mut controllers = ControllerRegistry::new();
//! controllers.register("com.acme.SessionController", move || Box::new(registered.clone()));
//!
//! let dispatcher = Dispatcher::builder(ResolverSettings::new("com.acme"))
//!     .controllers(controllers)
//!     .renderer(MockViewRenderer::new().with_view("sessions/show.html", "session {name}"))
//!     .build()
//!     .unwrap();
//!
//! let client = TestClient::new(dispatcher);
//! let response = client.get("/sessions/1?name=ada").await;
//!
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body_string().as_deref(), Some("session ada"));
//! assert_eq!(sessions.call_count(), 1);
//! # });
//! ```

mod mock;
mod test_client;

pub use mock::{ControllerCall, MockController, MockSerializer, MockViewRenderer};
pub use test_client::{TestClient, TestRequestBuilder, TestResponse};

// Re-export common testing utilities
pub use tokio::test as tokio_test;
