//! Integration tests for common Serval workflows.
//!
//! Settings loaded from a file, controllers registered at compile time,
//! requests dispatched through the test client.

use serval::prelude::*;
use serval_config::{ConfigManager, FileFormat};
use serval_testing::{MockSerializer, MockViewRenderer, TestClient, TestRequestBuilder};
use std::io::Write;

#[derive(Default)]
struct OrderController;

#[async_trait]
impl RestController for OrderController {
    async fn index(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        let customer = ctx.id_of("customers").map(str::to_string);
        if ctx.renders_page() {
            ctx.put_param("customer", customer.unwrap_or_default());
            return ctx.render_page();
        }
        ctx.serialize(&serde_json::json!({ "customer": customer, "orders": [10, 11] }))
    }

    async fn show(&self, ctx: &mut RequestContext) -> Result<(), Error> {
        let order = ctx.id().unwrap_or_default().to_string();
        ctx.serialize(&serde_json::json!({ "order": order }))
    }

    async fn destroy(&self, _ctx: &mut RequestContext) -> Result<(), Error> {
        Ok(())
    }
}

register_controller!("shop.orders.OrderController", OrderController);

fn settings() -> ResolverSettings {
    let mut file = tempfile::Builder::new().suffix(".properties").tempfile().unwrap();
    writeln!(file, "main.package=shop").unwrap();
    writeln!(file, "packages.style=nested").unwrap();

    let config = ConfigManager::with_prefix("SERVAL_WORKFLOW");
    config.load_file(file.path(), FileFormat::Properties).unwrap();
    config.resolver_settings().unwrap()
}

fn client(json: &MockSerializer) -> TestClient {
    let mut serializers = SerializerRegistry::new();
    let registered = json.clone();
    serializers.register("serval.serializers.JsonSerializer", move || Box::new(registered.clone()));

    let dispatcher = Dispatcher::builder(settings())
        .controllers(ControllerRegistry::from_inventory())
        .serializers(serializers)
        .renderer(MockViewRenderer::new().with_view("orders/index.html", "orders of {customer}"))
        .build()
        .unwrap();
    TestClient::new(dispatcher)
}

#[tokio::test]
async fn test_nested_collection_as_page() {
    let client = client(&MockSerializer::default());
    let response = client.get("/customers/ada/orders").await;

    response.assert_status(200);
    assert_eq!(response.body_string().as_deref(), Some("orders of ada"));
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
}

#[tokio::test]
async fn test_nested_collection_as_json() {
    let json = MockSerializer::default();
    let client = client(&json);
    let response = client.get("/customers/ada/orders.json").await;

    response.assert_status(200);
    let body: serde_json::Value = response.body_json().unwrap();
    assert_eq!(body["customer"], "ada");
    assert_eq!(body["orders"][0], 10);
    assert_eq!(json.call_count(), 1);
}

#[tokio::test]
async fn test_content_type_selects_serializer() {
    let client = client(&MockSerializer::default());
    let request = TestRequestBuilder::new(HttpMethod::GET, "/orders/10")
        .header("Content-Type", "application/json; charset=utf-8")
        .build();
    let response = client.send(request).await;

    response.assert_status(200);
    let body: serde_json::Value = response.body_json().unwrap();
    assert_eq!(body["order"], "10");
}

#[tokio::test]
async fn test_show_without_serializer_fails_cleanly() {
    let client = client(&MockSerializer::default());
    let response = client.get("/orders/10.xml").await;

    response.assert_status(500);
    assert!(response.body_string().unwrap().contains("XmlSerializer"));
}

#[tokio::test]
async fn test_destroy_without_output() {
    let client = client(&MockSerializer::default());

    client.delete("/orders/10.json").await.assert_status(204);
    // page mode falls back to orders/destroy, which does not exist
    client.delete("/orders/10").await.assert_status(500);
}

#[tokio::test]
async fn test_unknown_resource_and_action() {
    let client = client(&MockSerializer::default());

    client.get("/invoices").await.assert_status(404);
    client.post("/orders", Vec::new()).await.assert_status(405);
    client.delete("/orders").await.assert_status(405);
}

#[test]
fn test_resolution_without_dispatch() {
    let dispatcher = Dispatcher::builder(settings())
        .controllers(ControllerRegistry::from_inventory())
        .build()
        .unwrap();

    let resolution = dispatcher
        .resolve(&HttpRequest::new("PATCH", "/customers/ada/orders/11.json"))
        .unwrap();
    assert_eq!(resolution.controller.as_deref(), Some("shop.orders.OrderController"));
    assert_eq!(resolution.serializer.as_deref(), Some("serval.serializers.JsonSerializer"));
    assert_eq!(resolution.action, Some(Action::Update));
    assert_eq!(resolution.path.id_of("customer"), Some("ada"));
}
