/// Integration tests for the HTTP API, driven through the router without a socket
use arc_swap::ArcSwap;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use precificador::{
    config::Config, handlers::AppState, pricing::PricingService, server::create_router,
    storage::SqliteStore,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const CATALOG: &str = "nome,unidade,preco\nChocolate ao Leite,kg,40\nCreme de Leite,L,20\nCaixa,unidade,2.5\n";

async fn app_with_catalog(dir: &tempfile::TempDir, catalog: Option<&str>) -> Router {
    let path = dir.path().join("ingredientes.csv");
    if let Some(catalog) = catalog {
        std::fs::write(&path, catalog).unwrap();
    }

    let mut config = Config::default();
    config.catalog.path = path;
    config.defaults.waste_pct = dec!(0);
    config.defaults.overhead_pct = dec!(0);
    config.defaults.packaging_fee = dec!(0);
    config.defaults.margin_pct = dec!(100);
    config.delivery.free_km = dec!(5);
    config.delivery.per_km_rate = dec!(2);

    let storage = SqliteStore::connect("sqlite::memory:").await.unwrap();
    let service = PricingService::new(
        Arc::new(ArcSwap::from_pointee(config)),
        Arc::new(storage),
        reqwest::Client::new(),
    );
    let handle = PrometheusBuilder::new().build_recorder().handle();

    create_router(AppState { service }, Arc::new(handle))
}

async fn app(dir: &tempfile::TempDir) -> Router {
    app_with_catalog(dir, Some(CATALOG)).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn trufa_lines() -> Value {
    json!([
        { "ingredient": "Chocolate ao Leite", "quantity": "500", "unit": "g" },
        { "ingredient": "Creme de Leite", "quantity": "250", "unit": "ml" }
    ])
}

fn draft() -> Value {
    json!({
        "client_name": "Maria",
        "phone": "(11) 99999-0000",
        "date": "2026-10-19",
        "items": [
            { "product": "Brigadeiro", "quantity": "50", "unit_price": "2.50" },
            { "product": "Bolo de Cenoura", "quantity": "1", "unit_price": "80" }
        ],
        "distance_km": "10",
        "payment_method": "pix"
    })
}

#[tokio::test]
async fn test_health_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = send_json(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_catalog_listing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send_json(&app, Method::GET, "/api/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["pricing_enabled"], true);
}

#[tokio::test]
async fn test_price_form() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let form = json!({
        "product_name": "Trufa",
        "items": trufa_lines(),
        "distance_km": "10",
        "payment_method": "pix"
    });
    let (status, body) = send_json(&app, Method::POST, "/api/price", Some(form)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_name"], "Trufa");
    // 20.00 + 5.00 ingredients, doubled, plus 5 km at 2.00
    assert_eq!(body["formatted"]["ingredients_total"], "R$ 25.00");
    assert_eq!(body["formatted"]["sale_price"], "R$ 50.00");
    assert_eq!(body["formatted"]["delivery_fee"], "R$ 10.00");
    assert_eq!(body["formatted"]["final_price"], "R$ 60.00");
    assert!(body["text"].as_str().unwrap().contains("Trufa"));
}

#[tokio::test]
async fn test_price_form_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let unknown = json!({
        "items": [{ "ingredient": "Pistache", "quantity": "100", "unit": "g" }]
    });
    let (status, body) = send_json(&app, Method::POST, "/api/price", Some(unknown)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "ingredient_not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("Pistache"));

    let bad_method = json!({ "items": trufa_lines(), "payment_method": "cheque" });
    let (status, body) = send_json(&app, Method::POST, "/api/price", Some(bad_method)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "unknown_payment_method");

    // Largest representable quantity, in kg against a per-kg price
    let huge = json!({
        "items": [{
            "ingredient": "Chocolate ao Leite",
            "quantity": "79228162514264337593543950335",
            "unit": "kg"
        }]
    });
    let (status, body) = send_json(&app, Method::POST, "/api/price", Some(huge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");

    let mut quote = draft();
    quote["rates"] = json!({ "per_km_rate": "-5" });
    let (status, body) = send_json(&app, Method::POST, "/api/quotes/preview", Some(quote)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("per_km_rate"));
}

#[tokio::test]
async fn test_price_without_catalog_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_catalog(&dir, None).await;

    let (status, body) = send_json(&app, Method::GET, "/api/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["pricing_enabled"], false);
    assert!(!body["warnings"].as_array().unwrap().is_empty());

    let form = json!({ "items": trufa_lines() });
    let (status, body) = send_json(&app, Method::POST, "/api/price", Some(form)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "catalog_unavailable");
}

#[tokio::test]
async fn test_recipe_crud_and_pricing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/recipes/Trufa",
        Some(json!({ "lines": trufa_lines() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Trufa");

    let (_, body) = send_json(&app, Method::GET, "/api/recipes", None).await;
    assert_eq!(body["recipes"], json!(["Trufa"]));

    let (status, body) = send_json(&app, Method::GET, "/api/recipes/Trufa", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);

    // Overrides only; no body prices with the configured defaults
    let (status, body) = send_json(&app, Method::POST, "/api/recipes/Trufa/price", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"]["final_price"], "R$ 50.00");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/recipes/Trufa/price",
        Some(json!({ "margin_pct": "200" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"]["final_price"], "R$ 75.00");

    let (status, _) = send(&app, Method::DELETE, "/api/recipes/Trufa", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(&app, Method::GET, "/api/recipes/Trufa", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "recipe_not_found");

    let (status, _) = send(&app, Method::DELETE, "/api/recipes/Trufa", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_recipe_rejects_empty_lines() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        "/api/recipes/Vazia",
        Some(json!({ "lines": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_quote_preview_and_remove_item() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, body) = send_json(&app, Method::POST, "/api/quotes/preview", Some(draft())).await;
    assert_eq!(status, StatusCode::OK);
    // 125.00 + 80.00 items, 5 km over the free radius at 2.00
    assert_eq!(body["total"], "R$ 215.00");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/quotes/remove-item",
        Some(json!({ "quote": draft(), "index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["product"], "Brigadeiro");
    assert_eq!(body["quote"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["preview"]["total"], "R$ 90.00");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/quotes/remove-item",
        Some(json!({ "quote": draft(), "index": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "quote_item_out_of_range");
}

#[tokio::test]
async fn test_add_recipe_item_to_quote() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    send(
        &app,
        Method::PUT,
        "/api/recipes/Trufa",
        Some(json!({ "lines": trufa_lines() })),
    )
    .await;

    let request = json!({
        "quote": { "client_name": "Maria", "date": "2026-10-19", "payment_method": "pix" },
        "recipe": "Trufa",
        "quantity": "2"
    });
    let (status, body) = send_json(&app, Method::POST, "/api/quotes/add-item", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["product"], "Trufa");
    assert_eq!(body["preview"]["total"], "R$ 100.00");

    let fixed = json!({ "quote": body["quote"], "product": "Caixa", "quantity": "1" });
    let (status, body) = send_json(&app, Method::POST, "/api/quotes/add-item", Some(fixed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_quote_exports() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (status, bytes) = send(&app, Method::POST, "/api/quotes/text", Some(draft())).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("Cliente: Maria"));
    assert!(text.contains("50x Brigadeiro"));
    assert!(text.ends_with("*Total: R$ 215.00*"));

    let (status, bytes) = send(&app, Method::POST, "/api/quotes/pdf", Some(draft())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_save_and_list_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir).await;

    let (_, body) = send_json(&app, Method::GET, "/api/quotes", None).await;
    assert!(body["quotes"].as_array().unwrap().is_empty());

    let (status, saved) = send_json(&app, Method::POST, "/api/quotes", Some(draft())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["client"], "Maria");

    let (status, body) = send_json(&app, Method::GET, "/api/quotes", None).await;
    assert_eq!(status, StatusCode::OK);
    let quotes = body["quotes"].as_array().unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0]["id"], saved["id"]);

    let unnamed = json!({ "items": draft()["items"] });
    let (status, body) = send_json(&app, Method::POST, "/api/quotes", Some(unnamed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
}
