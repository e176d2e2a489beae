//! Router behaviour over an in-memory catalog

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use scenecat_api::{create_router, AppState};
use scenecat_catalog::Catalog;
use scenecat_core::config::{CatalogConfig, CatalogOverrides, HarvestConfig};
use scenecat_core::error::Result;
use scenecat_core::models::{Bands, BoundingBox, Feature, SceneProperties};
use scenecat_harvest::{FeedPage, Harvester, NoopEventSink, SceneFeed};
use scenecat_store::MemoryStorage;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Feed with a single page holding one Landsat scene
struct OnePageFeed;

#[async_trait]
impl SceneFeed for OnePageFeed {
    async fn fetch_page(&self, _endpoint: &str, _key: &str) -> Result<FeedPage> {
        Ok(FeedPage {
            records: vec![json!({
                "id": "LC81230452016099LGN00",
                "geometry": {"type": "Point", "coordinates": [5.0, 5.0]},
                "properties": {
                    "acquired": "2016-04-08T00:00:00Z",
                    "cloud_cover": {"estimated": 1.0},
                    "image_statistics": {"gsd": 30.0}
                }
            })],
            next: None,
        })
    }
}

fn scene(id: &str, cloud_cover: f64) -> Feature {
    let bands = [("red", "https://bucket.test/B4.TIF"), ("nir", "https://bucket.test/B5.TIF")]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();
    Feature::new(
        id,
        None,
        SceneProperties {
            cloud_cover: Some(cloud_cover),
            bands: Some(Bands::Urls(bands)),
            ..Default::default()
        },
    )
    .with_bbox(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
}

async fn app() -> (Router, Catalog) {
    let mut config = CatalogConfig::with_defaults();
    config.update_from_cli(CatalogOverrides {
        prefix: Some("api".to_string()),
        poll_interval: Some(Duration::from_millis(5)),
        ..Default::default()
    });
    let catalog = Catalog::new(Arc::new(MemoryStorage::new()), &config);
    catalog.store_feature(&scene("landsat:clear", 10.0), 2.0).await.unwrap();
    catalog.store_feature(&scene("landsat:cloudy", 80.0), 3.0).await.unwrap();

    let harvester = Harvester::new(
        catalog.clone(),
        Arc::new(OnePageFeed),
        Arc::new(NoopEventSink),
        &HarvestConfig::default(),
    );
    let router = create_router(Arc::new(AppState::new(catalog.clone(), harvester)));
    (router, catalog)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn ids(body: &Value) -> Vec<&str> {
    body["images"]["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_discover_without_constraints() {
    let (app, _) = app().await;
    let (status, body) = send(&app, get("/discover")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["startIndex"], 0);
    assert_eq!(body["images"]["type"], "FeatureCollection");
    assert_eq!(ids(&body), vec!["landsat:clear", "landsat:cloudy"]);
}

#[tokio::test]
async fn test_discover_with_query_constraints() {
    let (app, _) = app().await;

    let (_, body) = send(&app, get("/discover?cloudCover=50&bands=red,nir&bbox=5,5,20,20")).await;
    assert_eq!(ids(&body), vec!["landsat:clear"]);

    let (_, body) = send(&app, get("/discover?bbox=50,50,60,60")).await;
    assert_eq!(body["count"], 0);

    let (_, body) = send(&app, get("/discover?start=1&end=1")).await;
    assert_eq!(body["startIndex"], 1);
    assert_eq!(ids(&body), vec!["landsat:cloudy"]);
}

#[tokio::test]
async fn test_discover_rejects_malformed_bbox() {
    let (app, _) = app().await;
    let (status, body) = send(&app, get("/discover?bbox=1,2,x,4")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid bbox");
}

#[tokio::test]
async fn test_discover_with_feature_body() {
    let (app, _) = app().await;
    let constraint = json!({
        "type": "Feature",
        "geometry": null,
        "properties": {"cloudCover": 90, "bands": ["nir"]}
    });
    let request = Request::builder()
        .method("POST")
        .uri("/discover?end=0")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(constraint.to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["landsat:clear"]);
}

#[tokio::test]
async fn test_discover_accepts_bare_properties_body() {
    let (app, _) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/discover")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"properties": {"cloudCover": 50}}).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["landsat:clear"]);
}

#[tokio::test]
async fn test_discover_with_extreme_page_bounds() {
    let (app, _) = app().await;

    let (status, body) = send(&app, get("/discover?end=18446744073709551615")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["landsat:clear", "landsat:cloudy"]);

    let (status, body) = send(&app, get("/discover?start=18446744073709551615")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_get_image() {
    let (app, _) = app().await;

    let (status, body) = send(&app, get("/images/landsat:clear")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"]["cloudCover"], 10.0);
    assert_eq!(body["bbox"], json!([0.0, 0.0, 10.0, 10.0]));

    let (status, body) = send(&app, get("/images/landsat:missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_band_redirect() {
    let (app, _) = app().await;

    let response = app.clone().oneshot(get("/images/landsat:clear/bands/nir")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "https://bucket.test/B5.TIF");

    let (status, _) = send(&app, get("/images/landsat:clear/bands/cirrus")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_size_and_drop() {
    let (app, catalog) = app().await;

    let (_, body) = send(&app, get("/index/size")).await;
    assert_eq!(body["size"], 2);

    let request = Request::builder().method("DELETE").uri("/index").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/index/size")).await;
    assert_eq!(body["size"], 0);
    assert!(catalog.get_image("landsat:clear").await.is_ok());
}

#[tokio::test]
async fn test_harvest_runs_in_background() {
    let (app, catalog) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/harvest")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"planetKey": "k", "reharvest": 5.0}).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "accepted");

    for _ in 0..100 {
        if catalog.index_size().await.unwrap() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let harvested = catalog.get_image("landsat:LC81230452016099LGN00").await.unwrap();
    assert_eq!(harvested.cloud_cover(), Some(1.0));
}
