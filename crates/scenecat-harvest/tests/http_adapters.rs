//! HTTP feed and event sink against a local axum server

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use scenecat_catalog::Catalog;
use scenecat_core::config::{CatalogConfig, HarvestConfig};
use scenecat_core::error::CatalogError;
use scenecat_core::models::{Feature, HarvestOptions, SceneProperties};
use scenecat_harvest::{EventSink, Harvester, HttpEventSink, PlanetFeed, SceneFeed, StopReason};
use scenecat_store::MemoryStorage;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Recorded {
    base_url: Arc<Mutex<String>>,
    auth: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<Value>>>,
}

async fn landsat_page(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    recorded.auth.lock().unwrap().push(auth);

    let base = recorded.base_url.lock().unwrap().clone();
    match params.get("page").map(String::as_str) {
        None => Json(json!({
            "type": "FeatureCollection",
            "features": [scene("LC81230452016001LGN00")],
            "links": {"next": format!("{}/v0/scenes/landsat/?page=2", base)}
        })),
        _ => Json(json!({
            "type": "FeatureCollection",
            "features": [scene("LC81230452016002LGN00")],
            "links": {"next": null}
        })),
    }
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

async fn record_event(State(recorded): State<Recorded>, Json(body): Json<Value>) -> StatusCode {
    recorded.events.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

fn scene(id: &str) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
        "properties": {
            "acquired": "2016-01-01T00:00:00Z",
            "cloud_cover": {"estimated": 3.0},
            "image_statistics": {"gsd": 15.0}
        }
    })
}

async fn serve() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v0/scenes/landsat/", get(landsat_page))
        .route("/broken", get(broken))
        .route("/garbage", get(garbage))
        .route("/events", post(record_event))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    *recorded.base_url.lock().unwrap() = base_url.clone();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, recorded)
}

#[tokio::test]
async fn test_fetch_page_sends_basic_auth_and_reads_next_link() {
    let (base_url, recorded) = serve().await;
    let feed = PlanetFeed::new(&format!("{}/", base_url)).unwrap();

    let page = feed.fetch_page("v0/scenes/landsat/?count=1000", "secret").await.unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.next, Some(format!("{}/v0/scenes/landsat/?page=2", base_url)));
    // base64("secret:")
    assert_eq!(recorded.auth.lock().unwrap().clone(), vec!["Basic c2VjcmV0Og=="]);

    let last = feed.fetch_page(page.next.as_deref().unwrap(), "secret").await.unwrap();
    assert_eq!(last.next, None);
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let (base_url, _) = serve().await;
    let feed = PlanetFeed::new(&base_url).unwrap();

    match feed.fetch_page("/broken", "k").await {
        Err(CatalogError::Upstream { status, message }) => {
            assert_eq!(status, Some(500));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparsable_page_is_upstream_error() {
    let (base_url, _) = serve().await;
    let feed = PlanetFeed::new(&base_url).unwrap();

    let err = feed.fetch_page("/garbage", "k").await.unwrap_err();
    assert!(matches!(err, CatalogError::Upstream { status: None, .. }));
}

#[tokio::test]
async fn test_http_event_sink_posts_type_and_feature() {
    let (base_url, recorded) = serve().await;
    let sink = HttpEventSink::new(format!("{}/events", base_url), "scenecat:harvested");
    let feature = Feature::new("landsat:x", None, SceneProperties::default());

    sink.emit(&feature).await.unwrap();

    let events = recorded.events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "scenecat:harvested");
    assert_eq!(events[0]["data"]["id"], "landsat:x");
}

#[tokio::test]
async fn test_http_event_sink_reports_rejection() {
    let (base_url, _) = serve().await;
    let sink = HttpEventSink::new(format!("{}/broken", base_url), "t");
    let feature = Feature::new("landsat:x", None, SceneProperties::default());

    let err = sink.emit(&feature).await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(405));
}

#[tokio::test]
async fn test_full_run_over_http() {
    let (base_url, recorded) = serve().await;
    let config = HarvestConfig {
        base_url: format!("{}/", base_url),
        event_url: Some(format!("{}/events", base_url)),
        ..Default::default()
    };
    let catalog = Catalog::new(Arc::new(MemoryStorage::new()), &CatalogConfig::with_defaults());
    let harvester = Harvester::from_config(catalog, &config).unwrap();

    let options = HarvestOptions { planet_key: Some("secret".to_string()), ..Default::default() };
    let report = harvester.run(&options).await.unwrap();

    assert_eq!(report.harvested, 2);
    assert_eq!(report.pages, 2);
    assert!(matches!(report.stopped, StopReason::Exhausted));

    let stored = harvester.catalog().get_image("landsat:LC81230452016002LGN00").await.unwrap();
    assert_eq!(stored.properties.resolution, Some(15.0));
    assert_eq!(recorded.auth.lock().unwrap().len(), 2);
    // Events were not requested
    assert!(recorded.events.lock().unwrap().is_empty());
}
