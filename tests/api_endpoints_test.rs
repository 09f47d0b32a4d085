use axum::body::Body;
use axum::http::{Request, StatusCode};
use blackshark::api::{self, AppState};
use blackshark::config::Config;
use blackshark::db::init_db;
use blackshark::domain::DatePreset;
use blackshark::Repository;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

fn test_config(max_import_rows: usize) -> Config {
    Config {
        port: 0,
        database_path: ":memory:".to_string(),
        default_preset: DatePreset::AllTime,
        tz_offset_minutes: 0,
        max_import_rows,
    }
}

async fn setup_test_app(max_import_rows: usize) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let repo = Arc::new(Repository::new(pool));
    let state = AppState::new(repo, test_config(max_import_rows));

    TestApp {
        app: api::create_router(state),
        _temp: temp_dir,
    }
}

/// Two sales on 2023-11-14, a clickbank refund on the 15th and an
/// unattributed buygoods chargeback on the 16th (UTC).
fn sample_rows() -> Value {
    json!([
        {
            "id": 1,
            "action_type": "front_sale",
            "platform": "BUYGOODS",
            "revenue": 100,
            "platform_tax": 0.05,
            "platform_transaction_tax": 1,
            "taxes": 2,
            "aff_commission": 10,
            "cogs": 20,
            "affiliate_id": "A",
            "product_id": "P1",
            "transaction_date": 1_700_000_000_000_i64
        },
        {
            "id": 2,
            "action_type": "back_sale",
            "platform": "buygoods",
            "revenue": "50",
            "affiliate_id": "B",
            "product_id": "P2",
            "transaction_date": 1_700_003_600_000_i64
        },
        {
            "id": 3,
            "action_type": "refund",
            "platform": "clickbank",
            "merchant_commission": -15,
            "affiliate_id": "A",
            "product_id": "P1",
            "transaction_date": 1_700_090_000_000_i64
        },
        {
            "id": 4,
            "action_type": "chargeback",
            "platform": "buygoods",
            "revenue": 30,
            "aff_commission": 3,
            "taxes": 1,
            "transaction_date": 1_700_100_000_000_i64
        }
    ])
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &axum::Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn seeded_app() -> TestApp {
    let t = setup_test_app(1000).await;
    let (status, body) = post_json(&t.app, "/v1/sales", &sample_rows()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 4);
    t
}

fn num(v: &Value) -> f64 {
    v.as_f64().unwrap_or_else(|| panic!("not a number: {}", v))
}

#[tokio::test]
async fn test_health_and_ready() {
    let t = setup_test_app(10).await;
    let (status, body) = get(&t.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&t.app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["records"], 0);
}

#[tokio::test]
async fn test_ingest_is_idempotent_and_reports_anomalies() {
    let t = setup_test_app(10).await;
    let rows = json!([
        {"id": "a", "action_type": "front_sale", "revenue": "12,50"},
        {"id": "b", "revenue": "n/a", "transaction_date": "yesterday-ish"}
    ]);

    let (status, body) = post_json(&t.app, "/v1/sales", &rows).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], 2);
    assert_eq!(body["inserted"], 2);

    let anomalies = body["anomalies"].as_array().unwrap();
    assert!(anomalies.iter().all(|a| a["rowIndex"] == 1));
    assert!(anomalies.iter().any(|a| a["field"] == "revenue"));

    let (_, body) = post_json(&t.app, "/v1/sales", &rows).await;
    assert_eq!(body["inserted"], 0);
}

#[tokio::test]
async fn test_ingest_rejects_non_objects_and_oversized_batches() {
    let t = setup_test_app(2).await;

    let (status, body) = post_json(&t.app, "/v1/sales", &json!([{"id": 1}, 7])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("row 1"));

    let (status, _) = post_json(&t.app, "/v1/sales", &json!([{}, {}, {}])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_csv_import_then_filter_by_platform() {
    let t = seeded_app().await;
    let csv = "id,action_type,platform,revenue,taxes,transaction_date\n\
               10,front_sale,cartpanda,40,,2023-11-20\n\
               11,rebill,cartpanda,25,1,2023-11-21T10:00:00Z\n";

    let (status, body) = send(
        &t.app,
        Request::builder()
            .method("POST")
            .uri("/v1/sales/csv")
            .header("content-type", "text/csv")
            .body(Body::from(csv))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);

    let (status, body) = get(&t.app, "/v1/summary?platform=CartPanda").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recordCount"], 2);
    assert_eq!(num(&body["metrics"]["revenue"]), 65.0);
    assert_eq!(num(&body["metrics"]["grossSales"]), 64.0);
    assert_eq!(body["metrics"]["counts"]["rebills"], 1);
}

#[tokio::test]
async fn test_csv_epoch_dates_fall_inside_ranges() {
    let t = setup_test_app(10).await;
    // 2024-03-15T10:00:00Z as milliseconds and as seconds.
    let csv = "id,action_type,platform,revenue,transaction_date\n\
               1,front_sale,digistore,10,1710496800000\n\
               2,front_sale,digistore,5,1710496800\n";

    let (status, body) = send(
        &t.app,
        Request::builder()
            .method("POST")
            .uri("/v1/sales/csv")
            .body(Body::from(csv))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["anomalies"], json!([]));

    let (_, body) = get(
        &t.app,
        "/v1/summary?fromMs=1710460800000&toMs=1710547199999",
    )
    .await;
    assert_eq!(body["recordCount"], 2);
    assert_eq!(num(&body["metrics"]["revenue"]), 15.0);
}

#[tokio::test]
async fn test_refund_under_sale_transaction_id_is_counted() {
    let t = setup_test_app(10).await;
    let rows = json!([
        {
            "transaction_id": "T1",
            "action_type": "front_sale",
            "platform": "clickbank",
            "revenue": 60
        },
        {
            "transaction_id": "T1",
            "action_type": "refund",
            "platform": "clickbank",
            "merchant_commission": -15
        }
    ]);

    let (status, body) = post_json(&t.app, "/v1/sales", &rows).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);

    let (_, body) = get(&t.app, "/v1/summary").await;
    assert_eq!(body["recordCount"], 2);
    assert_eq!(num(&body["metrics"]["totalRefundsCost"]), 15.0);
    assert_eq!(num(&body["rates"]["refundRate"]), 100.0);

    let (status, body) = get(&t.app, "/v1/sales/id:clickbank:refund:T1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(num(&body["net_sales"]), -15.0);
}

#[tokio::test]
async fn test_summary_over_all_records() {
    let t = seeded_app().await;
    let (status, body) = get(&t.app, "/v1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("range").is_none());

    let m = &body["metrics"];
    assert_eq!(num(&m["revenue"]), 150.0);
    assert_eq!(num(&m["grossSales"]), 142.0);
    assert_eq!(num(&m["netSales"]), 132.0);
    assert_eq!(num(&m["totalRefundsCost"]), 41.0);
    assert_eq!(num(&m["netFinal"]), 91.0);
    assert_eq!(num(&m["totalCogs"]), 20.0);
    assert_eq!(num(&m["profit"]), 71.0);
    assert_eq!(num(&m["aov"]), 142.0);

    let r = &body["rates"];
    assert_eq!(r["sales"], 2);
    assert_eq!(num(&r["refundRate"]), 50.0);
    assert_eq!(num(&r["chargebackRate"]), 50.0);
    assert_eq!(num(&r["healthScore"]), 0.0);
    assert_eq!(r["healthBand"], "critical");
    assert_eq!(r["chargebackRisk"], "critical");
}

#[tokio::test]
async fn test_summary_range_and_action_filters() {
    let t = seeded_app().await;

    let (_, body) = get(
        &t.app,
        "/v1/summary?fromMs=1700000000000&toMs=1700003600000",
    )
    .await;
    assert_eq!(body["recordCount"], 2);
    assert_eq!(body["range"]["from"], 1_700_000_000_000_i64);
    assert_eq!(num(&body["metrics"]["totalRefundsCost"]), 0.0);

    let (_, body) = get(&t.app, "/v1/summary?actionType=refund").await;
    assert_eq!(body["recordCount"], 1);
    assert_eq!(num(&body["metrics"]["totalRefundsCost"]), 15.0);

    let (_, body) = get(&t.app, "/v1/summary?affiliateId=A").await;
    assert_eq!(body["recordCount"], 2);
    assert_eq!(num(&body["metrics"]["netFinal"]), 67.0);
}

#[tokio::test]
async fn test_summary_rejects_bad_scope() {
    let t = seeded_app().await;

    let (status, body) = get(&t.app, "/v1/summary?fromMs=10&toMs=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "fromMs must be <= toMs");

    let (status, _) = get(&t.app, "/v1/summary?preset=fortnight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_affiliates_and_products_ranking() {
    let t = seeded_app().await;

    let (status, body) = get(&t.app, "/v1/affiliates").await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["A", "B", "unassigned"]);
    assert_eq!(body[0]["rank"], 1);

    let (_, body) = get(&t.app, "/v1/affiliates?metric=refunds&limit=2").await;
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["unassigned", "A"]);

    let (_, body) = get(&t.app, "/v1/products?metric=netSales").await;
    assert_eq!(body[0]["key"], "P1");
    assert_eq!(num(&body[0]["metrics"]["netSales"]), 82.0);

    let (status, _) = get(&t.app, "/v1/products?metric=volume").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeline_buckets() {
    let t = seeded_app().await;

    let (status, body) = get(&t.app, "/v1/timeline").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bucket"], "day");
    let keys: Vec<&str> = body["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["2023-11-14", "2023-11-15", "2023-11-16"]);
    assert_eq!(body["points"][0]["metrics"]["counts"]["total"], 2);

    let (_, body) = get(&t.app, "/v1/timeline?bucket=hour&actionType=front_sale").await;
    assert_eq!(body["points"][0]["key"], "2023-11-14 22:00");

    let (status, _) = get(&t.app, "/v1/timeline?bucket=week").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transactions_newest_first_with_net_sales() {
    let t = seeded_app().await;

    let (status, body) = get(&t.app, "/v1/transactions?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);

    let txs = body["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0]["id"], "4");
    assert_eq!(num(&txs[0]["net_sales"]), -26.0);
    assert_eq!(txs[1]["id"], "3");
    assert_eq!(num(&txs[1]["net_sales"]), -15.0);

    let (status, _) = get(&t.app, "/v1/transactions?limit=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_single_sale() {
    let t = seeded_app().await;

    let (status, body) = get(&t.app, "/v1/sales/id:buygoods:front_sale:1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action_type"], "front_sale");
    assert_eq!(num(&body["net_sales"]), 82.0);

    let (status, body) = get(&t.app, "/v1/sales/id:buygoods:front_sale:999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_risk_by_platform() {
    let t = seeded_app().await;

    let (status, body) = get(&t.app, "/v1/risk").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall"]["chargebacks"], 1);

    let platforms: Vec<&str> = body["byPlatform"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["platform"].as_str().unwrap())
        .collect();
    assert_eq!(platforms, vec!["buygoods", "clickbank"]);
    assert_eq!(num(&body["byPlatform"][0]["chargebackRate"]), 50.0);
    // Clickbank has a refund but no completed sales.
    assert_eq!(num(&body["byPlatform"][1]["refundRate"]), 0.0);
    assert_eq!(num(&body["byPlatform"][1]["healthScore"]), 0.0);
}
