use chrono::NaiveDate;
use inventory_alloc::alloc::{AllocationEngine, EngineConfig, FixedClock};
use inventory_alloc::http::{AppState, build_router};
use inventory_alloc::inventory::{
    ContactField, ContactRecord, InventoryStore, MarkOutcome, MemoryInventory, RecordDraft,
    StoreError,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

async fn spawn_app(store: Arc<dyn InventoryStore>) -> std::net::SocketAddr {
    let engine =
        AllocationEngine::new(store, &EngineConfig::default()).with_clock(FixedClock(today()));
    let app = build_router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    if let Some(body) = body {
        req.push_str(body);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

fn json(body: &str) -> Value {
    serde_json::from_str(body).expect("json body")
}

fn inventory() -> Arc<MemoryInventory> {
    let inv = MemoryInventory::new();
    for position in 0..10u64 {
        let draft = match position {
            5 | 8 | 9 => RecordDraft::new("Restaurants")
                .with(ContactField::Name, format!("Restaurant #{position}"))
                .with(ContactField::Email, "table@example.com"),
            _ => RecordDraft::new("Cafes"),
        };
        inv.append(draft);
    }
    Arc::new(inv)
}

#[tokio::test]
async fn health_reports_service() {
    let addr = spawn_app(inventory()).await;
    let (status, _, body) = send_raw(addr, "GET", "/health", None).await;
    assert_eq!(status, 200);
    let v = json(&body);
    assert_eq!(v["status"], "ok");
    assert_eq!(v["service"], "inventory-alloc");
}

#[tokio::test]
async fn allocate_claims_and_projects_records() {
    let inv = inventory();
    let addr = spawn_app(inv.clone()).await;

    let (status, _, body) = send_raw(
        addr,
        "POST",
        "/allocate",
        Some(r#"{"topic": "restaurant", "count": 2}"#),
    )
    .await;
    assert_eq!(status, 200);
    let v = json(&body);
    assert_eq!(v["outcome"], "allocated");
    assert_eq!(v["category"], "Restaurants");
    assert_eq!(v["requested"], 2);
    let records = v["records"].as_array().expect("records array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Restaurant #5");
    assert_eq!(records[1]["name"], "Restaurant #8");
    assert_eq!(records[0]["email"], "table@example.com");
    assert_eq!(records[0]["whatsapp"], "—");
    assert!(records[0].get("issued").is_none());

    assert!(inv.get(5).unwrap().issued);
    assert!(inv.get(8).unwrap().issued);
    assert!(!inv.get(9).unwrap().issued);

    let (status, _, body) =
        send_raw(addr, "GET", "/issued-records?year=2026&month=10", None).await;
    assert_eq!(status, 200);
    let positions: Vec<u64> = json(&body)["records"]
        .as_array()
        .expect("records array")
        .iter()
        .filter_map(|r| r["position"].as_u64())
        .collect();
    assert_eq!(positions, vec![5, 8]);
}

#[tokio::test]
async fn no_match_and_exhaustion_are_successful_outcomes() {
    let addr = spawn_app(inventory()).await;

    let (status, _, body) = send_raw(
        addr,
        "POST",
        "/allocate",
        Some(r#"{"topic": "submarine repair", "count": 3}"#),
    )
    .await;
    assert_eq!(status, 200);
    let v = json(&body);
    assert_eq!(v["outcome"], "no_category_match");
    assert_eq!(v["category"], Value::Null);
    assert_eq!(v["records"].as_array().map(Vec::len), Some(0));

    let req = r#"{"topic": "Restaurants", "count": 10}"#;
    let (_, _, body) = send_raw(addr, "POST", "/allocate", Some(req)).await;
    assert_eq!(json(&body)["records"].as_array().map(Vec::len), Some(3));
    let (status, _, body) = send_raw(addr, "POST", "/allocate", Some(req)).await;
    assert_eq!(status, 200);
    assert_eq!(json(&body)["outcome"], "no_available_records");
}

#[tokio::test]
async fn invalid_input_is_400() {
    let inv = inventory();
    let addr = spawn_app(inv.clone()).await;

    for body in [
        r#"{"topic": "restaurant", "count": 0}"#,
        r#"{"topic": "restaurant", "count": -4}"#,
        r#"{"topic": "   ", "count": 1}"#,
        r#"{"topic": "restaurant"}"#,
        r#"{"topic": "restaurant", "count": "two"}"#,
        "not json",
    ] {
        let (status, _, resp) = send_raw(addr, "POST", "/allocate", Some(body)).await;
        assert_eq!(status, 400, "body {body:?}");
        assert_eq!(json(&resp)["code"], "invalid_input");
    }
    assert!(inv.read_all().unwrap().iter().all(|r| !r.issued));

    for path in ["/issued-records?month=3", "/issued-records?year=2026&month=13"] {
        let (status, _, resp) = send_raw(addr, "GET", path, None).await;
        assert_eq!(status, 400, "path {path}");
        assert_eq!(json(&resp)["code"], "invalid_input");
    }
}

#[tokio::test]
async fn categories_lists_counts() {
    let addr = spawn_app(inventory()).await;
    let (status, _, body) = send_raw(addr, "GET", "/categories", None).await;
    assert_eq!(status, 200);
    let v = json(&body);
    assert_eq!(v["categories"][0]["category"], "Cafes");
    assert_eq!(v["categories"][0]["total"], 7);
    assert_eq!(v["categories"][1]["category"], "Restaurants");
    assert_eq!(v["categories"][1]["available"], 3);
}

struct DownStore;

impl InventoryStore for DownStore {
    fn read_all(&self) -> Result<Vec<ContactRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused by 10.0.0.7".into()))
    }

    fn conditional_mark_issued(&self, _: u64, _: NaiveDate) -> Result<MarkOutcome, StoreError> {
        Err(StoreError::Unavailable("connection refused by 10.0.0.7".into()))
    }
}

#[tokio::test]
async fn store_outage_is_503_without_details() {
    let addr = spawn_app(Arc::new(DownStore)).await;
    let (status, head, body) = send_raw(
        addr,
        "POST",
        "/allocate",
        Some(r#"{"topic": "restaurant", "count": 1}"#),
    )
    .await;
    assert_eq!(status, 503);
    assert!(head.to_ascii_lowercase().contains("retry-after: 3"));
    assert_eq!(json(&body)["code"], "store_unavailable");
    assert!(!body.contains("10.0.0.7"));
}
