//! `RestStore` against a small in-process PostgREST stand-in.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use december_db::{RestStore, StoreError};
use december_types::models::ConfessionId;

struct Fake {
    rpc_enabled: bool,
    rpc_attempts: AtomicUsize,
    next_id: AtomicI64,
    rows: Mutex<Vec<Value>>,
    prefer: Mutex<Option<String>>,
    apikey: Mutex<Option<String>>,
}

type Shared = Arc<Fake>;

fn invalid_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": "22P02", "message": "invalid input syntax for type bigint" })),
    )
        .into_response()
}

/// `eq.<n>` filter → row id. `Err` carries the 400 PostgREST would send.
fn id_filter(query: &HashMap<String, String>) -> Option<Result<i64, Response>> {
    let raw = query.get("id")?.strip_prefix("eq.")?;
    Some(raw.parse().map_err(|_| invalid_id()))
}

async fn select(
    State(fake): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *fake.apikey.lock().unwrap() = headers
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let rows = fake.rows.lock().unwrap();
    match id_filter(&query) {
        None => Json(Value::Array(rows.clone())).into_response(),
        Some(Err(resp)) => resp,
        Some(Ok(id)) => {
            let found: Vec<Value> = rows
                .iter()
                .filter(|r| r["id"].as_i64() == Some(id))
                .map(|r| json!({ "likes": r["likes"] }))
                .collect();
            Json(Value::Array(found)).into_response()
        }
    }
}

async fn insert(State(fake): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let prefer = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let wants_rows = prefer.as_deref() == Some("return=representation");
    *fake.prefer.lock().unwrap() = prefer;

    let id = fake.next_id.fetch_add(1, Ordering::SeqCst);
    let row = json!({
        "id": id,
        "text": body[0]["text"],
        "created_at": "2025-12-24T18:30:00.123456",
        "likes": body[0]["likes"],
    });
    fake.rows.lock().unwrap().push(row.clone());

    if wants_rows {
        (StatusCode::CREATED, Json(json!([row]))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn update(
    State(fake): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let id = match id_filter(&query) {
        Some(Ok(id)) => id,
        Some(Err(resp)) => return resp,
        None => return StatusCode::BAD_REQUEST.into_response(),
    };
    let mut rows = fake.rows.lock().unwrap();
    for row in rows.iter_mut().filter(|r| r["id"].as_i64() == Some(id)) {
        row["likes"] = body["likes"].clone();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn increment(State(fake): State<Shared>, Json(body): Json<Value>) -> Response {
    fake.rpc_attempts.fetch_add(1, Ordering::SeqCst);
    if !fake.rpc_enabled {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "PGRST202", "message": "Could not find the function" })),
        )
            .into_response();
    }

    let Some(Ok(id)) = body["row_id"].as_str().map(str::parse::<i64>) else {
        return invalid_id();
    };
    let mut rows = fake.rows.lock().unwrap();
    match rows.iter_mut().find(|r| r["id"].as_i64() == Some(id)) {
        Some(row) => {
            let likes = row["likes"].as_u64().unwrap_or(0) + 1;
            row["likes"] = json!(likes);
            Json(json!(likes)).into_response()
        }
        None => Json(Value::Null).into_response(),
    }
}

async fn spawn_fake(rpc_enabled: bool) -> (RestStore, Shared) {
    let fake = Arc::new(Fake {
        rpc_enabled,
        rpc_attempts: AtomicUsize::new(0),
        next_id: AtomicI64::new(3),
        rows: Mutex::new(vec![
            json!({ "id": 1, "text": "salju pertama", "created_at": "2025-12-20 08:00:00", "likes": null }),
            json!({ "id": 2, "text": "rindu rumah", "created_at": "2025-12-21T09:15:00+00:00", "likes": 3 }),
        ]),
        prefer: Mutex::new(None),
        apikey: Mutex::new(None),
    });

    let app = Router::new()
        .route("/rest/v1/messages", get(select).post(insert).patch(update))
        .route("/rest/v1/rpc/increment_likes", post(increment))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = RestStore::new(&format!("http://{}", addr), "anon-key").unwrap();
    (store, fake)
}

#[tokio::test]
async fn listing_tolerates_integer_ids_null_likes_and_naive_timestamps() {
    let (store, fake) = spawn_fake(true).await;

    let mut all = store.list_all().await.unwrap();
    all.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, ConfessionId::from("1"));
    assert_eq!(all[0].likes, 0);
    assert_eq!(all[1].likes, 3);
    assert_eq!(fake.apikey.lock().unwrap().as_deref(), Some("anon-key"));
}

#[tokio::test]
async fn insert_asks_for_the_created_row() {
    let (store, fake) = spawn_fake(true).await;

    let created = store.insert("Salju turun lagi").await.unwrap();
    assert_eq!(created.id, ConfessionId::from("3"));
    assert_eq!(created.text, "Salju turun lagi");
    assert_eq!(created.likes, 0);
    assert_eq!(
        fake.prefer.lock().unwrap().as_deref(),
        Some("return=representation")
    );
}

#[tokio::test]
async fn like_uses_increment_rpc() {
    let (store, fake) = spawn_fake(true).await;

    assert_eq!(store.like(&ConfessionId::from("2")).await.unwrap(), 4);
    assert_eq!(store.like(&ConfessionId::from("1")).await.unwrap(), 1);
    assert_eq!(fake.rpc_attempts.load(Ordering::SeqCst), 2);

    let err = store.like(&ConfessionId::from("99")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id.as_str() == "99"));
}

#[tokio::test]
async fn missing_rpc_falls_back_to_read_then_write_and_stays_there() {
    let (store, fake) = spawn_fake(false).await;

    assert_eq!(store.like(&ConfessionId::from("1")).await.unwrap(), 1);
    assert_eq!(store.like(&ConfessionId::from("1")).await.unwrap(), 2);
    assert_eq!(store.like(&ConfessionId::from("2")).await.unwrap(), 4);
    assert_eq!(fake.rpc_attempts.load(Ordering::SeqCst), 1);

    let err = store.like(&ConfessionId::from("99")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn malformed_id_is_not_found_on_both_paths() {
    let (store, _) = spawn_fake(true).await;
    let err = store.like(&ConfessionId::from("not-a-number")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let (store, _) = spawn_fake(false).await;
    let err = store.like(&ConfessionId::from("not-a-number")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
