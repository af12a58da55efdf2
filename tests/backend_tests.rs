//! Routes that read and write the hosted backend, run against an in-process
//! stand-in for its REST interface.

mod common;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use common::{TestApp, test_config};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wayfare::backend::BackendClient;
use wayfare::itinerary::EmailTemplates;
use wayfare::{AppState, api};
use wayfare_mail::{DEFAULT_FROM, MemoryMailer};

const TRIP_ID: &str = "6f1c2d7e-0000-4000-8000-0000000000aa";
const POST_ID: &str = "6f1c2d7e-0000-4000-8000-0000000000b1";
const USER_ID: &str = "6f1c2d7e-0000-4000-8000-0000000000c1";

/// Rows served by the stand-in plus a log of every request it saw.
#[derive(Clone, Default)]
struct FakeRest {
    requests: Arc<Mutex<Vec<(String, String, HashMap<String, String>)>>>,
    likes: Arc<Mutex<i64>>,
    /// `(post_id, user_id)` pairs in `community_likes`.
    like_rows: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeRest {
    fn record(&self, method: &str, table: &str, query: &HashMap<String, String>) {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), table.to_string(), query.clone()));
    }

    fn seen(&self, method: &str, table: &str) -> Vec<HashMap<String, String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, t, _)| m == method && t == table)
            .map(|(_, _, q)| q.clone())
            .collect()
    }

    fn matching_likes(&self, query: &HashMap<String, String>) -> Vec<Value> {
        let wanted = |column: &str, value: &str| {
            query
                .get(column)
                .is_none_or(|filter| filter.strip_prefix("eq.") == Some(value))
        };
        self.like_rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(post, user)| wanted("post_id", post) && wanted("user_id", user))
            .map(|(post, user)| like_row(post, user))
            .collect()
    }
}

fn like_row(post_id: &str, user_id: &str) -> Value {
    json!({"id": "6f1c2d7e-0000-4000-8000-0000000000d1", "post_id": post_id, "user_id": user_id})
}

fn post_row(id: &str, channel: &str, title: &str, likes: i64, created_at: &str) -> Value {
    json!({
        "id": id,
        "user_id": USER_ID,
        "channel": channel,
        "title": title,
        "content": "Notes from the road",
        "image_url": null,
        "likes": likes,
        "created_at": created_at
    })
}

async fn select(
    State(fake): State<FakeRest>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    fake.record("GET", &table, &query);
    let rows = match table.as_str() {
        "trips" if query.get("id") == Some(&format!("eq.{}", TRIP_ID)) => json!([{
            "id": TRIP_ID,
            "name": "Iberia Loop",
            "description": "Lisbon and Porto",
            "start_date": "2026-05-28",
            "end_date": "2026-06-03",
            "total_budget": 2000,
            "budget_currency": "EUR",
            "cover_photo_url": null
        }]),
        "trips" => json!([]),
        "trip_destinations" => json!([
            {
                "id": "6f1c2d7e-0000-4000-8000-000000000001",
                "trip_id": TRIP_ID,
                "city_name": "Lisbon",
                "country_name": "Portugal",
                "arrival_date": "2026-05-28",
                "departure_date": "2026-05-31",
                "trip_activities": [
                    {"id": "6f1c2d7e-0000-4000-8000-000000000011", "name": "Tram 28", "cost": 40},
                    {"id": "6f1c2d7e-0000-4000-8000-000000000012", "name": "Fado night", "cost": 60}
                ]
            },
            {
                "id": "6f1c2d7e-0000-4000-8000-000000000002",
                "trip_id": TRIP_ID,
                "city_name": "Porto",
                "country_name": "Portugal",
                "trip_activities": []
            }
        ]),
        "trip_expenses" => json!([
            {"id": "6f1c2d7e-0000-4000-8000-000000000021", "category": "Food", "amount": 30, "expense_date": "2026-06-01"},
            {"id": "6f1c2d7e-0000-4000-8000-000000000022", "category": "Transport", "amount": 120, "expense_date": "2026-05-29"},
            {"id": "6f1c2d7e-0000-4000-8000-000000000023", "category": "Food", "amount": 20, "expense_date": "2026-05-28"}
        ]),
        "community_posts" if query.contains_key("id") => {
            json!([post_row(POST_ID, "Tourism", "Kyoto temples", *fake.likes.lock().unwrap(), "2026-03-01T09:00:00Z")])
        }
        "community_posts" => json!([
            post_row(POST_ID, "Tourism", "Kyoto temples", 1240, "2026-03-01T09:00:00Z"),
            post_row("6f1c2d7e-0000-4000-8000-0000000000b2", "Way2Travel", "Cheap flights", 89, "2026-03-01T12:00:00Z"),
            post_row("6f1c2d7e-0000-4000-8000-0000000000b3", "Tourism", "Hidden Bali", 2100, "2026-03-01T03:00:00Z")
        ]),
        "community_likes" => Value::Array(fake.matching_likes(&query)),
        _ => return (StatusCode::NOT_FOUND, Json(json!({"message": "relation does not exist"}))),
    };
    (StatusCode::OK, Json(rows))
}

async fn insert(
    State(fake): State<FakeRest>,
    Path(table): Path<String>,
    Json(row): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.record("POST", &table, &HashMap::new());
    let stored = match table.as_str() {
        "community_posts" => {
            let mut stored = row.clone();
            stored["id"] = json!("6f1c2d7e-0000-4000-8000-0000000000b9");
            stored["likes"] = json!(0);
            stored["created_at"] = json!("2026-03-02T10:00:00Z");
            stored
        }
        "community_likes" => {
            fake.like_rows.lock().unwrap().push((
                row["post_id"].as_str().unwrap_or_default().to_string(),
                row["user_id"].as_str().unwrap_or_default().to_string(),
            ));
            let mut stored = row.clone();
            stored["id"] = json!("6f1c2d7e-0000-4000-8000-0000000000d1");
            stored
        }
        _ => row,
    };
    (StatusCode::CREATED, Json(json!([stored])))
}

async fn update(
    State(fake): State<FakeRest>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Json<Value> {
    fake.record("PATCH", &table, &query);
    let likes = patch["likes"].as_i64().unwrap_or_default();
    *fake.likes.lock().unwrap() = likes;
    Json(json!([post_row(POST_ID, "Tourism", "Kyoto temples", likes, "2026-03-01T09:00:00Z")]))
}

async fn delete(
    State(fake): State<FakeRest>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    fake.record("DELETE", &table, &query);
    let removed = fake.matching_likes(&query);
    fake.like_rows.lock().unwrap().retain(|(post, user)| {
        !removed
            .iter()
            .any(|row| row["post_id"] == post.as_str() && row["user_id"] == user.as_str())
    });
    Json(Value::Array(removed))
}

/// Starts the stand-in and a service wired to it. The post starts with
/// `likes` like rows from other users and a matching counter.
async fn backed_app(likes: i64) -> (TestApp, FakeRest) {
    backed_app_with(likes, likes as usize).await
}

async fn backed_app_with(counter: i64, like_rows: usize) -> (TestApp, FakeRest) {
    let rows = (0..like_rows)
        .map(|i| (POST_ID.to_string(), format!("6f1c2d7e-0000-4000-8000-{:012}", i)))
        .collect();
    let fake = FakeRest {
        likes: Arc::new(Mutex::new(counter)),
        like_rows: Arc::new(Mutex::new(rows)),
        ..FakeRest::default()
    };
    let rest = Router::new()
        .route(
            "/rest/v1/{table}",
            get(select).post(insert).patch(update).delete(delete),
        )
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, rest).await.unwrap();
    });

    let config = test_config(&format!(
        "[backend]\nurl = \"http://{}\"\nanon_key = \"anon-key\"",
        addr
    ));
    let client = BackendClient::new(&config.backend).unwrap();
    let mailer = Arc::new(MemoryMailer::new(DEFAULT_FROM).unwrap());
    let state = AppState::new(
        config,
        mailer.clone(),
        Some(client),
        EmailTemplates::new().unwrap(),
    );
    (
        TestApp {
            router: api::router(state),
            mailer,
        },
        fake,
    )
}

#[tokio::test]
async fn test_trip_summary() {
    let (app, fake) = backed_app(0).await;
    let response = app.get(&format!("/api/v1/trips/{}/summary", TRIP_ID)).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["tripName"], "Iberia Loop");
    assert_eq!(body["durationDays"], 7);
    assert_eq!(body["stops"], 2);
    assert_eq!(body["activities"], 2);
    assert_eq!(body["activityCost"], 100.0);
    assert_eq!(body["expenseCost"], 170.0);
    assert_eq!(body["totalCost"], 270.0);
    assert_eq!(body["remainingBudget"], 1730.0);
    assert_eq!(
        body["breakdown"],
        json!([
            {"name": "Activities", "value": 100.0},
            {"name": "Food", "value": 50.0},
            {"name": "Transport", "value": 120.0}
        ])
    );

    let destinations = fake.seen("GET", "trip_destinations");
    assert_eq!(destinations[0]["select"], "*,trip_activities(*)");
    assert_eq!(destinations[0]["order"], "list_order.asc");
    let expenses = fake.seen("GET", "trip_expenses");
    assert_eq!(expenses[0]["order"], "expense_date.desc");
}

#[tokio::test]
async fn test_unknown_trip_is_not_found() {
    let (app, fake) = backed_app(0).await;
    let response = app
        .get("/api/v1/trips/6f1c2d7e-0000-4000-8000-00000000ffff/summary")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(fake.seen("GET", "trip_destinations").is_empty());
}

#[tokio::test]
async fn test_malformed_trip_id_is_bad_request() {
    let (app, _) = backed_app(0).await;
    let response = app.get("/api/v1/trips/not-a-uuid/summary").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_share_includes_summary_when_trip_is_known() {
    let (app, _) = backed_app(0).await;
    let response = app
        .post_json(
            "/api/v1/trips/share",
            json!({
                "email": "friend@example.com",
                "tripName": "Iberia Loop",
                "snapshotBase64": common::fixtures::png_base64(20, 20),
                "tripId": TRIP_ID
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let html = &app.mailer.sent()[0].html;
    assert!(html.contains("<td>7 days</td>"));
    assert!(html.contains("EUR 1730.00"));
}

#[tokio::test]
async fn test_community_feed_filters_and_sorts() {
    let (app, fake) = backed_app(0).await;
    let response = app
        .get("/api/v1/community/posts?channel=Tourism&sort=popular")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let titles: Vec<String> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Hidden Bali", "Kyoto temples"]);
    assert_eq!(fake.seen("GET", "community_posts")[0]["channel"], "eq.Tourism");
}

#[tokio::test]
async fn test_community_feed_search_and_recent() {
    let (app, _) = backed_app(0).await;
    let response = app.get("/api/v1/community/posts?channel=All&q=FLIGHTS").await;
    let body = response.json();
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Cheap flights");

    let response = app.get("/api/v1/community/posts").await;
    let titles: Vec<String> = response
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Cheap flights", "Kyoto temples", "Hidden Bali"]);
}

#[tokio::test]
async fn test_unknown_channel_is_bad_request() {
    let (app, _) = backed_app(0).await;
    let response = app.get("/api/v1/community/posts?channel=Gossip").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_post() {
    let (app, fake) = backed_app(0).await;
    let response = app
        .post_json(
            "/api/v1/community/posts",
            json!({
                "userId": USER_ID,
                "channel": "DreamWeavers",
                "title": "Northern lights",
                "content": "Tromsø in February"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["likes"], 0);
    assert_eq!(body["channel"], "DreamWeavers");
    assert_eq!(fake.seen("POST", "community_posts").len(), 1);
}

#[tokio::test]
async fn test_create_post_validates_before_insert() {
    let (app, fake) = backed_app(0).await;
    let response = app
        .post_json(
            "/api/v1/community/posts",
            json!({"userId": USER_ID, "channel": "All", "title": "x", "content": "y"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(fake.seen("POST", "community_posts").is_empty());
}

#[tokio::test]
async fn test_like_and_unlike() {
    let (app, fake) = backed_app(10).await;
    let like_uri = format!("/api/v1/community/posts/{}/like", POST_ID);

    let response = app.post_json(&like_uri, json!({"userId": USER_ID})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["likes"], 11);
    assert_eq!(fake.seen("POST", "community_likes").len(), 1);

    let response = app
        .call(common::json_request(
            axum::http::Method::DELETE,
            &like_uri,
            &json!({"userId": USER_ID}),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["likes"], 10);

    let deletes = fake.seen("DELETE", "community_likes");
    assert_eq!(deletes[0]["post_id"], format!("eq.{}", POST_ID));
    assert_eq!(deletes[0]["user_id"], format!("eq.{}", USER_ID));
}

#[tokio::test]
async fn test_repeat_like_counts_once() {
    let (app, fake) = backed_app(10).await;
    let like_uri = format!("/api/v1/community/posts/{}/like", POST_ID);

    let first = app.post_json(&like_uri, json!({"userId": USER_ID})).await;
    let second = app.post_json(&like_uri, json!({"userId": USER_ID})).await;

    assert_eq!(first.json()["likes"], 11);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.json()["likes"], 11);
    assert_eq!(fake.seen("POST", "community_likes").len(), 1);
    assert_eq!(fake.like_rows.lock().unwrap().len(), 11);
}

#[tokio::test]
async fn test_like_resyncs_drifted_counter() {
    let (app, _) = backed_app_with(7, 10).await;
    let response = app
        .post_json(
            &format!("/api/v1/community/posts/{}/like", POST_ID),
            json!({"userId": USER_ID}),
        )
        .await;
    assert_eq!(response.json()["likes"], 11);
}

#[tokio::test]
async fn test_unlike_without_like_leaves_counter() {
    let (app, fake) = backed_app(10).await;
    let response = app
        .call(common::json_request(
            axum::http::Method::DELETE,
            &format!("/api/v1/community/posts/{}/like", POST_ID),
            &json!({"userId": USER_ID}),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["likes"], 10);
    assert!(fake.seen("PATCH", "community_posts").is_empty());
}

#[tokio::test]
async fn test_backend_routes_without_backend_are_unavailable() {
    let app = common::test_app();
    let response = app
        .get(&format!("/api/v1/trips/{}/summary", TRIP_ID))
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    let response = app.get("/api/v1/community/posts").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}
