use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use kosa_auth::{verify_password, Principal, TokenIssuer};
use kosa_common::models::{AvailabilityMode, NewBarber, NewClient};
use kosa_config::AuthConfig;
use kosa_db::{BarberRepository, ClientRepository, Store};
use kosa_directory::routes::routes;
use kosa_directory::DirectoryState;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    store: Store,
    issuer: Arc<TokenIssuer>,
    barber_id: i64,
    client_id: i64,
}

impl TestApp {
    fn barber_token(&self) -> String {
        self.issuer.issue_access(&Principal::barber(self.barber_id)).unwrap()
    }

    fn client_token(&self, vip: bool) -> String {
        self.issuer.issue_access(&Principal::client(self.client_id, vip)).unwrap()
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }
}

async fn seed_barber(store: &Store, username: &str, availability: AvailabilityMode) -> i64 {
    store
        .barbers
        .insert(NewBarber {
            username: username.to_string(),
            password_hash: "x".to_string(),
            name: username.to_string(),
            surname: "Barber".to_string(),
            phone: "062".to_string(),
            work_start_hour: 9,
            work_end_hour: 17,
            booking_window_days: 14,
            availability,
            calendar_id: None,
        })
        .await
        .unwrap()
        .id
}

async fn test_app() -> TestApp {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    let barber_id = seed_barber(&store, "luka", AvailabilityMode::All).await;
    seed_barber(&store, "nikola", AvailabilityMode::VipOnly).await;
    seed_barber(&store, "petar", AvailabilityMode::None).await;
    let client_id = store
        .clients
        .insert(NewClient {
            username: "marko".to_string(),
            password_hash: "x".to_string(),
            name: "Marko".to_string(),
            surname: "Petrović".to_string(),
            phone: "0601234567".to_string(),
            email: None,
            is_vip: false,
        })
        .await
        .unwrap()
        .id;

    let issuer = Arc::new(
        TokenIssuer::new(&AuthConfig {
            access_secret: "test-access".to_string(),
            refresh_secret: "test-refresh".to_string(),
            ..AuthConfig::default()
        })
        .unwrap(),
    );
    let state = DirectoryState {
        store: store.clone(),
        issuer: issuer.clone(),
    };
    TestApp {
        app: routes(state),
        store,
        issuer,
        barber_id,
        client_id,
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn usernames(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|b| b["username"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn barber_listing_follows_visibility() {
    let t = test_app().await;

    let regular = body_json(t.send(Method::GET, "/barbers", Some(&t.client_token(false)), None).await).await;
    assert_eq!(usernames(&regular), vec!["luka"]);

    let vip = body_json(t.send(Method::GET, "/barbers", Some(&t.client_token(true)), None).await).await;
    assert_eq!(usernames(&vip), vec!["luka", "nikola"]);

    let staff = body_json(t.send(Method::GET, "/barbers", Some(&t.barber_token()), None).await).await;
    assert_eq!(usernames(&staff), vec!["luka", "nikola", "petar"]);
    assert!(staff[0].get("passwordHash").is_none());

    let response = t.send(Method::GET, "/barbers", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hidden_barbers_are_not_found_for_clients() {
    let t = test_app().await;
    let vip_only = t.store.barbers.find_by_username("nikola").await.unwrap().unwrap();
    let uri = format!("/barbers/{}", vip_only.id);

    let response = t.send(Method::GET, &uri, Some(&t.client_token(false)), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = t.send(Method::GET, &uri, Some(&t.client_token(true)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["availability"], "VIPs");
}

#[tokio::test]
async fn barber_crud_is_staff_only_and_validated() {
    let t = test_app().await;
    let body = json!({
        "barberUsername": "stefan",
        "barberPassword": "secret",
        "barberName": "Stefan",
        "barberSurname": "Stefanović",
        "workStart": 10,
        "workEnd": 20,
        "availability": "VIPs"
    });

    let response = t
        .send(Method::POST, "/barbers", Some(&t.client_token(false)), Some(body.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let staff = t.barber_token();
    let response = t.send(Method::POST, "/barbers", Some(&staff), Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["workStartHour"], 10);
    assert_eq!(created["bookingWindowDays"], 30);
    let stored = t.store.barbers.find_by_username("stefan").await.unwrap().unwrap();
    assert!(verify_password("secret", &stored.password_hash).is_ok());

    let response = t.send(Method::POST, "/barbers", Some(&staff), Some(body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let uri = format!("/barbers/{}", created["id"]);
    let response = t
        .send(
            Method::PUT,
            &uri,
            Some(&staff),
            Some(json!({
                "name": "Stefan",
                "surname": "Stefanović",
                "workStartHour": 18,
                "workEndHour": 25
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t
        .send(
            Method::PUT,
            &uri,
            Some(&staff),
            Some(json!({
                "name": "Stefan",
                "surname": "Stefanović",
                "workStartHour": 8,
                "workEndHour": 16,
                "availability": "None"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["availability"], "None");

    let response = t.send(Method::DELETE, &uri, Some(&staff), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = t.send(Method::DELETE, &uri, Some(&staff), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn services_are_public_to_read() {
    let t = test_app().await;
    let staff = t.barber_token();
    let response = t
        .send(
            Method::POST,
            "/services",
            Some(&staff),
            Some(json!({"serviceName": "Fade", "serviceDuration": 45, "servicePrice": 1800})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;

    let listed = body_json(t.send(Method::GET, "/services", None, None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["durationMinutes"], 45);

    let uri = format!("/serviceprice/{}", created["id"]);
    let response = t.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let price = body_json(t.send(Method::GET, &uri, Some(&t.client_token(false)), None).await).await;
    assert_eq!(price, json!({"serviceId": created["id"], "price": 1800}));

    let response = t
        .send(
            Method::POST,
            "/services",
            Some(&staff),
            Some(json!({"name": "Nothing", "durationMinutes": 0, "price": 100})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t.send(Method::GET, "/services/999", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_records_are_private() {
    let t = test_app().await;
    let own = format!("/clients/{}", t.client_id);

    let response = t.send(Method::GET, &own, Some(&t.client_token(false)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isVIP"], false);
    assert!(body.get("passwordHash").is_none());

    let response = t
        .send(Method::GET, "/clients/999", Some(&t.client_token(false)), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t.send(Method::GET, "/clients", Some(&t.client_token(false)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let all = body_json(t.send(Method::GET, "/clients", Some(&t.barber_token()), None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn barbers_grant_vip_by_username() {
    let t = test_app().await;
    let response = t
        .send(
            Method::PUT,
            "/clientsByUsername/marko",
            Some(&t.barber_token()),
            Some(json!({
                "clientName": "Marko",
                "clientSurname": "Petrović",
                "clientPhone": "0601234567",
                "isVIP": true
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isVIP"], true);
    assert!(t.store.clients.find_by_id(t.client_id).await.unwrap().unwrap().is_vip);

    let response = t
        .send(
            Method::PUT,
            "/clientsByUsername/nobody",
            Some(&t.barber_token()),
            Some(json!({"name": "N", "surname": "N"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn staff_create_and_delete_clients() {
    let t = test_app().await;
    let staff = t.barber_token();
    let response = t
        .send(
            Method::POST,
            "/clients",
            Some(&staff),
            Some(json!({
                "clientUsername": "ana",
                "clientPassword": "secret",
                "clientName": "Ana",
                "clientSurname": "Anić",
                "clientEmail": ""
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert!(created["email"].is_null());

    let uri = format!("/clients/{}", created["id"]);
    let response = t.send(Method::DELETE, &uri, Some(&staff), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        format!("Deleted client with id: {}", created["id"])
    );
}
