use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use kosa_auth::{hash_password, routes::routes, AuthState, AuthUser, BarberUser, TokenIssuer};
use kosa_common::models::{AvailabilityMode, NewBarber};
use kosa_config::{AppConfig, AuthConfig};
use kosa_db::{BarberRepository, ClientRepository, Store};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_state() -> AuthState {
    let config = AppConfig {
        auth: AuthConfig {
            access_secret: "test-access".to_string(),
            refresh_secret: "test-refresh".to_string(),
            cookie_secure: false,
            ..AuthConfig::default()
        },
        ..AppConfig::default()
    };
    let issuer = TokenIssuer::new(&config.auth).unwrap();
    AuthState {
        store: Store::connect("sqlite::memory:").await.unwrap(),
        issuer: Arc::new(issuer),
        config: Arc::new(config),
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn refresh_cookie_pair(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn register_client(app: &Router, username: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/register",
            json!({
                "clientUsername": username,
                "clientPassword": "secret",
                "clientName": "Marko",
                "clientSurname": "Petrović",
                "clientPhone": "0601234567"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn register_then_login_sets_refresh_cookie() {
    let state = test_state().await;
    let app = routes(state.clone());

    let client = register_client(&app, "marko").await;
    assert_eq!(client["username"], "marko");
    assert_eq!(client["isVIP"], false);
    assert!(client.get("passwordHash").is_none());

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"clientUsername": "marko", "clientPassword": "secret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = refresh_cookie_pair(&response);
    assert!(cookie.starts_with("refreshToken="));

    let body = body_json(response).await;
    assert_eq!(body["auth"], true);
    let principal = state
        .issuer
        .verify_access(body["accessToken"].as_str().unwrap())
        .unwrap();
    assert!(!principal.is_barber());
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = routes(test_state().await);
    register_client(&app, "ana").await;

    let response = app
        .oneshot(post_json(
            "/register",
            json!({
                "username": "ana",
                "password": "other",
                "name": "Ana",
                "surname": "Anić",
                "phone": "061"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = routes(test_state().await);
    register_client(&app, "ivan").await;

    let response = app
        .oneshot(post_json(
            "/login",
            json!({"clientUsername": "ivan", "clientPassword": "nope"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rereads_vip_flag() {
    let state = test_state().await;
    let app = routes(state.clone());
    register_client(&app, "vip").await;

    let login = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"clientUsername": "vip", "clientPassword": "secret"}),
        ))
        .await
        .unwrap();
    let cookie = refresh_cookie_pair(&login);

    let client = state.store.clients.find_by_username("vip").await.unwrap().unwrap();
    state
        .store
        .clients
        .update(
            client.id,
            kosa_common::models::ClientUpdate {
                name: client.name.clone(),
                surname: client.surname.clone(),
                phone: client.phone.clone(),
                email: None,
                is_vip: true,
            },
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::post("/refresh")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let principal = state
        .issuer
        .verify_access(body["accessToken"].as_str().unwrap())
        .unwrap();
    assert!(principal.is_vip);
}

#[tokio::test]
async fn refresh_without_cookie_or_account_fails() {
    let state = test_state().await;
    let app = routes(state.clone());

    let response = app
        .clone()
        .oneshot(Request::post("/refresh").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let client = register_client(&app, "gone").await;
    let login = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"clientUsername": "gone", "clientPassword": "secret"}),
        ))
        .await
        .unwrap();
    let cookie = refresh_cookie_pair(&login);
    state
        .store
        .clients
        .delete(client["id"].as_i64().unwrap())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::post("/refresh")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = routes(test_state().await);
    let response = app
        .oneshot(Request::post("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(refresh_cookie_pair(&response), "refreshToken=");
    assert_eq!(
        body_json(response).await["message"],
        "Logged out successfully."
    );
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = routes(test_state().await);
    register_client(&app, "mila").await;

    let put = |body: Value| {
        Request::put("/change-password")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(put(json!({
            "clientUsername": "mila",
            "clientPassword": "wrong",
            "clientNewPassword": "fresh"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(put(json!({
            "clientUsername": "mila",
            "clientPassword": "secret",
            "clientNewPassword": "fresh"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            "/login",
            json!({"clientUsername": "mila", "clientPassword": "fresh"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn whoami(AuthUser(principal): AuthUser) -> String {
    principal.id.to_string()
}

async fn barbers_only(BarberUser(principal): BarberUser) -> String {
    principal.id.to_string()
}

#[tokio::test]
async fn extractors_enforce_roles() {
    let state = test_state().await;
    let barber = state
        .store
        .barbers
        .insert(NewBarber {
            username: "luka".to_string(),
            password_hash: hash_password("clippers").unwrap(),
            name: "Luka".to_string(),
            surname: "Lukić".to_string(),
            phone: "062".to_string(),
            work_start_hour: 9,
            work_end_hour: 17,
            booking_window_days: 14,
            availability: AvailabilityMode::All,
            calendar_id: None,
        })
        .await
        .unwrap();

    let protected = Router::new()
        .route("/me", get(whoami))
        .route("/staff", get(barbers_only))
        .with_state(state.clone());
    let app = routes(state.clone()).merge(protected);

    let login = app
        .clone()
        .oneshot(post_json(
            "/barberlogin",
            json!({"barberUsername": "luka", "barberPassword": "clippers"}),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let barber_token = body_json(login).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    register_client(&app, "klijent").await;
    let login = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"clientUsername": "klijent", "clientPassword": "secret"}),
        ))
        .await
        .unwrap();
    let client_token = body_json(login).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let call = |uri: &str, token: Option<&str>| {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(call("/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(call("/staff", Some(&client_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(call("/staff", Some(&barber_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes, barber.id.to_string().as_bytes());

    let response = app
        .oneshot(call("/me", Some("garbage")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
