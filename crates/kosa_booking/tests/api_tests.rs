use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Duration;
use chrono_tz::Europe::Belgrade;
use kosa_auth::{Principal, TokenIssuer};
use kosa_booking::policy::today_in;
use kosa_booking::routes::routes;
use kosa_booking::{BookingService, BookingSettings, BookingState};
use kosa_common::models::{AvailabilityMode, NewBarber, NewClient, NewService};
use kosa_common::services::boxed;
use kosa_config::AuthConfig;
use kosa_db::{BarberRepository, ClientRepository, ServiceRepository, Store};
use kosa_gcal::MockCalendarService;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    calendar: Arc<MockCalendarService>,
    issuer: Arc<TokenIssuer>,
    barber_id: i64,
    vip_barber_id: i64,
    client_id: i64,
    other_client_id: i64,
    service_id: i64,
}

impl TestApp {
    fn barber_token(&self) -> String {
        self.issuer.issue_access(&Principal::barber(self.barber_id)).unwrap()
    }

    fn client_token(&self, id: i64) -> String {
        self.issuer.issue_access(&Principal::client(id, false)).unwrap()
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

async fn barber(store: &Store, username: &str, availability: AvailabilityMode) -> i64 {
    store
        .barbers
        .insert(NewBarber {
            username: username.to_string(),
            password_hash: "x".to_string(),
            name: "Luka".to_string(),
            surname: "Lukić".to_string(),
            phone: "062111222".to_string(),
            work_start_hour: 9,
            work_end_hour: 18,
            booking_window_days: 14,
            availability,
            calendar_id: None,
        })
        .await
        .unwrap()
        .id
}

async fn client(store: &Store, username: &str) -> i64 {
    store
        .clients
        .insert(NewClient {
            username: username.to_string(),
            password_hash: "x".to_string(),
            name: "Marko".to_string(),
            surname: "Petrović".to_string(),
            phone: "0601234567".to_string(),
            email: None,
            is_vip: false,
        })
        .await
        .unwrap()
        .id
}

async fn test_app() -> TestApp {
    let store = Store::connect("sqlite::memory:").await.unwrap();
    let barber_id = barber(&store, "luka", AvailabilityMode::All).await;
    let vip_barber_id = barber(&store, "nikola", AvailabilityMode::VipOnly).await;
    let client_id = client(&store, "marko").await;
    let other_client_id = client(&store, "janko").await;
    let service_id = store
        .services
        .insert(NewService {
            name: "Haircut".to_string(),
            duration_minutes: 30,
            price: 1500,
        })
        .await
        .unwrap()
        .id;

    let calendar = Arc::new(MockCalendarService::new());
    let settings = BookingSettings {
        time_zone: Belgrade,
        slot_interval: Duration::minutes(30),
        break_note: "BREAK".to_string(),
        enforce_no_overlap: true,
        reconcile_grace: Duration::zero(),
        max_break_days: 366,
        default_calendar_id: Some("shop".to_string()),
    };
    let issuer = Arc::new(
        TokenIssuer::new(&AuthConfig {
            access_secret: "test-access".to_string(),
            refresh_secret: "test-refresh".to_string(),
            ..AuthConfig::default()
        })
        .unwrap(),
    );
    let state = BookingState {
        service: BookingService::new(store, Some(boxed(calendar.clone())), settings),
        issuer: issuer.clone(),
    };

    TestApp {
        app: routes(state),
        calendar,
        issuer,
        barber_id,
        vip_barber_id,
        client_id,
        other_client_id,
        service_id,
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn tomorrow() -> String {
    (today_in(&Belgrade) + Duration::days(1)).to_string()
}

fn booking(t: &TestApp, barber_id: i64, date: &str, time: &str) -> Value {
    json!({
        "appointmentDate": date,
        "appointmentTime": time,
        "barberId": barber_id,
        "serviceId": t.service_id,
        "note": ""
    })
}

#[tokio::test]
async fn available_slots_require_sign_in_and_parameters() {
    let t = test_app().await;
    let uri = format!(
        "/available-slots?barberId={}&serviceId={}&date=2024-01-10",
        t.barber_id, t.service_id
    );

    let response = t.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = t.client_token(t.client_id);
    let response = t
        .send(Method::GET, "/available-slots?date=2024-01-10", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let slots = body_json(response).await;
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 18);
    assert_eq!(slots[0]["start"], "2024-01-10T09:00:00+01:00");
    assert_eq!(slots[0]["end"], "2024-01-10T09:30:00+01:00");
}

#[tokio::test]
async fn client_books_for_themselves_once_per_slot() {
    let t = test_app().await;
    let token = t.client_token(t.client_id);
    let date = tomorrow();

    let response = t
        .send(Method::POST, "/appointment", Some(&token), Some(booking(&t, t.barber_id, &date, "10:00:00")))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["clientId"], t.client_id);
    assert_eq!(created["kind"], "booking");
    assert_eq!(created["syncStatus"], "synced");
    assert_eq!(t.calendar.events("shop").len(), 1);

    let other = t.client_token(t.other_client_id);
    let response = t
        .send(Method::POST, "/appointment", Some(&other), Some(booking(&t, t.barber_id, &date, "10:00:00")))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn booking_policy_is_enforced_for_clients() {
    let t = test_app().await;
    let token = t.client_token(t.client_id);

    let response = t
        .send(Method::POST, "/appointment", Some(&token), Some(booking(&t, t.vip_barber_id, &tomorrow(), "10:00:00")))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let far = (today_in(&Belgrade) + Duration::days(60)).to_string();
    let response = t
        .send(Method::POST, "/appointment", Some(&token), Some(booking(&t, t.barber_id, &far, "10:00:00")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut for_someone_else = booking(&t, t.barber_id, &tomorrow(), "10:00:00");
    for_someone_else["clientId"] = json!(t.other_client_id);
    let response = t
        .send(Method::POST, "/appointment", Some(&token), Some(for_someone_else))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn barbers_book_outside_client_rules() {
    let t = test_app().await;
    let token = t.barber_token();
    let far = (today_in(&Belgrade) + Duration::days(60)).to_string();

    let response = t
        .send(Method::POST, "/appointment", Some(&token), Some(booking(&t, t.vip_barber_id, &far, "10:00:00")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "clientId is required for barbers");

    let mut request = booking(&t, t.vip_barber_id, &far, "10:00:00");
    request["clientId"] = json!(t.client_id);
    let response = t.send(Method::POST, "/appointment", Some(&token), Some(request)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn breaks_are_staff_only() {
    let t = test_app().await;
    let body = json!({
        "barberId": t.barber_id,
        "fromDate": "2024-01-10",
        "toDate": "2024-01-11",
        "reason": "Vacation"
    });

    let client = t.client_token(t.client_id);
    let response = t
        .send(Method::POST, "/breaks/range", Some(&client), Some(body.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let barber = t.barber_token();
    let response = t.send(Method::POST, "/breaks/range", Some(&barber), Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let created = created.as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["time"], "09:00:00");
    assert_eq!(created[0]["durationMinutes"], 540);
    assert_eq!(created[0]["reason"], "Vacation");

    let response = t
        .send(
            Method::POST,
            "/breaks",
            Some(&barber),
            Some(json!({
                "barberId": t.barber_id,
                "date": "2024-01-12",
                "startTime": "14:00:00",
                "endTime": "13:00:00"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guest_appointments_block_time() {
    let t = test_app().await;
    let barber = t.barber_token();
    let response = t
        .send(
            Method::POST,
            "/guestAppointment",
            Some(&barber),
            Some(json!({
                "appointmentDate": "2024-01-10",
                "appointmentTime": "09:00:00",
                "appointmentDuration": 60,
                "barberId": t.barber_id,
                "note": "Walk-in Ivan"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(t.calendar.events("shop")[0].summary, "Walk-in Ivan");

    let uri = format!(
        "/available-slots?barberId={}&serviceId={}&date=2024-01-10",
        t.barber_id, t.service_id
    );
    let slots = body_json(t.send(Method::GET, &uri, Some(&barber), None).await).await;
    assert_eq!(slots.as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn owners_and_barbers_may_cancel() {
    let t = test_app().await;
    let owner = t.client_token(t.client_id);
    let created = body_json(
        t.send(Method::POST, "/appointment", Some(&owner), Some(booking(&t, t.barber_id, &tomorrow(), "11:00:00")))
            .await,
    )
    .await;
    let uri = format!("/appointment/{}", created["id"]);

    let stranger = t.client_token(t.other_client_id);
    let response = t.send(Method::DELETE, &uri, Some(&stranger), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t.send(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
    assert!(t.calendar.events("shop").is_empty());

    let response = t.send(Method::GET, &uri, Some(&t.barber_token()), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_calendar_event_fails_cancellation() {
    let t = test_app().await;
    let barber = t.barber_token();
    let mut request = booking(&t, t.barber_id, &tomorrow(), "12:00:00");
    request["clientId"] = json!(t.client_id);
    let created = body_json(t.send(Method::POST, "/appointment", Some(&barber), Some(request)).await).await;
    let event_id = created["calendarEventId"].as_str().unwrap().to_string();
    t.calendar.remove_event("shop", &event_id);

    let uri = format!("/appointment/{}", created["id"]);
    let response = t.send(Method::DELETE, &uri, Some(&barber), None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let response = t.send(Method::GET, &uri, Some(&barber), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn clients_list_only_their_appointments() {
    let t = test_app().await;
    let marko = t.client_token(t.client_id);
    let janko = t.client_token(t.other_client_id);
    t.send(Method::POST, "/appointment", Some(&marko), Some(booking(&t, t.barber_id, &tomorrow(), "09:00:00")))
        .await;
    t.send(Method::POST, "/appointment", Some(&janko), Some(booking(&t, t.barber_id, &tomorrow(), "09:30:00")))
        .await;

    let mine = body_json(t.send(Method::GET, "/appointment", Some(&marko), None).await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let all = body_json(t.send(Method::GET, "/appointment", Some(&t.barber_token()), None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let uri = format!("/appointment-details-client/{}", t.client_id);
    let details = body_json(t.send(Method::GET, &uri, Some(&marko), None).await).await;
    assert_eq!(details[0]["barberName"], "Luka");
    assert_eq!(details[0]["barberPhone"], "062111222");

    let uri = format!("/appointment-details-client/{}", t.other_client_id);
    let response = t.send(Method::GET, &uri, Some(&marko), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reconcile_endpoint_retries_failed_mirrors() {
    let t = test_app().await;
    t.calendar.fail_inserts(true);
    let token = t.client_token(t.client_id);
    let created = body_json(
        t.send(Method::POST, "/appointment", Some(&token), Some(booking(&t, t.barber_id, &tomorrow(), "15:00:00")))
            .await,
    )
    .await;
    assert_eq!(created["syncStatus"], "failed");

    t.calendar.fail_inserts(false);
    let response = t
        .send(Method::POST, "/admin/calendar/reconcile", Some(&t.barber_token()), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"examined": 1, "synced": 1, "failed": 0})
    );
}

#[tokio::test]
async fn undo_last_is_staff_only() {
    let t = test_app().await;
    let token = t.client_token(t.client_id);
    t.send(Method::POST, "/appointment", Some(&token), Some(booking(&t, t.barber_id, &tomorrow(), "16:00:00")))
        .await;

    let response = t.send(Method::DELETE, "/delete-last-appointment", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = t
        .send(Method::DELETE, "/delete-last-appointment", Some(&t.barber_token()), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(t.calendar.events("shop").is_empty());
}
