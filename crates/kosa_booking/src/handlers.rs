// File: crates/kosa_booking/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveTime};
use kosa_auth::{AuthUser, BarberUser, TokenIssuer};
use kosa_common::models::{
    Appointment, AppointmentUpdate, BarberAppointmentDetail, ClientAppointmentDetail,
};
use kosa_common::KosaError;
use kosa_db::BarberRepository;
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use crate::booking::{BookingService, NewBooking, ReconcileReport};
use crate::error::BookingError;
use crate::logic::SlotResponse;
use crate::policy::{check_client_booking, require_owner_or_barber, today_in};

/// Shared state for the appointment endpoints.
#[derive(Clone, FromRef)]
pub struct BookingState {
    pub service: BookingService,
    pub issuer: Arc<TokenIssuer>,
}

#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsQuery {
    pub barber_id: Option<i64>,
    pub service_id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: Option<NaiveDate>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    #[serde(alias = "appointmentDate")]
    pub date: NaiveDate,
    #[serde(alias = "appointmentTime")]
    pub time: NaiveTime,
    pub barber_id: i64,
    /// Defaults to the signed-in client.
    #[serde(default)]
    pub client_id: Option<i64>,
    pub service_id: i64,
    #[serde(default)]
    pub note: String,
}

/// Walk-in booked by staff: blocks time under the guest's name.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestAppointmentRequest {
    #[serde(alias = "appointmentDate")]
    pub date: NaiveDate,
    #[serde(alias = "appointmentTime")]
    pub time: NaiveTime,
    #[serde(alias = "appointmentDuration")]
    pub duration_minutes: i64,
    pub barber_id: i64,
    #[serde(default)]
    pub note: String,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakRequest {
    pub barber_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakRangeRequest {
    pub barber_id: i64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    #[serde(alias = "appointmentDate")]
    pub date: NaiveDate,
    #[serde(alias = "appointmentTime")]
    pub time: NaiveTime,
    #[serde(default)]
    pub note: String,
    #[serde(alias = "appointmentDuration")]
    pub duration_minutes: i64,
    pub barber_id: i64,
    #[serde(default)]
    pub client_id: Option<i64>,
}

impl From<UpdateAppointmentRequest> for AppointmentUpdate {
    fn from(req: UpdateAppointmentRequest) -> Self {
        AppointmentUpdate {
            date: req.date,
            time: req.time,
            note: req.note,
            duration_minutes: req.duration_minutes,
            barber_id: req.barber_id,
            client_id: req.client_id,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
}

/// Handler to get available time slots for one barber, service and day.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/available-slots",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Bookable slots in ascending order", body = [SlotResponse]),
        (status = 400, description = "Missing or malformed query parameters"),
        (status = 404, description = "Unknown barber or service")
    ),
    tag = "Appointments"
))]
pub async fn available_slots_handler(
    State(state): State<BookingState>,
    AuthUser(_principal): AuthUser,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<SlotResponse>>, KosaError> {
    let (Some(barber_id), Some(service_id), Some(date)) =
        (query.barber_id, query.service_id, query.date)
    else {
        return Err(KosaError::ValidationError(
            "barberId, serviceId, and date are required".to_string(),
        ));
    };

    let slots = state
        .service
        .available_slots(barber_id, service_id, date)
        .await?;
    Ok(Json(slots.into_iter().map(SlotResponse::from).collect()))
}

/// Barbers see every appointment; clients see their own.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointment",
    responses(
        (status = 200, description = "Appointments", body = [Appointment]),
        (status = 401, description = "Not signed in")
    ),
    tag = "Appointments"
))]
pub async fn list_appointments_handler(
    State(state): State<BookingState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<Appointment>>, KosaError> {
    let mut appointments = state.service.list_appointments().await?;
    if !principal.is_barber() {
        appointments.retain(|a| a.kind.client_id() == Some(principal.id));
    }
    Ok(Json(appointments))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "Appointments"
))]
pub async fn get_appointment_handler(
    State(state): State<BookingState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, KosaError> {
    let appointment = state.service.get_appointment(id).await?;
    require_owner_or_barber(&principal, appointment.kind.client_id())?;
    Ok(Json(appointment))
}

/// Book a service. Clients book for themselves within the barber's window.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointment",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment stored; check syncStatus for the calendar mirror", body = Appointment),
        (status = 400, description = "Date outside the booking window"),
        (status = 403, description = "Barber not bookable by this client"),
        (status = 404, description = "Unknown barber, client or service"),
        (status = 409, description = "Slot already booked")
    ),
    tag = "Appointments"
))]
pub async fn create_appointment_handler(
    State(state): State<BookingState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), KosaError> {
    let client_id = match payload.client_id {
        Some(id) => id,
        None if !principal.is_barber() => principal.id,
        None => {
            return Err(KosaError::ValidationError(
                "clientId is required".to_string(),
            ))
        }
    };

    let barber = state
        .service
        .store()
        .barbers
        .find_by_id(payload.barber_id)
        .await
        .map_err(BookingError::from)?
        .ok_or_else(|| BookingError::not_found(format!("Barber {}", payload.barber_id)))?;
    let today = today_in(&state.service.settings().time_zone);
    check_client_booking(&principal, &barber, client_id, payload.date, today)?;

    let appointment = state
        .service
        .book(NewBooking::Client {
            barber_id: payload.barber_id,
            client_id,
            service_id: payload.service_id,
            date: payload.date,
            time: payload.time,
            note: payload.note,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/guestAppointment",
    request_body = GuestAppointmentRequest,
    responses(
        (status = 201, description = "Guest appointment stored", body = Appointment),
        (status = 403, description = "Barbers only")
    ),
    tag = "Appointments"
))]
pub async fn create_guest_appointment_handler(
    State(state): State<BookingState>,
    BarberUser(_barber): BarberUser,
    Json(payload): Json<GuestAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), KosaError> {
    let appointment = state
        .service
        .book(NewBooking::Break {
            barber_id: payload.barber_id,
            date: payload.date,
            time: payload.time,
            duration_minutes: payload.duration_minutes,
            reason: payload.note,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/breaks",
    request_body = BreakRequest,
    responses(
        (status = 201, description = "Break stored", body = Appointment),
        (status = 400, description = "Break ends before it starts")
    ),
    tag = "Appointments"
))]
pub async fn create_break_handler(
    State(state): State<BookingState>,
    BarberUser(_barber): BarberUser,
    Json(payload): Json<BreakRequest>,
) -> Result<(StatusCode, Json<Appointment>), KosaError> {
    let appointment = state
        .service
        .book_break(
            payload.barber_id,
            payload.date,
            payload.start_time,
            payload.end_time,
            payload.reason,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/breaks/range",
    request_body = BreakRangeRequest,
    responses(
        (status = 201, description = "One break per day", body = [Appointment]),
        (status = 400, description = "Inverted or oversized range")
    ),
    tag = "Appointments"
))]
pub async fn create_break_range_handler(
    State(state): State<BookingState>,
    BarberUser(_barber): BarberUser,
    Json(payload): Json<BreakRangeRequest>,
) -> Result<(StatusCode, Json<Vec<Appointment>>), KosaError> {
    let created = state
        .service
        .book_break_range(
            payload.barber_id,
            payload.from_date,
            payload.to_date,
            payload.reason,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/appointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "New slot overlaps another appointment")
    ),
    tag = "Appointments"
))]
pub async fn update_appointment_handler(
    State(state): State<BookingState>,
    BarberUser(_barber): BarberUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, KosaError> {
    let appointment = state.service.reschedule(id, payload.into()).await?;
    Ok(Json(appointment))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/appointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Cancelled", body = CancelResponse),
        (status = 404, description = "Appointment not found"),
        (status = 502, description = "Calendar event could not be identified or removed")
    ),
    tag = "Appointments"
))]
pub async fn delete_appointment_handler(
    State(state): State<BookingState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CancelResponse>, KosaError> {
    let appointment = state.service.get_appointment(id).await?;
    require_owner_or_barber(&principal, appointment.kind.client_id())?;

    state.service.cancel(id).await?;
    Ok(Json(CancelResponse {
        success: true,
        message: format!("Deleted appointment with id: {id}"),
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/delete-last-appointment",
    responses(
        (status = 200, description = "Latest appointment removed", body = CancelResponse),
        (status = 404, description = "No appointments")
    ),
    tag = "Appointments"
))]
pub async fn delete_last_appointment_handler(
    State(state): State<BookingState>,
    BarberUser(barber): BarberUser,
) -> Result<Json<CancelResponse>, KosaError> {
    let removed = state.service.undo_last().await?;
    info!("Barber {} undid appointment {}", barber.id, removed.id);
    Ok(Json(CancelResponse {
        success: true,
        message: "Deleted last appointment".to_string(),
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointment-details/{barberId}",
    params(("barberId" = i64, Path, description = "Barber id")),
    responses(
        (status = 200, description = "Appointments joined with client and service", body = [BarberAppointmentDetail])
    ),
    tag = "Appointments"
))]
pub async fn barber_details_handler(
    State(state): State<BookingState>,
    BarberUser(_barber): BarberUser,
    Path(barber_id): Path<i64>,
) -> Result<Json<Vec<BarberAppointmentDetail>>, KosaError> {
    Ok(Json(state.service.details_for_barber(barber_id).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/appointment-details-client/{clientId}",
    params(("clientId" = i64, Path, description = "Client id")),
    responses(
        (status = 200, description = "Appointments joined with barber and service", body = [ClientAppointmentDetail]),
        (status = 403, description = "Not the owner")
    ),
    tag = "Appointments"
))]
pub async fn client_details_handler(
    State(state): State<BookingState>,
    AuthUser(principal): AuthUser,
    Path(client_id): Path<i64>,
) -> Result<Json<Vec<ClientAppointmentDetail>>, KosaError> {
    require_owner_or_barber(&principal, Some(client_id))?;
    Ok(Json(state.service.details_for_client(client_id).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/calendar/reconcile",
    responses(
        (status = 200, description = "Mirror retry counts", body = ReconcileReport)
    ),
    tag = "Appointments"
))]
pub async fn reconcile_handler(
    State(state): State<BookingState>,
    BarberUser(_barber): BarberUser,
) -> Result<Json<ReconcileReport>, KosaError> {
    Ok(Json(state.service.reconcile().await?))
}
