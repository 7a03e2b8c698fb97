// File: crates/kosa_directory/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Json,
};
use kosa_auth::handlers::MessageResponse;
use kosa_auth::{hash_password, AuthUser, BarberUser, TokenIssuer};
use kosa_common::models::{
    AvailabilityMode, Barber, BarberUpdate, Client, ClientUpdate, NewBarber, NewClient,
    NewService, Service,
};
use kosa_common::KosaError;
use kosa_db::{BarberRepository, ClientRepository, ServiceRepository, Store};
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::DirectoryError;
use crate::logic::{
    barber_visible_to, require_filled, validate_booking_window, validate_service,
    validate_working_hours, visible_barbers,
};

/// Shared state for the directory endpoints.
#[derive(Clone, FromRef)]
pub struct DirectoryState {
    pub store: Store,
    pub issuer: Arc<TokenIssuer>,
}

fn default_window() -> i64 {
    30
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBarberRequest {
    #[serde(alias = "barberUsername")]
    pub username: String,
    #[serde(alias = "barberPassword")]
    pub password: String,
    #[serde(alias = "barberName")]
    pub name: String,
    #[serde(alias = "barberSurname")]
    pub surname: String,
    #[serde(default, alias = "barberPhone")]
    pub phone: String,
    #[serde(alias = "workStart")]
    pub work_start_hour: u32,
    #[serde(alias = "workEnd")]
    pub work_end_hour: u32,
    #[serde(default = "default_window")]
    pub booking_window_days: i64,
    #[serde(default)]
    pub availability: AvailabilityMode,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberProfileRequest {
    #[serde(alias = "barberName")]
    pub name: String,
    #[serde(alias = "barberSurname")]
    pub surname: String,
    #[serde(default, alias = "barberPhone")]
    pub phone: String,
    #[serde(alias = "workStart")]
    pub work_start_hour: u32,
    #[serde(alias = "workEnd")]
    pub work_end_hour: u32,
    #[serde(default = "default_window")]
    pub booking_window_days: i64,
    #[serde(default)]
    pub availability: AvailabilityMode,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

impl From<BarberProfileRequest> for BarberUpdate {
    fn from(req: BarberProfileRequest) -> Self {
        BarberUpdate {
            name: req.name,
            surname: req.surname,
            phone: req.phone,
            work_start_hour: req.work_start_hour,
            work_end_hour: req.work_end_hour,
            booking_window_days: req.booking_window_days,
            availability: req.availability,
            calendar_id: req.calendar_id.filter(|id| !id.trim().is_empty()),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(alias = "serviceName")]
    pub name: String,
    #[serde(alias = "serviceDuration")]
    pub duration_minutes: i64,
    #[serde(alias = "servicePrice")]
    pub price: i64,
}

impl ServiceRequest {
    fn into_new_service(self) -> Result<NewService, DirectoryError> {
        validate_service(&self.name, self.duration_minutes, self.price)?;
        Ok(NewService {
            name: self.name.trim().to_string(),
            duration_minutes: self.duration_minutes,
            price: self.price,
        })
    }
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePriceResponse {
    pub service_id: i64,
    pub price: i64,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[serde(alias = "clientUsername")]
    pub username: String,
    #[serde(alias = "clientPassword")]
    pub password: String,
    #[serde(alias = "clientName")]
    pub name: String,
    #[serde(alias = "clientSurname")]
    pub surname: String,
    #[serde(default, alias = "clientPhone")]
    pub phone: String,
    #[serde(default, alias = "clientEmail")]
    pub email: Option<String>,
    #[serde(default, rename = "isVIP")]
    pub is_vip: bool,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileRequest {
    #[serde(alias = "clientName")]
    pub name: String,
    #[serde(alias = "clientSurname")]
    pub surname: String,
    #[serde(default, alias = "clientPhone")]
    pub phone: String,
    #[serde(default, alias = "clientEmail")]
    pub email: Option<String>,
    #[serde(default, rename = "isVIP")]
    pub is_vip: bool,
}

impl From<ClientProfileRequest> for ClientUpdate {
    fn from(req: ClientProfileRequest) -> Self {
        ClientUpdate {
            name: req.name,
            surname: req.surname,
            phone: req.phone,
            email: req.email.filter(|e| !e.trim().is_empty()),
            is_vip: req.is_vip,
        }
    }
}

fn deleted(what: &str, id: i64) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Deleted {what} with id: {id}"),
    })
}

// --- Barbers ---

/// Barbers visible to the caller.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/barbers",
    responses(
        (status = 200, description = "Barbers the caller may book", body = [Barber]),
        (status = 401, description = "Not signed in")
    ),
    tag = "Directory"
))]
pub async fn list_barbers_handler(
    State(state): State<DirectoryState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<Barber>>, KosaError> {
    let barbers = state
        .store
        .barbers
        .find_all()
        .await
        .map_err(DirectoryError::from)?;
    Ok(Json(visible_barbers(&principal, barbers)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/barbers/{id}",
    params(("id" = i64, Path, description = "Barber id")),
    responses(
        (status = 200, description = "Barber", body = Barber),
        (status = 404, description = "Unknown or hidden barber")
    ),
    tag = "Directory"
))]
pub async fn get_barber_handler(
    State(state): State<DirectoryState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Barber>, KosaError> {
    let barber = state
        .store
        .barbers
        .find_by_id(id)
        .await
        .map_err(DirectoryError::from)?
        .filter(|b| barber_visible_to(&principal, b))
        .ok_or_else(|| DirectoryError::NotFound(format!("Barber {id}")))?;
    Ok(Json(barber))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/barbers",
    request_body = CreateBarberRequest,
    responses(
        (status = 201, description = "Barber created", body = Barber),
        (status = 400, description = "Invalid working hours"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Directory"
))]
pub async fn create_barber_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Json(payload): Json<CreateBarberRequest>,
) -> Result<(StatusCode, Json<Barber>), KosaError> {
    require_filled(&[
        ("username", payload.username.as_str()),
        ("password", payload.password.as_str()),
        ("name", payload.name.as_str()),
    ])?;
    validate_working_hours(payload.work_start_hour, payload.work_end_hour)?;
    validate_booking_window(payload.booking_window_days)?;

    let barber = state
        .store
        .barbers
        .insert(NewBarber {
            username: payload.username,
            password_hash: hash_password(&payload.password).map_err(DirectoryError::from)?,
            name: payload.name,
            surname: payload.surname,
            phone: payload.phone,
            work_start_hour: payload.work_start_hour,
            work_end_hour: payload.work_end_hour,
            booking_window_days: payload.booking_window_days,
            availability: payload.availability,
            calendar_id: payload.calendar_id.filter(|id| !id.trim().is_empty()),
        })
        .await
        .map_err(DirectoryError::from)?;
    info!("Created barber {} ({})", barber.id, barber.username);
    Ok((StatusCode::CREATED, Json(barber)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/barbers/{id}",
    params(("id" = i64, Path, description = "Barber id")),
    request_body = BarberProfileRequest,
    responses(
        (status = 200, description = "Updated barber", body = Barber),
        (status = 400, description = "Invalid working hours"),
        (status = 404, description = "Barber not found")
    ),
    tag = "Directory"
))]
pub async fn update_barber_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(id): Path<i64>,
    Json(payload): Json<BarberProfileRequest>,
) -> Result<Json<Barber>, KosaError> {
    validate_working_hours(payload.work_start_hour, payload.work_end_hour)?;
    validate_booking_window(payload.booking_window_days)?;

    let barber = state
        .store
        .barbers
        .update(id, payload.into())
        .await
        .map_err(DirectoryError::from)?
        .ok_or_else(|| DirectoryError::NotFound(format!("Barber {id}")))?;
    info!("Updated barber {}", id);
    Ok(Json(barber))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/barbers/{id}",
    params(("id" = i64, Path, description = "Barber id")),
    responses(
        (status = 200, description = "Barber deleted", body = MessageResponse),
        (status = 404, description = "Barber not found")
    ),
    tag = "Directory"
))]
pub async fn delete_barber_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, KosaError> {
    if !state
        .store
        .barbers
        .delete(id)
        .await
        .map_err(DirectoryError::from)?
    {
        return Err(DirectoryError::NotFound(format!("Barber {id}")).into());
    }
    info!("Deleted barber {}", id);
    Ok(deleted("barber", id))
}

// --- Services ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/services",
    responses(
        (status = 200, description = "Service catalog", body = [Service])
    ),
    tag = "Directory"
))]
pub async fn list_services_handler(
    State(state): State<DirectoryState>,
) -> Result<Json<Vec<Service>>, KosaError> {
    let services = state
        .store
        .services
        .find_all()
        .await
        .map_err(DirectoryError::from)?;
    Ok(Json(services))
}

async fn find_service(state: &DirectoryState, id: i64) -> Result<Service, DirectoryError> {
    state
        .store
        .services
        .find_by_id(id)
        .await?
        .ok_or_else(|| DirectoryError::NotFound(format!("Service {id}")))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service", body = Service),
        (status = 404, description = "Service not found")
    ),
    tag = "Directory"
))]
pub async fn get_service_handler(
    State(state): State<DirectoryState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, KosaError> {
    Ok(Json(find_service(&state, id).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/serviceprice/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Price of the service", body = ServicePriceResponse),
        (status = 404, description = "Service not found")
    ),
    tag = "Directory"
))]
pub async fn service_price_handler(
    State(state): State<DirectoryState>,
    AuthUser(_principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ServicePriceResponse>, KosaError> {
    let service = find_service(&state, id).await?;
    Ok(Json(ServicePriceResponse {
        service_id: service.id,
        price: service.price,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/services",
    request_body = ServiceRequest,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Invalid duration or price")
    ),
    tag = "Directory"
))]
pub async fn create_service_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Json(payload): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<Service>), KosaError> {
    let service = state
        .store
        .services
        .insert(payload.into_new_service()?)
        .await
        .map_err(DirectoryError::from)?;
    info!("Created service {} ({})", service.id, service.name);
    Ok((StatusCode::CREATED, Json(service)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    request_body = ServiceRequest,
    responses(
        (status = 200, description = "Updated service", body = Service),
        (status = 404, description = "Service not found")
    ),
    tag = "Directory"
))]
pub async fn update_service_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(id): Path<i64>,
    Json(payload): Json<ServiceRequest>,
) -> Result<Json<Service>, KosaError> {
    let service = state
        .store
        .services
        .update(id, payload.into_new_service()?)
        .await
        .map_err(DirectoryError::from)?
        .ok_or_else(|| DirectoryError::NotFound(format!("Service {id}")))?;
    Ok(Json(service))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service deleted", body = MessageResponse),
        (status = 404, description = "Service not found")
    ),
    tag = "Directory"
))]
pub async fn delete_service_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, KosaError> {
    if !state
        .store
        .services
        .delete(id)
        .await
        .map_err(DirectoryError::from)?
    {
        return Err(DirectoryError::NotFound(format!("Service {id}")).into());
    }
    info!("Deleted service {}", id);
    Ok(deleted("service", id))
}

// --- Clients ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/clients",
    responses(
        (status = 200, description = "All clients", body = [Client]),
        (status = 403, description = "Barbers only")
    ),
    tag = "Directory"
))]
pub async fn list_clients_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
) -> Result<Json<Vec<Client>>, KosaError> {
    let clients = state
        .store
        .clients
        .find_all()
        .await
        .map_err(DirectoryError::from)?;
    Ok(Json(clients))
}

/// A client may read their own record; barbers may read any.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/clients/{id}",
    params(("id" = i64, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 403, description = "Another client's record"),
        (status = 404, description = "Client not found")
    ),
    tag = "Directory"
))]
pub async fn get_client_handler(
    State(state): State<DirectoryState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Client>, KosaError> {
    if !principal.is_barber() && principal.id != id {
        return Err(DirectoryError::Forbidden("Not allowed to read this client".to_string()).into());
    }
    let client = state
        .store
        .clients
        .find_by_id(id)
        .await
        .map_err(DirectoryError::from)?
        .ok_or_else(|| DirectoryError::NotFound(format!("Client {id}")))?;
    Ok(Json(client))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 409, description = "Username already taken")
    ),
    tag = "Directory"
))]
pub async fn create_client_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), KosaError> {
    require_filled(&[
        ("username", payload.username.as_str()),
        ("password", payload.password.as_str()),
    ])?;

    let client = state
        .store
        .clients
        .insert(NewClient {
            username: payload.username,
            password_hash: hash_password(&payload.password).map_err(DirectoryError::from)?,
            name: payload.name,
            surname: payload.surname,
            phone: payload.phone,
            email: payload.email.filter(|e| !e.trim().is_empty()),
            is_vip: payload.is_vip,
        })
        .await
        .map_err(DirectoryError::from)?;
    info!("Created client {} ({})", client.id, client.username);
    Ok((StatusCode::CREATED, Json(client)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/clients/{id}",
    params(("id" = i64, Path, description = "Client id")),
    request_body = ClientProfileRequest,
    responses(
        (status = 200, description = "Updated client", body = Client),
        (status = 404, description = "Client not found")
    ),
    tag = "Directory"
))]
pub async fn update_client_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(id): Path<i64>,
    Json(payload): Json<ClientProfileRequest>,
) -> Result<Json<Client>, KosaError> {
    let client = state
        .store
        .clients
        .update(id, payload.into())
        .await
        .map_err(DirectoryError::from)?
        .ok_or_else(|| DirectoryError::NotFound(format!("Client {id}")))?;
    info!("Updated client {}", id);
    Ok(Json(client))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/clientsByUsername/{username}",
    params(("username" = String, Path, description = "Client username")),
    request_body = ClientProfileRequest,
    responses(
        (status = 200, description = "Updated client", body = Client),
        (status = 404, description = "Client not found")
    ),
    tag = "Directory"
))]
pub async fn update_client_by_username_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(username): Path<String>,
    Json(payload): Json<ClientProfileRequest>,
) -> Result<Json<Client>, KosaError> {
    let client = state
        .store
        .clients
        .update_by_username(&username, payload.into())
        .await
        .map_err(DirectoryError::from)?
        .ok_or_else(|| DirectoryError::NotFound(format!("Client {username}")))?;
    info!("Updated client {} ({})", client.id, username);
    Ok(Json(client))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/clients/{id}",
    params(("id" = i64, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client deleted", body = MessageResponse),
        (status = 404, description = "Client not found")
    ),
    tag = "Directory"
))]
pub async fn delete_client_handler(
    State(state): State<DirectoryState>,
    BarberUser(_staff): BarberUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, KosaError> {
    if !state
        .store
        .clients
        .delete(id)
        .await
        .map_err(DirectoryError::from)?
    {
        return Err(DirectoryError::NotFound(format!("Client {id}")).into());
    }
    info!("Deleted client {}", id);
    Ok(deleted("client", id))
}
