// File: crates/kosa_directory/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::handlers::{
    BarberProfileRequest, ClientProfileRequest, CreateBarberRequest, CreateClientRequest,
    ServicePriceResponse, ServiceRequest,
};
use kosa_auth::handlers::MessageResponse;
use kosa_common::models::{AvailabilityMode, Barber, Client, Service};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_barbers_handler,
        crate::handlers::get_barber_handler,
        crate::handlers::create_barber_handler,
        crate::handlers::update_barber_handler,
        crate::handlers::delete_barber_handler,
        crate::handlers::list_services_handler,
        crate::handlers::get_service_handler,
        crate::handlers::service_price_handler,
        crate::handlers::create_service_handler,
        crate::handlers::update_service_handler,
        crate::handlers::delete_service_handler,
        crate::handlers::list_clients_handler,
        crate::handlers::get_client_handler,
        crate::handlers::create_client_handler,
        crate::handlers::update_client_handler,
        crate::handlers::update_client_by_username_handler,
        crate::handlers::delete_client_handler
    ),
    components(
        schemas(
            CreateBarberRequest,
            BarberProfileRequest,
            ServiceRequest,
            ServicePriceResponse,
            CreateClientRequest,
            ClientProfileRequest,
            MessageResponse,
            AvailabilityMode,
            Barber,
            Client,
            Service
        )
    ),
    tags(
        (name = "Directory", description = "Barbers, services and clients")
    ),
    servers(
        (url = "/api", description = "Kosa API server")
    )
)]
pub struct DirectoryApiDoc;
