// --- File: crates/kosa_directory/src/routes.rs ---

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::{
    create_barber_handler, create_client_handler, create_service_handler, delete_barber_handler,
    delete_client_handler, delete_service_handler, get_barber_handler, get_client_handler,
    get_service_handler, list_barbers_handler, list_clients_handler, list_services_handler,
    service_price_handler, update_barber_handler, update_client_by_username_handler,
    update_client_handler, update_service_handler, DirectoryState,
};

/// Barber, service and client routes, mounted under `/api`.
pub fn routes(state: DirectoryState) -> Router {
    Router::new()
        .route(
            "/barbers",
            get(list_barbers_handler).post(create_barber_handler),
        )
        .route(
            "/barbers/{id}",
            get(get_barber_handler)
                .put(update_barber_handler)
                .delete(delete_barber_handler),
        )
        .route(
            "/services",
            get(list_services_handler).post(create_service_handler),
        )
        .route(
            "/services/{id}",
            get(get_service_handler)
                .put(update_service_handler)
                .delete(delete_service_handler),
        )
        .route("/serviceprice/{id}", get(service_price_handler))
        .route(
            "/clients",
            get(list_clients_handler).post(create_client_handler),
        )
        .route(
            "/clients/{id}",
            get(get_client_handler)
                .put(update_client_handler)
                .delete(delete_client_handler),
        )
        .route(
            "/clientsByUsername/{username}",
            put(update_client_by_username_handler),
        )
        .with_state(state)
}
