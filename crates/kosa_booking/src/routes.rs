// --- File: crates/kosa_booking/src/routes.rs ---

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{
    available_slots_handler, barber_details_handler, client_details_handler,
    create_appointment_handler, create_break_handler, create_break_range_handler,
    create_guest_appointment_handler, delete_appointment_handler,
    delete_last_appointment_handler, get_appointment_handler, list_appointments_handler,
    reconcile_handler, update_appointment_handler, BookingState,
};

/// Appointment routes, mounted under `/api`.
pub fn routes(state: BookingState) -> Router {
    Router::new()
        .route("/available-slots", get(available_slots_handler))
        .route(
            "/appointment",
            get(list_appointments_handler).post(create_appointment_handler),
        )
        .route(
            "/appointment/{id}",
            get(get_appointment_handler)
                .put(update_appointment_handler)
                .delete(delete_appointment_handler),
        )
        .route("/guestAppointment", post(create_guest_appointment_handler))
        .route("/breaks", post(create_break_handler))
        .route("/breaks/range", post(create_break_range_handler))
        .route(
            "/delete-last-appointment",
            delete(delete_last_appointment_handler),
        )
        .route("/appointment-details/{barberId}", get(barber_details_handler))
        .route(
            "/appointment-details-client/{clientId}",
            get(client_details_handler),
        )
        .route("/admin/calendar/reconcile", post(reconcile_handler))
        .with_state(state)
}
