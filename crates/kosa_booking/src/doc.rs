// File: crates/kosa_booking/src/doc.rs
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::booking::ReconcileReport;
use crate::handlers::{
    BreakRangeRequest, BreakRequest, CancelResponse, CreateAppointmentRequest,
    GuestAppointmentRequest, UpdateAppointmentRequest,
};
use crate::logic::SlotResponse;
use kosa_common::models::{
    Appointment, AppointmentKind, BarberAppointmentDetail, ClientAppointmentDetail, SyncStatus,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::available_slots_handler,
        crate::handlers::list_appointments_handler,
        crate::handlers::get_appointment_handler,
        crate::handlers::create_appointment_handler,
        crate::handlers::create_guest_appointment_handler,
        crate::handlers::create_break_handler,
        crate::handlers::create_break_range_handler,
        crate::handlers::update_appointment_handler,
        crate::handlers::delete_appointment_handler,
        crate::handlers::delete_last_appointment_handler,
        crate::handlers::barber_details_handler,
        crate::handlers::client_details_handler,
        crate::handlers::reconcile_handler
    ),
    components(
        schemas(
            SlotResponse,
            CreateAppointmentRequest,
            GuestAppointmentRequest,
            BreakRequest,
            BreakRangeRequest,
            UpdateAppointmentRequest,
            CancelResponse,
            ReconcileReport,
            Appointment,
            AppointmentKind,
            SyncStatus,
            BarberAppointmentDetail,
            ClientAppointmentDetail
        )
    ),
    tags(
        (name = "Appointments", description = "Slot availability, bookings, breaks and cancellations")
    ),
    servers(
        (url = "/api", description = "Kosa API server")
    )
)]
pub struct BookingApiDoc;
