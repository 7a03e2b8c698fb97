//! Repositories, one trait plus one SQL implementation per table.

pub mod appointment;
pub mod appointment_sql;
pub mod barber;
pub mod barber_sql;
pub mod client;
pub mod client_sql;
mod columns;
pub mod service;
pub mod service_sql;

pub use appointment::AppointmentRepository;
pub use appointment_sql::SqlAppointmentRepository;
pub use barber::BarberRepository;
pub use barber_sql::SqlBarberRepository;
pub use client::ClientRepository;
pub use client_sql::SqlClientRepository;
pub use service::ServiceRepository;
pub use service_sql::SqlServiceRepository;
