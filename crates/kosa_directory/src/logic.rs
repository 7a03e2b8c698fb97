//! Rules for the directory that do not touch storage.

use kosa_auth::Principal;
use kosa_common::models::Barber;

use crate::error::DirectoryError;

/// Barbers see everyone; clients see barbers whose availability admits them.
pub fn barber_visible_to(principal: &Principal, barber: &Barber) -> bool {
    principal.is_barber() || barber.availability.admits(principal.is_vip)
}

pub fn visible_barbers(principal: &Principal, barbers: Vec<Barber>) -> Vec<Barber> {
    barbers
        .into_iter()
        .filter(|b| barber_visible_to(principal, b))
        .collect()
}

/// Working hours are whole hours with `start < end <= 24`.
pub fn validate_working_hours(start_hour: u32, end_hour: u32) -> Result<(), DirectoryError> {
    if end_hour > 24 {
        return Err(DirectoryError::Validation(
            "working hours end at 24 at the latest".to_string(),
        ));
    }
    if start_hour >= end_hour {
        return Err(DirectoryError::Validation(
            "working hours must start before they end".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_booking_window(days: i64) -> Result<(), DirectoryError> {
    if days < 0 {
        return Err(DirectoryError::Validation(
            "booking window cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_service(name: &str, duration_minutes: i64, price: i64) -> Result<(), DirectoryError> {
    if name.trim().is_empty() {
        return Err(DirectoryError::Validation("service name is required".to_string()));
    }
    if duration_minutes <= 0 {
        return Err(DirectoryError::Validation(
            "service duration must be positive".to_string(),
        ));
    }
    if price < 0 {
        return Err(DirectoryError::Validation("price cannot be negative".to_string()));
    }
    Ok(())
}

pub fn require_filled(fields: &[(&str, &str)]) -> Result<(), DirectoryError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(DirectoryError::Validation(format!("{name} is required"))),
        None => Ok(()),
    }
}
