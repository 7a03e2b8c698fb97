//! Who may book what, and when.
//!
//! Barbers manage their own calendar freely. Clients are limited by the
//! barber's availability mode and advance-booking window, and may only book
//! for themselves.

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use kosa_auth::Principal;
use kosa_common::models::{AvailabilityMode, Barber};

use crate::error::BookingError;

/// Today's date on the shop's wall clock.
pub fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

pub fn check_client_booking(
    principal: &Principal,
    barber: &Barber,
    client_id: i64,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), BookingError> {
    if principal.is_barber() {
        return Ok(());
    }
    if principal.id != client_id {
        return Err(BookingError::Forbidden(
            "Clients may only book for themselves".to_string(),
        ));
    }
    match barber.availability {
        AvailabilityMode::None => {
            return Err(BookingError::Forbidden(format!(
                "{} {} is not taking bookings",
                barber.name, barber.surname
            )))
        }
        AvailabilityMode::VipOnly if !principal.is_vip => {
            return Err(BookingError::Forbidden(format!(
                "{} {} only takes VIP bookings",
                barber.name, barber.surname
            )))
        }
        _ => {}
    }

    let last_day = today + Duration::days(barber.booking_window_days.max(0));
    if date < today || date > last_day {
        return Err(BookingError::Validation(format!(
            "date must be between {today} and {last_day}"
        )));
    }
    Ok(())
}

/// Only barbers may block time or act on another client's appointments.
pub fn require_owner_or_barber(principal: &Principal, client_id: Option<i64>) -> Result<(), BookingError> {
    if principal.is_barber() || client_id == Some(principal.id) {
        return Ok(());
    }
    Err(BookingError::Forbidden(
        "Not allowed to access this appointment".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barber(availability: AvailabilityMode) -> Barber {
        Barber {
            id: 1,
            username: "luka".to_string(),
            password_hash: String::new(),
            name: "Luka".to_string(),
            surname: "Lukić".to_string(),
            phone: "062".to_string(),
            work_start_hour: 9,
            work_end_hour: 17,
            booking_window_days: 14,
            availability,
            calendar_id: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn client_inside_window_is_allowed() {
        let client = Principal::client(5, false);
        let result =
            check_client_booking(&client, &barber(AvailabilityMode::All), 5, day(24), day(10));
        assert!(result.is_ok());
    }

    #[test]
    fn window_bounds_are_enforced() {
        let client = Principal::client(5, false);
        let b = barber(AvailabilityMode::All);
        assert!(matches!(
            check_client_booking(&client, &b, 5, day(9), day(10)),
            Err(BookingError::Validation(_))
        ));
        assert!(matches!(
            check_client_booking(&client, &b, 5, day(25), day(10)),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn availability_modes_gate_clients() {
        let regular = Principal::client(5, false);
        let vip = Principal::client(5, true);
        let vip_only = barber(AvailabilityMode::VipOnly);
        let closed = barber(AvailabilityMode::None);

        assert!(matches!(
            check_client_booking(&regular, &vip_only, 5, day(10), day(10)),
            Err(BookingError::Forbidden(_))
        ));
        assert!(check_client_booking(&vip, &vip_only, 5, day(10), day(10)).is_ok());
        assert!(check_client_booking(&vip, &closed, 5, day(10), day(10)).is_err());
    }

    #[test]
    fn clients_cannot_book_for_others() {
        let client = Principal::client(5, true);
        assert!(matches!(
            check_client_booking(&client, &barber(AvailabilityMode::All), 6, day(10), day(10)),
            Err(BookingError::Forbidden(_))
        ));
    }

    #[test]
    fn barbers_bypass_policy() {
        let staff = Principal::barber(1);
        let closed = barber(AvailabilityMode::None);
        assert!(check_client_booking(&staff, &closed, 99, day(1), day(10)).is_ok());
        assert!(require_owner_or_barber(&staff, None).is_ok());
    }

    #[test]
    fn owners_may_access_their_appointments() {
        let client = Principal::client(5, false);
        assert!(require_owner_or_barber(&client, Some(5)).is_ok());
        assert!(require_owner_or_barber(&client, Some(6)).is_err());
        assert!(require_owner_or_barber(&client, None).is_err());
    }
}
