//! Domain models shared by storage, booking and the HTTP layer.
//!
//! JSON uses camelCase keys. Dates are `YYYY-MM-DD` and times `HH:MM:SS`,
//! both in the shop's local wall-clock.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Who may book a barber.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AvailabilityMode {
    #[default]
    #[serde(rename = "All")]
    All,
    #[serde(rename = "VIPs")]
    VipOnly,
    #[serde(rename = "None")]
    None,
}

impl AvailabilityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityMode::All => "All",
            AvailabilityMode::VipOnly => "VIPs",
            AvailabilityMode::None => "None",
        }
    }

    /// Whether a client with the given VIP flag may see and book this barber.
    pub fn admits(&self, is_vip: bool) -> bool {
        match self {
            AvailabilityMode::All => true,
            AvailabilityMode::VipOnly => is_vip,
            AvailabilityMode::None => false,
        }
    }
}

impl FromStr for AvailabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(AvailabilityMode::All),
            "VIPs" => Ok(AvailabilityMode::VipOnly),
            "None" => Ok(AvailabilityMode::None),
            other => Err(format!("unknown availability mode: {other}")),
        }
    }
}

/// Kind of authenticated principal.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Client,
    Barber,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::Client => write!(f, "client"),
            PrincipalKind::Barber => write!(f, "barber"),
        }
    }
}

/// State of an appointment's mirror in the external calendar.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    /// Row written, calendar insert not yet confirmed.
    Pending,
    Synced,
    /// Calendar insert failed; reconciliation will retry.
    Failed,
    /// Written while no calendar collaborator was configured.
    Unmirrored,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
            SyncStatus::Unmirrored => "unmirrored",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            "failed" => Ok(SyncStatus::Failed),
            "unmirrored" => Ok(SyncStatus::Unmirrored),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// What occupies an appointment's slot.
///
/// Guest appointments and barber breaks are both `Break`s: they block the
/// timeline but reference no client or service.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AppointmentKind {
    #[serde(rename_all = "camelCase")]
    Booking {
        client_id: i64,
        service_id: i64,
        note: String,
    },
    Break { reason: String },
}

impl AppointmentKind {
    /// Free text stored alongside the appointment.
    pub fn note(&self) -> &str {
        match self {
            AppointmentKind::Booking { note, .. } => note,
            AppointmentKind::Break { reason } => reason,
        }
    }

    pub fn client_id(&self) -> Option<i64> {
        match self {
            AppointmentKind::Booking { client_id, .. } => Some(*client_id),
            AppointmentKind::Break { .. } => None,
        }
    }

    pub fn service_id(&self) -> Option<i64> {
        match self {
            AppointmentKind::Booking { service_id, .. } => Some(*service_id),
            AppointmentKind::Break { .. } => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, AppointmentKind::Break { .. })
    }
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub barber_id: i64,
    #[serde(flatten)]
    pub kind: AppointmentKind,
    pub sync_status: SyncStatus,
    pub calendar_event_id: Option<String>,
    /// Event left behind by a move whose removal failed; reconciliation deletes it.
    #[serde(skip)]
    pub stale_event: Option<StaleEvent>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A calendar event that no longer belongs to any appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEvent {
    pub calendar_id: String,
    pub event_id: String,
}

impl Appointment {
    pub fn note(&self) -> &str {
        self.kind.note()
    }

    /// Local wall-clock end of the appointment.
    pub fn end_time(&self) -> NaiveTime {
        self.time + chrono::Duration::minutes(self.duration_minutes)
    }
}

/// Row to insert; identifier and timestamps are assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub barber_id: i64,
    pub kind: AppointmentKind,
    pub sync_status: SyncStatus,
}

/// Full replacement of an appointment's mutable fields.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdate {
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub note: String,
    pub duration_minutes: i64,
    pub barber_id: i64,
    /// Only meaningful for client bookings.
    pub client_id: Option<i64>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub duration_minutes: i64,
    /// Smallest currency unit.
    pub price: i64,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub duration_minutes: i64,
    pub price: i64,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub booking_window_days: i64,
    pub availability: AvailabilityMode,
    pub calendar_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBarber {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub booking_window_days: i64,
    pub availability: AvailabilityMode,
    pub calendar_id: Option<String>,
}

/// Profile fields a barber may change; credentials are handled separately.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberUpdate {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub booking_window_days: i64,
    pub availability: AvailabilityMode,
    pub calendar_id: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "isVIP")]
    pub is_vip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_vip: bool,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(rename = "isVIP", default)]
    pub is_vip: bool,
}

/// Appointment as a barber sees it; breaks carry no client or service.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberAppointmentDetail {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub note: String,
    pub is_break: bool,
    pub client_name: Option<String>,
    pub client_surname: Option<String>,
    pub client_phone: Option<String>,
    pub service_name: Option<String>,
    pub service_price: Option<i64>,
}

/// Appointment as a client sees it.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAppointmentDetail {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub note: String,
    pub barber_name: String,
    pub barber_surname: String,
    pub barber_phone: String,
    pub service_name: String,
    pub service_price: i64,
}
