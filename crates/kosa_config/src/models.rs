use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API with credentials (the refresh cookie).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            allowed_origins: Vec::new(),
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite:data/kosa.db, loaded via KOSA__DATABASE__URL
    pub max_connections: Option<u32>,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    pub key_path: Option<String>,
    /// Shop-wide calendar; barbers without their own calendar use this one.
    pub calendar_id: Option<String>,
}

// --- Auth Config ---
// Secrets are normally "secret_from_env" in the toml files.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    /// Lifetime of access tokens issued by the refresh endpoint.
    #[serde(default = "default_renewed_access_ttl")]
    pub renewed_access_ttl_minutes: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            renewed_access_ttl_minutes: default_renewed_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            cookie_secure: true,
        }
    }
}

// --- Booking Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// IANA name of the shop time zone.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_slot_interval")]
    pub slot_interval_minutes: i64,
    /// Note stored on break rows created without an explicit reason.
    #[serde(default = "default_break_note")]
    pub break_note: String,
    /// Reject overlapping client bookings at write time.
    #[serde(default = "default_true")]
    pub enforce_no_overlap: bool,
    /// Run calendar reconciliation in the background at this interval.
    pub reconcile_interval_secs: Option<u64>,
    /// Pending rows younger than this are left alone by reconciliation.
    #[serde(default = "default_reconcile_grace")]
    pub reconcile_grace_secs: i64,
    #[serde(default = "default_max_break_days")]
    pub max_break_days: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            slot_interval_minutes: default_slot_interval(),
            break_note: default_break_note(),
            enforce_no_overlap: true,
            reconcile_interval_secs: None,
            reconcile_grace_secs: default_reconcile_grace(),
            max_break_days: default_max_break_days(),
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write a daily rolling log file here in addition to stdout.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Main Application Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}
fn default_access_ttl() -> i64 {
    240
}
fn default_renewed_access_ttl() -> i64 {
    15
}
fn default_refresh_ttl() -> i64 {
    7
}
fn default_time_zone() -> String {
    "Europe/Belgrade".to_string()
}
fn default_slot_interval() -> i64 {
    30
}
fn default_break_note() -> String {
    "BREAK".to_string()
}
fn default_reconcile_grace() -> i64 {
    300
}
fn default_max_break_days() -> i64 {
    366
}
fn default_log_level() -> String {
    "info".to_string()
}
