//! Wire types exchanged with the gateway backend.
//!
//! Backends are loose about field types (booleans sent as `1`, ids as numbers or
//! strings), so status flags are read with JavaScript truthiness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Truthiness of a loosely typed JSON value.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Record identifier; the backend uses both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Status message as sent by `GET /api/status`, `GET /api/whatsapp/status` and the
/// `whatsapp-status` push event.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawStatus {
    #[serde(default)]
    whatsapp_connected: Option<Value>,
    #[serde(default)]
    connected: Option<Value>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    qr_available: Option<Value>,
    #[serde(default)]
    qrcode: Option<String>,
    #[serde(default)]
    last_seen: Option<String>,
    #[serde(default, alias = "sequence")]
    seq: Option<u64>,
    #[serde(default)]
    timestamp: Option<Value>,
}

/// A partial view of the connection status. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub connected: Option<bool>,
    pub phone_number: Option<String>,
    pub qr_available: Option<bool>,
    /// QR image as a data URI, only present on push messages.
    pub qrcode: Option<String>,
    pub last_seen: Option<String>,
    /// Server ordering stamp: a sequence number, or a timestamp in milliseconds.
    pub stamp: Option<u64>,
}

impl StatusUpdate {
    pub fn connected(connected: bool) -> Self {
        Self {
            connected: Some(connected),
            ..Self::default()
        }
    }

    pub fn with_qr_available(mut self, available: bool) -> Self {
        self.qr_available = Some(available);
        self
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_qrcode(mut self, qrcode: impl Into<String>) -> Self {
        self.qrcode = Some(qrcode.into());
        self
    }

    pub fn with_stamp(mut self, stamp: u64) -> Self {
        self.stamp = Some(stamp);
        self
    }
}

fn parse_stamp(seq: Option<u64>, timestamp: Option<&Value>) -> Option<u64> {
    if seq.is_some() {
        return seq;
    }
    match timestamp? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .and_then(|t| u64::try_from(t.with_timezone(&Utc).timestamp_millis()).ok()),
        _ => None,
    }
}

impl From<RawStatus> for StatusUpdate {
    fn from(raw: RawStatus) -> Self {
        let connected = raw
            .whatsapp_connected
            .as_ref()
            .or(raw.connected.as_ref())
            .map(truthy);
        Self {
            connected,
            phone_number: non_empty(raw.phone_number),
            qr_available: raw.qr_available.as_ref().map(truthy),
            qrcode: non_empty(raw.qrcode),
            last_seen: non_empty(raw.last_seen),
            stamp: parse_stamp(raw.seq, raw.timestamp.as_ref()),
        }
    }
}

impl<'de> Deserialize<'de> for StatusUpdate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawStatus::deserialize(deserializer).map(StatusUpdate::from)
    }
}

/// `GET /health`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Health {
    #[serde(default)]
    pub whatsapp: Option<HealthWhatsapp>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HealthWhatsapp {
    #[serde(default)]
    pub connected: bool,
}

impl Health {
    pub fn whatsapp_connected(&self) -> bool {
        self.whatsapp.as_ref().is_some_and(|w| w.connected)
    }
}

/// `GET /api/whatsapp/qrcode`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrResponse {
    #[serde(default)]
    pub qrcode: Option<String>,
}

/// One OTP delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl LogEntry {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Delivery time formatted for display, or the raw value when it does not parse.
    pub fn display_time(&self) -> String {
        match self.time.as_deref() {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| {
                    t.with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                })
                .unwrap_or_else(|_| raw.to_string()),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    /// One-based index range of the items on the current page, `None` when empty.
    pub fn item_range(&self) -> Option<(u64, u64)> {
        if self.total_items == 0 || self.per_page == 0 {
            return None;
        }
        let page = u64::from(self.current_page.max(1));
        let per_page = u64::from(self.per_page);
        let first = (page - 1) * per_page + 1;
        let last = (page * per_page).min(self.total_items);
        (first <= last).then_some((first, last))
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// `GET /api/logs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogPage {
    #[serde(default)]
    pub data: Vec<LogEntry>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Filters for `GET /api/logs`. Empty filters are left out of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub phone: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            phone: None,
            status: None,
            from: None,
            to: None,
            page: 1,
            limit: crate::consts::cli_consts::DEFAULT_LOG_PAGE_SIZE,
        }
    }
}

impl LogQuery {
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: limit as u32,
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let filters = [
            ("phone", &self.phone),
            ("status", &self.status),
            ("from", &self.from),
            ("to", &self.to),
        ];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        pairs.push(("page", self.page.max(1).to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// `GET /api/statistik`. Missing counters read as zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub sent_today: u64,
    #[serde(default)]
    pub failed_today: u64,
    #[serde(default)]
    pub success_rate: f64,
}

impl Statistics {
    /// Success rate clamped for gauges.
    pub fn success_percent(&self) -> u16 {
        self.success_rate.clamp(0.0, 100.0).round() as u16
    }
}

/// `GET/POST /api/settings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyResponse {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Logged-in user as returned by `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: RecordId,
    #[serde(alias = "nama")]
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub nama: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/whatsapp/device-info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub wa_version: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// One entry of `GET /api/whatsapp/login-history`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginHistoryEntry {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
