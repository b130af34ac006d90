//! Documents stored in the repository collections.
//!
//! Every record serializes to a camelCase JSON object. The `id`,
//! `createdAt` and `updatedAt` fields are owned by the repository: they are
//! skipped when empty on write and filled in on read.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

/// Ledger entry tag. Everything except `Credit` is a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Credit,
    Booking,
    Printing,
    Cafeteria,
}

impl LedgerKind {
    pub fn is_debit(&self) -> bool {
        !matches!(self, LedgerKind::Credit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Credit => "credit",
            LedgerKind::Booking => "booking",
            LedgerKind::Printing => "printing",
            LedgerKind::Cafeteria => "cafeteria",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub credit: BigDecimal,
    pub provider: AuthProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// the sign-in provider's account id, never used as the document id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_subject: Option<String>,
    /// only set on accounts provisioned from `ADMIN_EMAILS` at startup
    #[serde(default)]
    pub admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
    /// always a positive magnitude, the sign comes from `kind`
    pub amount: BigDecimal,
    #[serde(rename = "type")]
    pub kind: LedgerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub room_type: String,
    pub room_description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    pub guests: u32,
    #[serde(default)]
    pub special_requirements: String,
    pub total_cost: BigDecimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    pub print_type: String,
    pub paper_size: String,
    pub print_sides: String,
    pub copies: u32,
    pub binding: String,
    pub urgency: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            print_type: "bw".to_string(),
            paper_size: "a4".to_string(),
            print_sides: "single".to_string(),
            copies: 1,
            binding: "none".to_string(),
            urgency: "standard".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingOrder {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub order_number: String,
    pub files: Vec<PrintFile>,
    pub options: PrintOptions,
    pub total_pages: u32,
    pub cost: BigDecimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeteriaLine {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeteriaOrder {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub order_number: String,
    pub items: Vec<CafeteriaLine>,
    pub total: BigDecimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub course: String,
    pub course_title: String,
    pub cost: BigDecimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `PO123456` style order number from the last six digits of the millisecond clock.
pub fn order_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}
