//! Wire messages. Every response is a `GenericOutput` carrying one payload or
//! an `error`; the same structs serialize to protobuf and to camelCase JSON.
//! Money travels as decimal strings.

use prost_wkt_types::Timestamp;

// ---- inputs ----

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterInput {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub password: String,
    #[prost(string, tag = "4")]
    pub confirm_password: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginInput {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

/// Identity forwarded by the sign-in proxy.
#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderInput {
    #[prost(string, tag = "1")]
    pub subject: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(string, tag = "4")]
    pub picture: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileInput {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub phone: String,
    #[prost(string, tag = "3")]
    pub student_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopUpInput {
    #[prost(string, tag = "1")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingInput {
    #[prost(string, tag = "1")]
    pub room_type: String,
    #[prost(string, tag = "2")]
    pub date: String,
    #[prost(string, tag = "3")]
    pub start_time: String,
    #[prost(string, tag = "4")]
    pub end_time: String,
    #[prost(uint32, tag = "5")]
    pub guests: u32,
    #[prost(string, tag = "6")]
    pub special_requirements: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInput {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub size_bytes: u64,
    #[prost(string, tag = "3")]
    pub mime_type: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptionsData {
    #[prost(string, tag = "1")]
    pub print_type: String,
    #[prost(string, tag = "2")]
    pub paper_size: String,
    #[prost(string, tag = "3")]
    pub print_sides: String,
    #[prost(uint32, tag = "4")]
    pub copies: u32,
    #[prost(string, tag = "5")]
    pub binding: String,
    #[prost(string, tag = "6")]
    pub urgency: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintingInput {
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<FileInput>,
    #[prost(message, optional, tag = "2")]
    pub options: Option<PrintOptionsData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartLineInput {
    #[prost(string, tag = "1")]
    pub item_id: String,
    #[prost(uint32, tag = "2")]
    pub quantity: u32,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CafeteriaInput {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<CartLineInput>,
}

// ---- payloads ----

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(string, tag = "4")]
    pub credit: String,
    #[prost(string, tag = "5")]
    pub provider: String,
    #[prost(string, tag = "6")]
    pub phone: String,
    #[prost(string, tag = "7")]
    pub student_id: String,
    #[prost(string, tag = "8")]
    pub picture: String,
    #[prost(message, optional, tag = "9")]
    pub created_at: Option<Timestamp>,
    #[prost(bool, tag = "10")]
    pub admin: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(message, optional, tag = "2")]
    pub user: Option<UserData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub currency: String,
    #[prost(string, tag = "3")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub date: Option<Timestamp>,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub amount: String,
    #[prost(string, tag = "5")]
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<LedgerEntryData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationData {
    #[prost(string, tag = "1")]
    pub credits: String,
    #[prost(string, tag = "2")]
    pub debits: String,
    #[prost(string, tag = "3")]
    pub expected: String,
    #[prost(string, tag = "4")]
    pub actual: String,
    #[prost(bool, tag = "5")]
    pub consistent: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuoteData {
    #[prost(string, tag = "1")]
    pub room_description: String,
    #[prost(uint32, tag = "2")]
    pub duration_minutes: u32,
    #[prost(string, tag = "3")]
    pub duration: String,
    #[prost(string, tag = "4")]
    pub rate_description: String,
    #[prost(string, tag = "5")]
    pub cost: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintFileData {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(uint64, tag = "2")]
    pub size_bytes: u64,
    #[prost(string, tag = "3")]
    pub mime_type: String,
    #[prost(uint32, tag = "4")]
    pub pages: u32,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingQuoteData {
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<PrintFileData>,
    #[prost(uint32, tag = "2")]
    pub total_pages: u32,
    #[prost(string, tag = "3")]
    pub cost: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeteriaLineData {
    #[prost(string, tag = "1")]
    pub item_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(uint32, tag = "3")]
    pub quantity: u32,
    #[prost(string, tag = "4")]
    pub price: String,
    #[prost(string, tag = "5")]
    pub total: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeteriaQuoteData {
    #[prost(message, repeated, tag = "1")]
    pub lines: Vec<CafeteriaLineData>,
    #[prost(uint32, tag = "2")]
    pub item_count: u32,
    #[prost(string, tag = "3")]
    pub total: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub category: String,
    #[prost(string, tag = "5")]
    pub price: String,
    #[prost(bool, tag = "6")]
    pub popular: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuData {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<MenuItemData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub room_type: String,
    #[prost(string, tag = "3")]
    pub room_description: String,
    #[prost(string, tag = "4")]
    pub date: String,
    #[prost(string, tag = "5")]
    pub start_time: String,
    #[prost(string, tag = "6")]
    pub end_time: String,
    #[prost(uint32, tag = "7")]
    pub duration_minutes: u32,
    #[prost(uint32, tag = "8")]
    pub guests: u32,
    #[prost(string, tag = "9")]
    pub special_requirements: String,
    #[prost(string, tag = "10")]
    pub total_cost: String,
    #[prost(string, tag = "11")]
    pub status: String,
    #[prost(message, optional, tag = "12")]
    pub created_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingOrderData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub order_number: String,
    #[prost(message, repeated, tag = "3")]
    pub files: Vec<PrintFileData>,
    #[prost(message, optional, tag = "4")]
    pub options: Option<PrintOptionsData>,
    #[prost(uint32, tag = "5")]
    pub total_pages: u32,
    #[prost(string, tag = "6")]
    pub cost: String,
    #[prost(string, tag = "7")]
    pub status: String,
    #[prost(message, optional, tag = "8")]
    pub created_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CafeteriaOrderData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub order_number: String,
    #[prost(message, repeated, tag = "3")]
    pub items: Vec<CafeteriaLineData>,
    #[prost(string, tag = "4")]
    pub total: String,
    #[prost(string, tag = "5")]
    pub status: String,
    #[prost(message, optional, tag = "6")]
    pub created_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentData {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub course: String,
    #[prost(string, tag = "3")]
    pub course_title: String,
    #[prost(string, tag = "4")]
    pub cost: String,
    #[prost(string, tag = "5")]
    pub status: String,
    #[prost(message, optional, tag = "6")]
    pub created_at: Option<Timestamp>,
}

/// A confirmed order together with the balance left after paying for it.
#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    #[prost(message, optional, tag = "1")]
    pub booking: Option<BookingData>,
    #[prost(message, optional, tag = "2")]
    pub printing_order: Option<PrintingOrderData>,
    #[prost(message, optional, tag = "3")]
    pub cafeteria_order: Option<CafeteriaOrderData>,
    #[prost(message, optional, tag = "4")]
    pub balance: Option<BalanceData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersData {
    #[prost(message, repeated, tag = "1")]
    pub bookings: Vec<BookingData>,
    #[prost(message, repeated, tag = "2")]
    pub printing_orders: Vec<PrintingOrderData>,
    #[prost(message, repeated, tag = "3")]
    pub cafeteria_orders: Vec<CafeteriaOrderData>,
    #[prost(message, repeated, tag = "4")]
    pub course_enrollments: Vec<EnrollmentData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub trainer: String,
    #[prost(string, tag = "4")]
    pub starts: String,
    #[prost(string, tag = "5")]
    pub description: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesData {
    #[prost(message, repeated, tag = "1")]
    pub courses: Vec<CourseData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueData {
    #[prost(string, tag = "1")]
    pub total: String,
    #[prost(string, tag = "2")]
    pub bookings: String,
    #[prost(string, tag = "3")]
    pub printing: String,
    #[prost(string, tag = "4")]
    pub cafeteria: String,
    #[prost(string, tag = "5")]
    pub courses: String,
    #[prost(btree_map = "string, string", tag = "6")]
    pub monthly_trend: std::collections::BTreeMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    #[prost(string, tag = "1")]
    pub kind: String,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub user_id: String,
    #[prost(message, optional, tag = "4")]
    pub created_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    #[prost(uint64, tag = "1")]
    pub total_users: u64,
    #[prost(uint64, tag = "2")]
    pub active_bookings: u64,
    #[prost(string, tag = "3")]
    pub monthly_revenue: String,
    #[prost(uint64, tag = "4")]
    pub course_enrollments: u64,
    #[prost(uint64, tag = "5")]
    pub new_users_today: u64,
    #[prost(uint64, tag = "6")]
    pub bookings_today: u64,
    #[prost(uint64, tag = "7")]
    pub printing_orders_today: u64,
    #[prost(message, optional, tag = "8")]
    pub revenue: Option<RevenueData>,
    #[prost(message, repeated, tag = "9")]
    pub recent_activity: Vec<ActivityData>,
    #[prost(string, tag = "10")]
    pub backend: String,
    #[prost(message, repeated, tag = "11")]
    pub storage: Vec<CollectionCountData>,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCountData {
    #[prost(string, tag = "1")]
    pub collection: String,
    #[prost(uint64, tag = "2")]
    pub total: u64,
}

// ---- errors ----

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadParameterError {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientCreditError {
    #[prost(string, tag = "1")]
    pub needed: String,
    #[prost(string, tag = "2")]
    pub available: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityError {
    #[prost(string, tag = "1")]
    pub room: String,
    #[prost(uint32, tag = "2")]
    pub guests: u32,
    #[prost(uint32, tag = "3")]
    pub min: u32,
    #[prost(uint32, tag = "4")]
    pub max: u32,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFailure {
    #[prost(string, tag = "1")]
    pub code: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnauthorizedError {}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForbiddenError {}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundError {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictError {}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalError {}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// human readable, safe to show to the user
    #[prost(string, tag = "1")]
    pub message: String,
    #[prost(oneof = "error::OneError", tags = "2, 3, 4, 5, 6, 7, 8, 9, 10, 11")]
    pub one_error: Option<error::OneError>,
}

pub mod error {
    #[derive(Clone, PartialEq, ::prost::Oneof, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum OneError {
        #[prost(message, tag = "2")]
        BadParameter(super::BadParameterError),
        #[prost(message, tag = "4")]
        InsufficientCredit(super::InsufficientCreditError),
        #[prost(message, tag = "5")]
        Capacity(super::CapacityError),
        #[prost(message, tag = "6")]
        Auth(super::AuthFailure),
        #[prost(message, tag = "7")]
        Unauthorized(super::UnauthorizedError),
        #[prost(message, tag = "8")]
        Forbidden(super::ForbiddenError),
        #[prost(message, tag = "9")]
        NotFound(super::NotFoundError),
        #[prost(message, tag = "10")]
        Conflict(super::ConflictError),
        #[prost(message, tag = "11")]
        Internal(super::InternalError),
    }
}

#[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericOutput {
    #[prost(message, optional, tag = "1")]
    pub error: Option<Error>,
    #[prost(message, optional, tag = "2")]
    pub session: Option<SessionData>,
    #[prost(message, optional, tag = "3")]
    pub user: Option<UserData>,
    #[prost(message, optional, tag = "4")]
    pub balance: Option<BalanceData>,
    #[prost(message, optional, tag = "5")]
    pub history: Option<HistoryData>,
    #[prost(message, optional, tag = "6")]
    pub reconciliation: Option<ReconciliationData>,
    #[prost(message, optional, tag = "7")]
    pub booking_quote: Option<BookingQuoteData>,
    #[prost(message, optional, tag = "8")]
    pub printing_quote: Option<PrintingQuoteData>,
    #[prost(message, optional, tag = "9")]
    pub cafeteria_quote: Option<CafeteriaQuoteData>,
    #[prost(message, optional, tag = "10")]
    pub menu: Option<MenuData>,
    #[prost(message, optional, tag = "11")]
    pub receipt: Option<ReceiptData>,
    #[prost(message, optional, tag = "12")]
    pub orders: Option<OrdersData>,
    #[prost(message, optional, tag = "13")]
    pub courses: Option<CoursesData>,
    #[prost(message, optional, tag = "14")]
    pub course: Option<CourseData>,
    #[prost(message, optional, tag = "15")]
    pub enrollment: Option<EnrollmentData>,
    #[prost(message, optional, tag = "16")]
    pub printing_order: Option<PrintingOrderData>,
    #[prost(message, optional, tag = "17")]
    pub stats: Option<StatsData>,
    #[prost(bool, tag = "18")]
    pub signed_out: bool,
}
