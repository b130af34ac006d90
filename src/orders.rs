//! Order flows: validate a request, price it, then hand the debit to the ledger.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::info;

use crate::database::{to_fields, Collection, Document, Fields, Repository, StoreError};
use crate::error::ServiceError;
use crate::ledger::{Charge, Ledger, Receipt};
use crate::pricing::cafeteria::{self, Cart, CartLine};
use crate::pricing::{printing, rooms};
use crate::records::{
    order_number, Booking, CafeteriaLine, CafeteriaOrder, CourseEnrollment, LedgerKind, OrderStatus, PrintFile,
    PrintOptions, PrintingOrder,
};
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub room_type: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub guests: u32,
    pub special_requirements: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingQuote {
    pub room_description: String,
    pub duration_minutes: u32,
    pub rate_description: String,
    pub cost: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintingRequest {
    pub files: Vec<Upload>,
    pub options: PrintOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintingQuote {
    pub files: Vec<PrintFile>,
    pub total_pages: u32,
    pub cost: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CafeteriaQuote {
    pub lines: Vec<CafeteriaLine>,
    pub item_count: u32,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserOrders {
    pub bookings: Vec<Booking>,
    pub printing_orders: Vec<PrintingOrder>,
    pub cafeteria_orders: Vec<CafeteriaOrder>,
    pub course_enrollments: Vec<CourseEnrollment>,
}

/// Prices the request with the guest count clamped to the room's capacity;
/// `confirm_booking` rejects counts outside it.
pub fn quote_booking(request: &BookingRequest) -> Result<BookingQuote, ServiceError> {
    let room = rooms::find(&request.room_type).ok_or_else(|| ServiceError::bad_parameter("roomType"))?;
    if NaiveDate::parse_from_str(request.date.trim(), "%Y-%m-%d").is_err() {
        return Err(ServiceError::bad_parameter("date"));
    }
    if rooms::parse_time(&request.start_time).is_none() {
        return Err(ServiceError::bad_parameter("startTime"));
    }
    let duration = rooms::duration_minutes(&request.start_time, &request.end_time)
        .ok_or_else(|| ServiceError::bad_parameter("endTime"))?;
    let guests = room.clamp_guests(request.guests);
    Ok(BookingQuote {
        room_description: room.description.to_string(),
        duration_minutes: duration,
        rate_description: rooms::rate_description(room.key, duration, guests),
        cost: rooms::booking_cost(room.key, duration, guests),
    })
}

pub fn confirm_booking(ledger: &Ledger, session: &Session, request: &BookingRequest) -> Result<Booking, ServiceError> {
    let quote = quote_booking(request)?;
    if let Some(room) = rooms::find(&request.room_type).filter(|room| !room.admits(request.guests)) {
        return Err(ServiceError::CapacityViolation {
            room: room.description.to_string(),
            guests: request.guests,
            min: room.min_guests,
            max: room.max_guests,
        });
    }
    let booking = Booking {
        id: String::new(),
        user_id: session.user_id().to_string(),
        room_type: request.room_type.clone(),
        room_description: quote.room_description.clone(),
        date: request.date.trim().to_string(),
        start_time: request.start_time.trim().to_string(),
        end_time: request.end_time.trim().to_string(),
        duration_minutes: quote.duration_minutes,
        guests: request.guests,
        special_requirements: request.special_requirements.trim().to_string(),
        total_cost: quote.cost.clone(),
        status: OrderStatus::Confirmed,
        created_at: None,
    };
    let receipt = ledger.charge(
        session,
        Charge {
            collection: Collection::Bookings,
            record: to_fields(&booking)?,
            amount: quote.cost,
            kind: LedgerKind::Booking,
            description: format!("Booking - {}", quote.room_description),
        },
    )?;
    decode_order(receipt)
}

fn validate_options(options: &PrintOptions) -> Result<(), ServiceError> {
    if printing::base_price(&options.print_type, "a4").is_none() {
        return Err(ServiceError::bad_parameter("printType"));
    }
    if printing::base_price("bw", &options.paper_size).is_none() {
        return Err(ServiceError::bad_parameter("paperSize"));
    }
    if !matches!(options.print_sides.as_str(), "single" | "double") {
        return Err(ServiceError::bad_parameter("printSides"));
    }
    if !matches!(options.binding.as_str(), "none" | "stapled" | "spiral" | "hardcover") {
        return Err(ServiceError::bad_parameter("binding"));
    }
    if !matches!(options.urgency.as_str(), "standard" | "express" | "urgent") {
        return Err(ServiceError::bad_parameter("urgency"));
    }
    Ok(())
}

pub fn quote_printing(request: &PrintingRequest) -> Result<PrintingQuote, ServiceError> {
    if request.files.is_empty() {
        return Err(ServiceError::bad_parameter("files"));
    }
    validate_options(&request.options)?;
    let mut files = Vec::with_capacity(request.files.len());
    for upload in &request.files {
        printing::accept_file(&upload.mime_type, upload.size_bytes)
            .map_err(|_| ServiceError::bad_parameter("files"))?;
        files.push(PrintFile {
            name: upload.name.clone(),
            size_bytes: upload.size_bytes,
            mime_type: upload.mime_type.clone(),
            pages: printing::estimate_pages(upload.size_bytes, &upload.mime_type),
        });
    }
    let pages_per_set: u32 = files.iter().map(|file| file.pages).sum();
    Ok(PrintingQuote {
        total_pages: printing::total_pages(pages_per_set, request.options.copies),
        cost: printing::printing_cost(pages_per_set, &request.options),
        files,
    })
}

/// Printing orders wait in `pending` until the print shop confirms them.
pub fn submit_printing(
    ledger: &Ledger,
    session: &Session,
    request: &PrintingRequest,
) -> Result<PrintingOrder, ServiceError> {
    let quote = quote_printing(request)?;
    let number = order_number("PO", Utc::now());
    let mut options = request.options.clone();
    options.copies = options.copies.max(1);
    let order = PrintingOrder {
        id: String::new(),
        user_id: session.user_id().to_string(),
        order_number: number.clone(),
        files: quote.files,
        options,
        total_pages: quote.total_pages,
        cost: quote.cost.clone(),
        status: OrderStatus::Pending,
        created_at: None,
    };
    let receipt = ledger.charge(
        session,
        Charge {
            collection: Collection::PrintingOrders,
            record: to_fields(&order)?,
            amount: quote.cost,
            kind: LedgerKind::Printing,
            description: format!("Printing Order #{number}"),
        },
    )?;
    decode_order(receipt)
}

/// Lines for the same item are merged; an unknown item, a zero quantity or
/// more than [`cafeteria::MAX_QUANTITY`] of one item rejects the cart.
pub fn quote_cafeteria(items: &[CartLine]) -> Result<CafeteriaQuote, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::bad_parameter("items"));
    }
    let mut cart = Cart::default();
    for line in items {
        if !cart.put(&line.item_id, line.quantity) {
            return Err(ServiceError::bad_parameter("items"));
        }
    }
    let mut lines = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        let item = cafeteria::find(&line.item_id).ok_or_else(|| ServiceError::bad_parameter("items"))?;
        lines.push(CafeteriaLine {
            item_id: item.id.to_string(),
            name: item.name.to_string(),
            quantity: line.quantity,
            price: item.price(),
            total: item.price() * BigDecimal::from(line.quantity),
        });
    }
    Ok(CafeteriaQuote {
        item_count: cart.item_count(),
        total: cart.total(),
        lines,
    })
}

pub fn checkout_cafeteria(ledger: &Ledger, session: &Session, items: &[CartLine]) -> Result<CafeteriaOrder, ServiceError> {
    let quote = quote_cafeteria(items)?;
    let number = order_number("CF", Utc::now());
    let order = CafeteriaOrder {
        id: String::new(),
        user_id: session.user_id().to_string(),
        order_number: number.clone(),
        items: quote.lines,
        total: quote.total.clone(),
        status: OrderStatus::Confirmed,
        created_at: None,
    };
    let receipt = ledger.charge(
        session,
        Charge {
            collection: Collection::CafeteriaOrders,
            record: to_fields(&order)?,
            amount: quote.total,
            kind: LedgerKind::Cafeteria,
            description: format!("Cafeteria Order #{number}"),
        },
    )?;
    decode_order(receipt)
}

fn decode_order<T: serde::de::DeserializeOwned>(receipt: Receipt) -> Result<T, ServiceError> {
    match receipt.order {
        Some(order) => Ok(order.decode()?),
        None => Err(ServiceError::Internal("charge without an order".to_string())),
    }
}

pub(crate) fn user_documents<T: serde::de::DeserializeOwned>(
    repo: &dyn Repository,
    collection: Collection,
    user_id: &str,
) -> Result<Vec<T>, StoreError> {
    let mut filter = Fields::new();
    filter.insert("userId".to_string(), Value::String(user_id.to_string()));
    let mut docs = repo.get_all(collection, &filter)?;
    // RFC 3339 stamps with a fixed precision sort lexicographically
    docs.sort_by(|a, b| created_at(b).cmp(created_at(a)));
    docs.iter().map(Document::decode).collect()
}

fn created_at(doc: &Document) -> &str {
    doc.get("createdAt").and_then(Value::as_str).unwrap_or_default()
}

/// Everything the user ordered, newest first within each kind.
pub fn list_orders(repo: &dyn Repository, user_id: &str) -> Result<UserOrders, ServiceError> {
    Ok(UserOrders {
        bookings: user_documents(repo, Collection::Bookings, user_id)?,
        printing_orders: user_documents(repo, Collection::PrintingOrders, user_id)?,
        cafeteria_orders: user_documents(repo, Collection::CafeteriaOrders, user_id)?,
        course_enrollments: user_documents(repo, Collection::CourseEnrollments, user_id)?,
    })
}

pub fn mark_printing_confirmed(repo: &dyn Repository, order_id: &str) -> Result<PrintingOrder, ServiceError> {
    let order: PrintingOrder = repo
        .get(Collection::PrintingOrders, order_id)?
        .ok_or_else(|| ServiceError::NotFound("printing order".to_string()))?
        .decode()?;
    if order.status == OrderStatus::Confirmed {
        return Ok(order);
    }
    let mut patch = Fields::new();
    patch.insert(
        "status".to_string(),
        Value::String(OrderStatus::Confirmed.as_str().to_string()),
    );
    if !repo.update(Collection::PrintingOrders, order_id, patch)? {
        return Err(ServiceError::NotFound("printing order".to_string()));
    }
    info!(order_id, order_number = %order.order_number, "printing order confirmed");
    Ok(PrintingOrder {
        status: OrderStatus::Confirmed,
        ..order
    })
}
