use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use prost::Message;
use prost_wkt_types::Timestamp;
use tracing::error;

use crate::courses::Course;
use crate::error::ServiceError;
use crate::ledger::Reconciliation;
use crate::money;
use crate::orders::{BookingQuote, CafeteriaQuote, PrintingQuote, UserOrders};
use crate::pricing::cafeteria::MenuItem;
use crate::pricing::rooms;
use crate::proto::{
    error, ActivityData, AuthFailure, CollectionCountData, BadParameterError, BalanceData, BookingData, BookingQuoteData,
    CafeteriaLineData, CafeteriaOrderData, CafeteriaQuoteData, CapacityError, ConflictError, CourseData,
    EnrollmentData, Error, ForbiddenError, GenericOutput, InsufficientCreditError, InternalError, LedgerEntryData,
    MenuItemData, NotFoundError, OrdersData, PrintFileData, PrintOptionsData, PrintingOrderData, PrintingQuoteData,
    ReconciliationData, RevenueData, StatsData, UnauthorizedError, UserData,
};
use crate::records::{
    Booking, CafeteriaLine, CafeteriaOrder, CourseEnrollment, LedgerEntry, PrintFile, PrintOptions, PrintingOrder,
    User,
};
use crate::reports::AdminReport;

pub const PROTOBUF: &str = "application/x-protobuf";

fn timestamp(at: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

fn amount(value: &BigDecimal) -> String {
    money::to_string(value)
}

pub fn user_data(user: &User) -> UserData {
    UserData {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        credit: amount(&user.credit),
        provider: user.provider.as_str().to_string(),
        phone: user.phone.clone().unwrap_or_default(),
        student_id: user.student_id.clone().unwrap_or_default(),
        picture: user.picture.clone().unwrap_or_default(),
        created_at: user.created_at.map(timestamp),
        admin: user.admin,
    }
}

pub fn balance_data(user_id: &str, balance: &BigDecimal) -> BalanceData {
    BalanceData {
        user_id: user_id.to_string(),
        currency: money::CURRENCY.to_string(),
        value: amount(balance),
    }
}

pub fn ledger_entry_data(entry: &LedgerEntry) -> LedgerEntryData {
    LedgerEntryData {
        id: entry.id.clone(),
        date: Some(timestamp(entry.date)),
        description: entry.description.clone(),
        amount: amount(&entry.amount),
        kind: entry.kind.as_str().to_string(),
    }
}

pub fn reconciliation_data(report: &Reconciliation) -> ReconciliationData {
    ReconciliationData {
        credits: amount(&report.credits),
        debits: amount(&report.debits),
        expected: amount(&report.expected),
        actual: amount(&report.actual),
        consistent: report.consistent,
    }
}

pub fn booking_quote_data(quote: &BookingQuote) -> BookingQuoteData {
    BookingQuoteData {
        room_description: quote.room_description.clone(),
        duration_minutes: quote.duration_minutes,
        duration: rooms::format_duration(quote.duration_minutes),
        rate_description: quote.rate_description.clone(),
        cost: amount(&quote.cost),
    }
}

fn print_file_data(file: &PrintFile) -> PrintFileData {
    PrintFileData {
        name: file.name.clone(),
        size_bytes: file.size_bytes,
        mime_type: file.mime_type.clone(),
        pages: file.pages,
    }
}

fn print_options_data(options: &PrintOptions) -> PrintOptionsData {
    PrintOptionsData {
        print_type: options.print_type.clone(),
        paper_size: options.paper_size.clone(),
        print_sides: options.print_sides.clone(),
        copies: options.copies,
        binding: options.binding.clone(),
        urgency: options.urgency.clone(),
    }
}

pub fn printing_quote_data(quote: &PrintingQuote) -> PrintingQuoteData {
    PrintingQuoteData {
        files: quote.files.iter().map(print_file_data).collect(),
        total_pages: quote.total_pages,
        cost: amount(&quote.cost),
    }
}

fn cafeteria_line_data(line: &CafeteriaLine) -> CafeteriaLineData {
    CafeteriaLineData {
        item_id: line.item_id.clone(),
        name: line.name.clone(),
        quantity: line.quantity,
        price: amount(&line.price),
        total: amount(&line.total),
    }
}

pub fn cafeteria_quote_data(quote: &CafeteriaQuote) -> CafeteriaQuoteData {
    CafeteriaQuoteData {
        lines: quote.lines.iter().map(cafeteria_line_data).collect(),
        item_count: quote.item_count,
        total: amount(&quote.total),
    }
}

pub fn menu_item_data(item: &MenuItem) -> MenuItemData {
    MenuItemData {
        id: item.id.to_string(),
        name: item.name.to_string(),
        description: item.description.to_string(),
        category: item.category.to_string(),
        price: amount(&item.price()),
        popular: item.popular,
    }
}

pub fn booking_data(booking: &Booking) -> BookingData {
    BookingData {
        id: booking.id.clone(),
        room_type: booking.room_type.clone(),
        room_description: booking.room_description.clone(),
        date: booking.date.clone(),
        start_time: booking.start_time.clone(),
        end_time: booking.end_time.clone(),
        duration_minutes: booking.duration_minutes,
        guests: booking.guests,
        special_requirements: booking.special_requirements.clone(),
        total_cost: amount(&booking.total_cost),
        status: booking.status.as_str().to_string(),
        created_at: booking.created_at.map(timestamp),
    }
}

pub fn printing_order_data(order: &PrintingOrder) -> PrintingOrderData {
    PrintingOrderData {
        id: order.id.clone(),
        order_number: order.order_number.clone(),
        files: order.files.iter().map(print_file_data).collect(),
        options: Some(print_options_data(&order.options)),
        total_pages: order.total_pages,
        cost: amount(&order.cost),
        status: order.status.as_str().to_string(),
        created_at: order.created_at.map(timestamp),
    }
}

pub fn cafeteria_order_data(order: &CafeteriaOrder) -> CafeteriaOrderData {
    CafeteriaOrderData {
        id: order.id.clone(),
        order_number: order.order_number.clone(),
        items: order.items.iter().map(cafeteria_line_data).collect(),
        total: amount(&order.total),
        status: order.status.as_str().to_string(),
        created_at: order.created_at.map(timestamp),
    }
}

pub fn enrollment_data(enrollment: &CourseEnrollment) -> EnrollmentData {
    EnrollmentData {
        id: enrollment.id.clone(),
        course: enrollment.course.clone(),
        course_title: enrollment.course_title.clone(),
        cost: amount(&enrollment.cost),
        status: enrollment.status.as_str().to_string(),
        created_at: enrollment.created_at.map(timestamp),
    }
}

pub fn orders_data(orders: &UserOrders) -> OrdersData {
    OrdersData {
        bookings: orders.bookings.iter().map(booking_data).collect(),
        printing_orders: orders.printing_orders.iter().map(printing_order_data).collect(),
        cafeteria_orders: orders.cafeteria_orders.iter().map(cafeteria_order_data).collect(),
        course_enrollments: orders.course_enrollments.iter().map(enrollment_data).collect(),
    }
}

pub fn course_data(course: &Course) -> CourseData {
    CourseData {
        key: course.key.to_string(),
        title: course.title.to_string(),
        trainer: course.trainer.to_string(),
        starts: course.starts.to_string(),
        description: course.description.to_string(),
    }
}

pub fn stats_data(report: &AdminReport) -> StatsData {
    let stats = &report.stats;
    let revenue = &report.revenue;
    StatsData {
        total_users: stats.total_users as u64,
        active_bookings: stats.active_bookings as u64,
        monthly_revenue: amount(&stats.monthly_revenue),
        course_enrollments: stats.course_enrollments as u64,
        new_users_today: stats.new_users_today as u64,
        bookings_today: stats.bookings_today as u64,
        printing_orders_today: stats.printing_orders_today as u64,
        revenue: Some(RevenueData {
            total: amount(&revenue.total),
            bookings: amount(&revenue.by_source.bookings),
            printing: amount(&revenue.by_source.printing),
            cafeteria: amount(&revenue.by_source.cafeteria),
            courses: amount(&revenue.by_source.courses),
            monthly_trend: revenue
                .monthly_trend
                .iter()
                .map(|(month, value)| (month.clone(), amount(value)))
                .collect(),
        }),
        recent_activity: report
            .recent_activity
            .iter()
            .map(|activity| ActivityData {
                kind: activity.kind.to_string(),
                title: activity.title.clone(),
                user_id: activity.user_id.clone(),
                created_at: Some(timestamp(activity.created_at)),
            })
            .collect(),
        backend: report.backend.to_string(),
        storage: report
            .storage
            .iter()
            .map(|stats| CollectionCountData {
                collection: stats.collection.as_str().to_string(),
                total: stats.total as u64,
            })
            .collect(),
    }
}

pub fn http_response(status: StatusCode, data: &GenericOutput, is_protobuf: bool) -> HttpResponse {
    if is_protobuf {
        HttpResponse::build(status)
            .content_type(PROTOBUF)
            .body(data.encode_to_vec())
    } else {
        match serde_json::to_string(data) {
            Ok(body) => HttpResponse::build(status).content_type("application/json").body(body),
            Err(e) => {
                error!("{e}");
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

pub fn ok_http_response(data: GenericOutput, is_protobuf: bool) -> HttpResponse {
    http_response(StatusCode::OK, &data, is_protobuf)
}

fn one_error(e: &ServiceError) -> error::OneError {
    match e {
        ServiceError::BadParameter(name) => error::OneError::BadParameter(BadParameterError { name: name.clone() }),
        ServiceError::InsufficientCredit { needed, available } => {
            error::OneError::InsufficientCredit(InsufficientCreditError {
                needed: amount(needed),
                available: amount(available),
            })
        }
        ServiceError::CapacityViolation { room, guests, min, max } => error::OneError::Capacity(CapacityError {
            room: room.clone(),
            guests: *guests,
            min: *min,
            max: *max,
        }),
        ServiceError::Unauthorized => error::OneError::Unauthorized(UnauthorizedError {}),
        ServiceError::Forbidden => error::OneError::Forbidden(ForbiddenError {}),
        ServiceError::NotFound(name) => error::OneError::NotFound(NotFoundError { name: name.clone() }),
        ServiceError::Conflict(_) => error::OneError::Conflict(ConflictError {}),
        ServiceError::Auth(e) => error::OneError::Auth(AuthFailure {
            code: e.code().to_string(),
        }),
        ServiceError::Storage(_) | ServiceError::Internal(_) => error::OneError::Internal(InternalError {}),
    }
}

pub fn error_http_response(e: &ServiceError, is_protobuf: bool) -> HttpResponse {
    let status = e.status();
    if status.is_server_error() {
        error!("{e}");
    }
    let data = GenericOutput {
        error: Some(Error {
            message: e.public_message(),
            one_error: Some(one_error(e)),
        }),
        ..Default::default()
    };
    http_response(status, &data, is_protobuf)
}

pub fn bad_parameter_http_response(field: &str, is_protobuf: bool) -> HttpResponse {
    error_http_response(&ServiceError::bad_parameter(field), is_protobuf)
}
