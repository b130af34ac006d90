//! Admin dashboard figures computed over the whole repository.

use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::database::{Collection, Document, Fields, Repository, Stats, StoreError};
use crate::money;
use crate::records::{Booking, CafeteriaOrder, CourseEnrollment, OrderStatus, PrintingOrder, User};

const RECENT_ACTIVITY: usize = 10;

/// Every record the reports look at, loaded once per request.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub bookings: Vec<Booking>,
    pub printing_orders: Vec<PrintingOrder>,
    pub cafeteria_orders: Vec<CafeteriaOrder>,
    pub course_enrollments: Vec<CourseEnrollment>,
}

fn load_all<T: serde::de::DeserializeOwned>(repo: &dyn Repository, collection: Collection) -> Result<Vec<T>, StoreError> {
    repo.get_all(collection, &Fields::new())?
        .iter()
        .map(Document::decode)
        .collect()
}

impl Snapshot {
    pub fn load(repo: &dyn Repository) -> Result<Self, StoreError> {
        Ok(Self {
            users: load_all(repo, Collection::Users)?,
            bookings: load_all(repo, Collection::Bookings)?,
            printing_orders: load_all(repo, Collection::PrintingOrders)?,
            cafeteria_orders: load_all(repo, Collection::CafeteriaOrders)?,
            course_enrollments: load_all(repo, Collection::CourseEnrollments)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_bookings: usize,
    pub monthly_revenue: BigDecimal,
    pub course_enrollments: usize,
    pub new_users_today: usize,
    pub bookings_today: usize,
    pub printing_orders_today: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueBySource {
    pub bookings: BigDecimal,
    pub printing: BigDecimal,
    pub cafeteria: BigDecimal,
    pub courses: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub total: BigDecimal,
    pub by_source: RevenueBySource,
    /// `YYYY-MM` to the amount earned that month
    pub monthly_trend: BTreeMap<String, BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub kind: &'static str,
    pub title: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReport {
    pub stats: DashboardStats,
    pub revenue: Revenue,
    pub recent_activity: Vec<Activity>,
    pub backend: &'static str,
    /// document count per collection
    pub storage: Vec<Stats>,
}

fn booking_day(booking: &Booking) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&booking.date, "%Y-%m-%d").ok()
}

fn created_on(created_at: &Option<DateTime<Utc>>, day: NaiveDate) -> bool {
    created_at.map_or(false, |at| at.date_naive() == day)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn dashboard_stats(snapshot: &Snapshot, today: NaiveDate) -> DashboardStats {
    let monthly_revenue = snapshot
        .bookings
        .iter()
        .filter(|booking| booking_day(booking).map_or(false, |day| same_month(day, today)))
        .fold(BigDecimal::zero(), |sum, booking| sum + &booking.total_cost);

    DashboardStats {
        total_users: snapshot.users.len(),
        active_bookings: snapshot
            .bookings
            .iter()
            .filter(|booking| booking.status == OrderStatus::Confirmed)
            .count(),
        monthly_revenue: money::round(&monthly_revenue),
        course_enrollments: snapshot.course_enrollments.len(),
        new_users_today: snapshot
            .users
            .iter()
            .filter(|user| created_on(&user.created_at, today))
            .count(),
        bookings_today: snapshot
            .bookings
            .iter()
            .filter(|booking| booking_day(booking) == Some(today))
            .count(),
        printing_orders_today: snapshot
            .printing_orders
            .iter()
            .filter(|order| created_on(&order.created_at, today))
            .count(),
    }
}

fn month_key(day: NaiveDate) -> String {
    format!("{}-{:02}", day.year(), day.month())
}

fn sum<'a>(amounts: impl Iterator<Item = (Option<NaiveDate>, &'a BigDecimal)>) -> BigDecimal {
    money::round(&amounts.fold(BigDecimal::zero(), |sum, (_, amount)| sum + amount))
}

pub fn revenue(snapshot: &Snapshot) -> Revenue {
    // (month the money came in, amount); bookings without a stamp fall back to their date
    let bookings = snapshot.bookings.iter().map(|booking| {
        let day = booking.created_at.map(|at| at.date_naive()).or_else(|| booking_day(booking));
        (day, &booking.total_cost)
    });
    let printing = snapshot
        .printing_orders
        .iter()
        .map(|order| (order.created_at.map(|at| at.date_naive()), &order.cost));
    let cafeteria = snapshot
        .cafeteria_orders
        .iter()
        .map(|order| (order.created_at.map(|at| at.date_naive()), &order.total));
    let courses = snapshot
        .course_enrollments
        .iter()
        .map(|enrollment| (enrollment.created_at.map(|at| at.date_naive()), &enrollment.cost));

    let by_source = RevenueBySource {
        bookings: sum(bookings.clone()),
        printing: sum(printing.clone()),
        cafeteria: sum(cafeteria.clone()),
        courses: sum(courses.clone()),
    };

    let mut monthly_trend: BTreeMap<String, BigDecimal> = BTreeMap::new();
    for (day, amount) in bookings.chain(printing).chain(cafeteria).chain(courses) {
        if let Some(day) = day {
            let entry = monthly_trend.entry(month_key(day)).or_insert_with(BigDecimal::zero);
            *entry = money::round(&(&*entry + amount));
        }
    }

    Revenue {
        total: money::round(
            &(&by_source.bookings + &by_source.printing + &by_source.cafeteria + &by_source.courses),
        ),
        by_source,
        monthly_trend,
    }
}

/// The latest bookings, printing orders and enrollments, newest first.
pub fn recent_activity(snapshot: &Snapshot, limit: usize) -> Vec<Activity> {
    let mut activity: Vec<Activity> = Vec::new();
    for booking in &snapshot.bookings {
        if let Some(created_at) = booking.created_at {
            activity.push(Activity {
                kind: "booking",
                title: format!("Room booking - {}", booking.room_description),
                user_id: booking.user_id.clone(),
                created_at,
            });
        }
    }
    for order in &snapshot.printing_orders {
        if let Some(created_at) = order.created_at {
            activity.push(Activity {
                kind: "printing",
                title: format!("Printing order - {} files", order.files.len()),
                user_id: order.user_id.clone(),
                created_at,
            });
        }
    }
    for enrollment in &snapshot.course_enrollments {
        if let Some(created_at) = enrollment.created_at {
            activity.push(Activity {
                kind: "course",
                title: format!("Course enrollment - {}", enrollment.course_title),
                user_id: enrollment.user_id.clone(),
                created_at,
            });
        }
    }
    activity.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    activity.truncate(limit);
    activity
}

pub fn admin_report(repo: &dyn Repository, now: DateTime<Utc>) -> Result<AdminReport, StoreError> {
    let snapshot = Snapshot::load(repo)?;
    Ok(AdminReport {
        stats: dashboard_stats(&snapshot, now.date_naive()),
        revenue: revenue(&snapshot),
        recent_activity: recent_activity(&snapshot, RECENT_ACTIVITY),
        backend: repo.backend(),
        storage: Collection::ALL
            .into_iter()
            .map(|collection| repo.stats(collection))
            .collect::<Result<_, _>>()?,
    })
}
