use std::sync::Arc;

use actix_request_identifier::RequestId;
use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use bytes::Bytes;
use chrono::Utc;
use prost::Message;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::config::Config;
use crate::courses::{self, COURSES};
use crate::database::Repository;
use crate::error::ServiceError;
use crate::ledger::Ledger;
use crate::orders::{self, BookingRequest, PrintingRequest, Upload};
use crate::pricing::cafeteria::{self, CartLine};
use crate::proto::{
    BookingInput, CafeteriaInput, CoursesData, GenericOutput, HistoryData, LoginInput, MenuData, PrintOptionsData,
    PrintingInput, ProfileInput, ProviderInput, ReceiptData, RegisterInput, SessionData, TopUpInput,
};
use crate::records::{PrintOptions, User};
use crate::responses::{self, error_http_response, ok_http_response, PROTOBUF};
use crate::session::{AuthService, ProfileUpdate, ProviderProfile, Registration, Session, SessionRegistry};
use crate::{money, reports};

/// Shared state handed to every handler.
pub struct AppContext {
    pub repo: Arc<dyn Repository>,
    pub auth: AuthService,
    pub ledger: Ledger,
    pub sessions: SessionRegistry,
    pub config: Config,
}

impl AppContext {
    pub fn new(repo: Arc<dyn Repository>, config: Config) -> Self {
        Self {
            auth: AuthService::new(repo.clone(), config.initial_credit.clone())
                .with_admin_emails(config.admin_emails.clone()),
            ledger: Ledger::new(config.min_top_up.clone()),
            sessions: SessionRegistry::default(),
            repo,
            config,
        }
    }

    /// Runs once at startup, before the server accepts requests.
    pub fn provision_admins(&self) -> Result<usize, ServiceError> {
        self.auth.provision_admins(self.config.admin_password.as_deref())
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register_handler)
        .service(login_handler)
        .service(provider_handler)
        .service(logout_handler)
        .service(me_handler)
        .service(update_profile_handler)
        .service(balance_handler)
        .service(top_up_handler)
        .service(history_handler)
        .service(reconcile_handler)
        .service(booking_quote_handler)
        .service(printing_quote_handler)
        .service(cafeteria_quote_handler)
        .service(menu_handler)
        .service(booking_handler)
        .service(printing_order_handler)
        .service(cafeteria_order_handler)
        .service(orders_handler)
        .service(courses_handler)
        .service(course_handler)
        .service(enroll_handler)
        .service(admin_stats_handler)
        .service(confirm_printing_handler);
}

fn accepts_protobuf(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.contains(PROTOBUF))
}

/// Protobuf when the request says so, JSON otherwise.
fn decode_input<T: Message + Default + DeserializeOwned>(req: &HttpRequest, body: &Bytes) -> Result<T, ServiceError> {
    let is_protobuf = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with(PROTOBUF));
    if is_protobuf {
        T::decode(body.as_ref()).map_err(|_| ServiceError::bad_parameter("body"))
    } else {
        serde_json::from_slice(body).map_err(|_| ServiceError::bad_parameter("body"))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn session_for(ctx: &AppContext, req: &HttpRequest) -> Result<Session, ServiceError> {
    let user_id = bearer_token(req)
        .and_then(|token| ctx.sessions.resolve(token))
        .ok_or(ServiceError::Unauthorized)?;
    Ok(Session::new(ctx.repo.clone(), &user_id))
}

/// Runs repository work on the blocking pool.
async fn blocking<F>(f: F) -> Result<GenericOutput, ServiceError>
where
    F: FnOnce() -> Result<GenericOutput, ServiceError> + Send + 'static,
{
    web::block(f)
        .await
        .unwrap_or_else(|e| Err(ServiceError::Internal(e.to_string())))
}

fn respond(result: Result<GenericOutput, ServiceError>, is_protobuf: bool) -> HttpResponse {
    match result {
        Ok(data) => ok_http_response(data, is_protobuf),
        Err(e) => error_http_response(&e, is_protobuf),
    }
}

fn session_output(ctx: &AppContext, user: &User) -> GenericOutput {
    GenericOutput {
        session: Some(SessionData {
            token: ctx.sessions.issue(&user.id),
            user: Some(responses::user_data(user)),
        }),
        ..Default::default()
    }
}

fn balance_output(session: &Session) -> Result<GenericOutput, ServiceError> {
    let balance = session.credit()?;
    Ok(GenericOutput {
        balance: Some(responses::balance_data(session.user_id(), &balance)),
        ..Default::default()
    })
}

#[post("/auth/register")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn register_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let input: RegisterInput = match decode_input(&req, &body) {
        Ok(input) => input,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let form = Registration {
        name: input.name,
        email: input.email,
        password: input.password,
        confirm_password: input.confirm_password,
    };
    let result = blocking(move || {
        let user = ctx.auth.register(&form)?;
        Ok(session_output(&ctx, &user))
    })
    .await;
    respond(result, is_protobuf)
}

#[post("/auth/login")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn login_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let input: LoginInput = match decode_input(&req, &body) {
        Ok(input) => input,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let user = ctx.auth.login(&input.email, &input.password)?;
        info!(user_id = %user.id, "signed in");
        Ok(session_output(&ctx, &user))
    })
    .await;
    respond(result, is_protobuf)
}

pub const PROVIDER_SECRET_HEADER: &str = "x-provider-secret";

// digests are compared so the check does not reveal where the strings differ
fn trusted_proxy(ctx: &AppContext, req: &HttpRequest) -> bool {
    let expected = match &ctx.config.provider_secret {
        Some(secret) => secret,
        None => return false,
    };
    req.headers()
        .get(PROVIDER_SECRET_HEADER)
        .map_or(false, |value| {
            Sha256::digest(value.as_bytes()) == Sha256::digest(expected.as_bytes())
        })
}

/// Sign-in proxy callback, it has already verified the provider identity.
#[post("/auth/provider")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn provider_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    if !trusted_proxy(&ctx, &req) {
        return error_http_response(&ServiceError::Forbidden, is_protobuf);
    }
    let input: ProviderInput = match decode_input(&req, &body) {
        Ok(input) => input,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let profile = ProviderProfile {
        subject: input.subject,
        name: input.name,
        email: input.email,
        picture: Some(input.picture).filter(|picture| !picture.is_empty()),
    };
    let result = blocking(move || {
        let user = ctx.auth.sign_in_with_provider(&profile)?;
        info!(user_id = %user.id, "signed in via provider");
        Ok(session_output(&ctx, &user))
    })
    .await;
    respond(result, is_protobuf)
}

#[post("/auth/logout")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn logout_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    match bearer_token(&req) {
        Some(token) if ctx.sessions.revoke(token) => ok_http_response(
            GenericOutput {
                signed_out: true,
                ..Default::default()
            },
            is_protobuf,
        ),
        _ => error_http_response(&ServiceError::Unauthorized, is_protobuf),
    }
}

#[get("/me")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn me_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let user = session.current_user()?;
        Ok(GenericOutput {
            user: Some(responses::user_data(&user)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[post("/me")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn update_profile_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let input: ProfileInput = match decode_input(&req, &body) {
        Ok(input) => input,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let update = ProfileUpdate {
        name: input.name,
        phone: input.phone,
        student_id: input.student_id,
    };
    let result = blocking(move || {
        let user = session.update_profile(&update)?;
        Ok(GenericOutput {
            user: Some(responses::user_data(&user)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[get("/balance")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn balance_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    respond(blocking(move || balance_output(&session)).await, is_protobuf)
}

#[post("/wallet/top-up")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn top_up_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let input: TopUpInput = match decode_input(&req, &body) {
        Ok(input) => input,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let req_value = match money::parse_positive(&input.value) {
        Some(value) => value,
        None => return responses::bad_parameter_http_response("value", is_protobuf),
    };
    let result = blocking(move || {
        let receipt = ctx.ledger.top_up(&session, &req_value)?;
        Ok(GenericOutput {
            balance: Some(responses::balance_data(session.user_id(), &receipt.balance)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[get("/wallet/history")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn history_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let entries = ctx.ledger.history(&session)?;
        Ok(GenericOutput {
            history: Some(HistoryData {
                entries: entries.iter().map(responses::ledger_entry_data).collect(),
            }),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[get("/wallet/reconcile")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn reconcile_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let report = ctx.ledger.reconcile(&session)?;
        Ok(GenericOutput {
            reconciliation: Some(responses::reconciliation_data(&report)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

fn booking_request(input: BookingInput) -> BookingRequest {
    BookingRequest {
        room_type: input.room_type,
        date: input.date,
        start_time: input.start_time,
        end_time: input.end_time,
        guests: input.guests,
        special_requirements: input.special_requirements,
    }
}

// unset fields keep their defaults
fn print_options(data: Option<PrintOptionsData>) -> PrintOptions {
    let defaults = PrintOptions::default();
    let data = match data {
        Some(data) => data,
        None => return defaults,
    };
    let or = |value: String, default: String| if value.is_empty() { default } else { value };
    PrintOptions {
        print_type: or(data.print_type, defaults.print_type),
        paper_size: or(data.paper_size, defaults.paper_size),
        print_sides: or(data.print_sides, defaults.print_sides),
        copies: data.copies.max(1),
        binding: or(data.binding, defaults.binding),
        urgency: or(data.urgency, defaults.urgency),
    }
}

fn printing_request(input: PrintingInput) -> PrintingRequest {
    PrintingRequest {
        files: input
            .files
            .into_iter()
            .map(|file| Upload {
                name: file.name,
                size_bytes: file.size_bytes,
                mime_type: file.mime_type,
            })
            .collect(),
        options: print_options(input.options),
    }
}

fn cart_lines(input: CafeteriaInput) -> Vec<CartLine> {
    input
        .items
        .into_iter()
        .map(|line| CartLine {
            item_id: line.item_id,
            quantity: line.quantity,
        })
        .collect()
}

#[post("/quotes/booking")]
#[instrument(skip(req, body), fields(request_id = request_id.as_str()))]
pub async fn booking_quote_handler(request_id: RequestId, req: HttpRequest, body: Bytes) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let result = decode_input::<BookingInput>(&req, &body).and_then(|input| {
        let quote = orders::quote_booking(&booking_request(input))?;
        Ok(GenericOutput {
            booking_quote: Some(responses::booking_quote_data(&quote)),
            ..Default::default()
        })
    });
    respond(result, is_protobuf)
}

#[post("/quotes/printing")]
#[instrument(skip(req, body), fields(request_id = request_id.as_str()))]
pub async fn printing_quote_handler(request_id: RequestId, req: HttpRequest, body: Bytes) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let result = decode_input::<PrintingInput>(&req, &body).and_then(|input| {
        let quote = orders::quote_printing(&printing_request(input))?;
        Ok(GenericOutput {
            printing_quote: Some(responses::printing_quote_data(&quote)),
            ..Default::default()
        })
    });
    respond(result, is_protobuf)
}

#[post("/quotes/cafeteria")]
#[instrument(skip(req, body), fields(request_id = request_id.as_str()))]
pub async fn cafeteria_quote_handler(request_id: RequestId, req: HttpRequest, body: Bytes) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let result = decode_input::<CafeteriaInput>(&req, &body).and_then(|input| {
        let quote = orders::quote_cafeteria(&cart_lines(input))?;
        Ok(GenericOutput {
            cafeteria_quote: Some(responses::cafeteria_quote_data(&quote)),
            ..Default::default()
        })
    });
    respond(result, is_protobuf)
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    category: Option<String>,
}

#[get("/menu")]
#[instrument(skip(req), fields(request_id = request_id.as_str()))]
pub async fn menu_handler(request_id: RequestId, req: HttpRequest, query: web::Query<MenuQuery>) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let category = query.category.as_deref().unwrap_or("all");
    if category != "all" && !cafeteria::CATEGORIES.contains(&category) {
        return responses::bad_parameter_http_response("category", is_protobuf);
    }
    ok_http_response(
        GenericOutput {
            menu: Some(MenuData {
                items: cafeteria::by_category(category).map(responses::menu_item_data).collect(),
            }),
            ..Default::default()
        },
        is_protobuf,
    )
}

#[post("/bookings")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn booking_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let request = match decode_input::<BookingInput>(&req, &body) {
        Ok(input) => booking_request(input),
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let booking = orders::confirm_booking(&ctx.ledger, &session, &request)?;
        let balance = session.credit()?;
        Ok(GenericOutput {
            receipt: Some(ReceiptData {
                booking: Some(responses::booking_data(&booking)),
                balance: Some(responses::balance_data(session.user_id(), &balance)),
                ..Default::default()
            }),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[post("/printing-orders")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn printing_order_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let request = match decode_input::<PrintingInput>(&req, &body) {
        Ok(input) => printing_request(input),
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let order = orders::submit_printing(&ctx.ledger, &session, &request)?;
        let balance = session.credit()?;
        Ok(GenericOutput {
            receipt: Some(ReceiptData {
                printing_order: Some(responses::printing_order_data(&order)),
                balance: Some(responses::balance_data(session.user_id(), &balance)),
                ..Default::default()
            }),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[post("/cafeteria-orders")]
#[instrument(skip(ctx, req, body), fields(request_id = request_id.as_str()))]
pub async fn cafeteria_order_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    body: Bytes,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let items = match decode_input::<CafeteriaInput>(&req, &body) {
        Ok(input) => cart_lines(input),
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let order = orders::checkout_cafeteria(&ctx.ledger, &session, &items)?;
        let balance = session.credit()?;
        Ok(GenericOutput {
            receipt: Some(ReceiptData {
                cafeteria_order: Some(responses::cafeteria_order_data(&order)),
                balance: Some(responses::balance_data(session.user_id(), &balance)),
                ..Default::default()
            }),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[get("/orders")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn orders_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        let orders = orders::list_orders(session.repository(), session.user_id())?;
        Ok(GenericOutput {
            orders: Some(responses::orders_data(&orders)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[get("/courses")]
#[instrument(skip(req), fields(request_id = request_id.as_str()))]
pub async fn courses_handler(request_id: RequestId, req: HttpRequest) -> HttpResponse {
    ok_http_response(
        GenericOutput {
            courses: Some(CoursesData {
                courses: COURSES.iter().map(responses::course_data).collect(),
            }),
            ..Default::default()
        },
        accepts_protobuf(&req),
    )
}

/// Stream details, unknown keys get the generic live session.
#[get("/courses/{course}")]
#[instrument(skip(req), fields(request_id = request_id.as_str()))]
pub async fn course_handler(request_id: RequestId, req: HttpRequest, course: web::Path<String>) -> HttpResponse {
    ok_http_response(
        GenericOutput {
            course: Some(responses::course_data(&courses::stream_info(&course))),
            ..Default::default()
        },
        accepts_protobuf(&req),
    )
}

#[post("/courses/{course}/enroll")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn enroll_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    course: web::Path<String>,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let course = course.into_inner();
    let result = blocking(move || {
        let enrollment = courses::enroll(&session, &course)?;
        Ok(GenericOutput {
            enrollment: Some(responses::enrollment_data(&enrollment)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

fn require_admin(session: &Session) -> Result<(), ServiceError> {
    if session.current_user()?.admin {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

#[get("/admin/stats")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn admin_stats_handler(ctx: web::Data<AppContext>, request_id: RequestId, req: HttpRequest) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let result = blocking(move || {
        require_admin(&session)?;
        let report = reports::admin_report(ctx.repo.as_ref(), Utc::now())?;
        Ok(GenericOutput {
            stats: Some(responses::stats_data(&report)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[post("/admin/printing-orders/{order_id}/confirm")]
#[instrument(skip(ctx, req), fields(request_id = request_id.as_str()))]
pub async fn confirm_printing_handler(
    ctx: web::Data<AppContext>,
    request_id: RequestId,
    req: HttpRequest,
    order_id: web::Path<String>,
) -> HttpResponse {
    let is_protobuf = accepts_protobuf(&req);
    let session = match session_for(&ctx, &req) {
        Ok(session) => session,
        Err(e) => return error_http_response(&e, is_protobuf),
    };
    let order_id = order_id.into_inner();
    let result = blocking(move || {
        require_admin(&session)?;
        let order = orders::mark_printing_confirmed(ctx.repo.as_ref(), &order_id)?;
        Ok(GenericOutput {
            printing_order: Some(responses::printing_order_data(&order)),
            ..Default::default()
        })
    })
    .await;
    respond(result, is_protobuf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::local::LocalStore;
    use crate::proto::CartLineInput;
    use actix_request_identifier::RequestIdentifier;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    const DEAN_PASSWORD: &str = "Deanpass1!";
    const PROXY_SECRET: &str = "proxy-secret";

    fn context() -> AppContext {
        let config = Config {
            admin_emails: vec!["dean@uni.edu".to_string()],
            admin_password: Some(DEAN_PASSWORD.to_string()),
            provider_secret: Some(PROXY_SECRET.to_string()),
            ..Config::default()
        };
        let ctx = AppContext::new(Arc::new(LocalStore::in_memory()), config);
        assert_eq!(ctx.provision_admins().unwrap(), 1);
        ctx
    }

    macro_rules! init_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(RequestIdentifier::with_uuid())
                    .app_data(web::Data::new(context()))
                    .configure(configure),
            )
            .await
        };
    }

    // registers a student and yields the bearer token
    macro_rules! register {
        ($app:expr, $name:expr, $email:expr) => {{
            let req = test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({
                    "name": $name,
                    "email": $email,
                    "password": "Secret1!",
                    "confirmPassword": "Secret1!"
                }))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            body["session"]["token"].as_str().unwrap().to_string()
        }};
    }

    // signs in and yields the bearer token
    macro_rules! login {
        ($app:expr, $email:expr, $password:expr) => {{
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({"email": $email, "password": $password}))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            body["session"]["token"].as_str().unwrap().to_string()
        }};
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_booking_debits_wallet() {
        let app = init_app!();
        let token = register!(app, "Lina", "lina@uni.edu");

        let req = test::TestRequest::get().uri("/balance").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"]["value"], "25.00");
        assert_eq!(body["balance"]["currency"], "JOD");

        let req = test::TestRequest::post()
            .uri("/bookings")
            .insert_header(bearer(&token))
            .set_json(json!({
                "roomType": "solo",
                "date": "2024-03-14",
                "startTime": "09:00",
                "endTime": "17:00",
                "guests": 1
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["receipt"]["booking"]["totalCost"], "10.00");
        assert_eq!(body["receipt"]["booking"]["status"], "confirmed");
        assert_eq!(body["receipt"]["balance"]["value"], "15.00");

        let req = test::TestRequest::get().uri("/wallet/history").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let entries = body["history"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e["type"] == "booking" && e["amount"] == "10.00"));

        let req = test::TestRequest::get().uri("/wallet/reconcile").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reconciliation"]["consistent"], true);
        assert_eq!(body["reconciliation"]["actual"], "15.00");
    }

    #[actix_web::test]
    async fn test_insufficient_credit_is_rejected() {
        let app = init_app!();
        let token = register!(app, "Omar", "omar@uni.edu");
        let req = test::TestRequest::post()
            .uri("/bookings")
            .insert_header(bearer(&token))
            .set_json(json!({
                "roomType": "meeting-large",
                "date": "2024-03-14",
                "startTime": "08:00",
                "endTime": "20:00",
                "guests": 8
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["oneError"]["insufficientCredit"]["needed"], "216.00");
        assert_eq!(body["error"]["oneError"]["insufficientCredit"]["available"], "25.00");

        let req = test::TestRequest::get().uri("/balance").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"]["value"], "25.00");
    }

    #[actix_web::test]
    async fn test_capacity_is_enforced() {
        let app = init_app!();
        let token = register!(app, "Omar", "omar@uni.edu");
        let req = test::TestRequest::post()
            .uri("/bookings")
            .insert_header(bearer(&token))
            .set_json(json!({
                "roomType": "meeting-small",
                "date": "2024-03-14",
                "startTime": "08:00",
                "endTime": "09:00",
                "guests": 9
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["oneError"]["capacity"]["max"], 4);
    }

    #[actix_web::test]
    async fn test_requires_session() {
        let app = init_app!();
        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let token = register!(app, "Lina", "lina@uni.edu");
        let req = test::TestRequest::get().uri("/me").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["email"], "lina@uni.edu");
        assert_eq!(body["user"]["provider"], "email");

        let req = test::TestRequest::post().uri("/auth/logout").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["signedOut"], true);

        let req = test::TestRequest::get().uri("/me").insert_header(bearer(&token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_login_and_profile() {
        let app = init_app!();
        register!(app, "Lina", "lina@uni.edu");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "LINA@uni.edu", "password": "wrong"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["oneError"]["auth"]["code"], "invalid-credentials");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "LINA@uni.edu", "password": "Secret1!"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let token = body["session"]["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/me")
            .insert_header(bearer(&token))
            .set_json(json!({"phone": "+962 791 234567", "studentId": "20231234"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["studentId"], "20231234");
        assert_eq!(body["user"]["name"], "Lina");
    }

    #[actix_web::test]
    async fn test_duplicate_registration() {
        let app = init_app!();
        register!(app, "Lina", "lina@uni.edu");
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Lina",
                "email": "lina@uni.edu",
                "password": "Secret1!",
                "confirmPassword": "Secret1!"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_top_up_validation() {
        let app = init_app!();
        let token = register!(app, "Lina", "lina@uni.edu");
        for value in ["abc", "-5", "4.99"] {
            let req = test::TestRequest::post()
                .uri("/wallet/top-up")
                .insert_header(bearer(&token))
                .set_json(json!({ "value": value }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "value: {value}");
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"]["oneError"]["badParameter"]["name"], "value");
        }
        let req = test::TestRequest::post()
            .uri("/wallet/top-up")
            .insert_header(bearer(&token))
            .set_json(json!({"value": "12.5"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"]["value"], "37.50");
    }

    #[actix_web::test]
    async fn test_cafeteria_quote_over_protobuf() {
        let app = init_app!();
        let input = CafeteriaInput {
            items: vec![
                CartLineInput {
                    item_id: "hd1".to_string(),
                    quantity: 2,
                },
                CartLineInput {
                    item_id: "sn1".to_string(),
                    quantity: 1,
                },
            ],
        };
        let req = test::TestRequest::post()
            .uri("/quotes/cafeteria")
            .insert_header((header::CONTENT_TYPE, PROTOBUF))
            .insert_header((header::ACCEPT, PROTOBUF))
            .set_payload(input.encode_to_vec())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let output = GenericOutput::decode(body.as_ref()).unwrap();
        let quote = output.cafeteria_quote.unwrap();
        assert_eq!(quote.total, "4.50");
        assert_eq!(quote.item_count, 3);
        assert_eq!(quote.lines.len(), 2);
    }

    #[actix_web::test]
    async fn test_quotes() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/quotes/booking")
            .set_json(json!({
                "roomType": "meeting-small",
                "date": "2024-03-14",
                "startTime": "09:00",
                "endTime": "12:00",
                "guests": 3
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["bookingQuote"]["cost"], "24.00");
        assert_eq!(body["bookingQuote"]["duration"], "3h");

        let req = test::TestRequest::post()
            .uri("/quotes/printing")
            .set_json(json!({
                "files": [{"name": "notes.pdf", "sizeBytes": 5242880, "mimeType": "application/pdf"}],
                "options": {"printType": "color"}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["printingQuote"]["totalPages"], 10);
        assert_eq!(body["printingQuote"]["cost"], "5.00");

        let req = test::TestRequest::post()
            .uri("/quotes/booking")
            .set_json(json!({"roomType": "rooftop", "date": "2024-03-14", "startTime": "09:00", "endTime": "10:00"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["oneError"]["badParameter"]["name"], "roomType");
    }

    #[actix_web::test]
    async fn test_menu_and_courses() {
        let app = init_app!();
        let req = test::TestRequest::get().uri("/menu?category=meals").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["menu"]["items"].as_array().unwrap().len(), 6);

        let req = test::TestRequest::get().uri("/menu?category=desserts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/courses/astronomy").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["course"]["title"], "Live Learning Session");

        let token = register!(app, "Lina", "lina@uni.edu");
        let enroll = || {
            test::TestRequest::post()
                .uri("/courses/medical/enroll")
                .insert_header(bearer(&token))
                .to_request()
        };
        let body: Value = test::call_and_read_body_json(&app, enroll()).await;
        assert_eq!(body["enrollment"]["courseTitle"], "Medical Preparation Course");
        let resp = test::call_service(&app, enroll()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get().uri("/orders").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["orders"]["courseEnrollments"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_admin_routes() {
        let app = init_app!();
        let student = register!(app, "Lina", "lina@uni.edu");
        let dean = login!(app, "dean@uni.edu", DEAN_PASSWORD);

        let req = test::TestRequest::post()
            .uri("/printing-orders")
            .insert_header(bearer(&student))
            .set_json(json!({
                "files": [{"name": "notes.pdf", "sizeBytes": 5242880, "mimeType": "application/pdf"}],
                "options": {"printType": "color"}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["receipt"]["printingOrder"]["status"], "pending");
        assert_eq!(body["receipt"]["balance"]["value"], "20.00");
        let order_id = body["receipt"]["printingOrder"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri("/admin/stats").insert_header(bearer(&student)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/admin/stats").insert_header(bearer(&dean)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stats"]["totalUsers"], 2);
        assert_eq!(body["stats"]["printingOrdersToday"], 1);
        assert_eq!(body["stats"]["revenue"]["printing"], "5.00");
        assert_eq!(body["stats"]["backend"], "local");
        let storage = body["stats"]["storage"].as_array().unwrap();
        assert!(storage
            .iter()
            .any(|count| count["collection"] == "printingOrders" && count["total"] == 1));

        let uri = format!("/admin/printing-orders/{order_id}/confirm");
        let req = test::TestRequest::post().uri(&uri).insert_header(bearer(&dean)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["printingOrder"]["status"], "confirmed");

        let req = test::TestRequest::post()
            .uri("/admin/printing-orders/missing/confirm")
            .insert_header(bearer(&dean))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_admin_address_cannot_be_registered() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Not the Dean",
                "email": "Dean@uni.edu",
                "password": "Secret1!",
                "confirmPassword": "Secret1!"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["oneError"]["auth"]["code"], "email-reserved");
        assert!(body["session"].is_null());

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "dean@uni.edu", "password": "Secret1!"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let dean = login!(app, "dean@uni.edu", DEAN_PASSWORD);
        let req = test::TestRequest::get().uri("/me").insert_header(bearer(&dean)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["admin"], true);
    }

    #[actix_web::test]
    async fn test_provider_sign_in_needs_the_proxy_secret() {
        let app = init_app!();
        let profile = json!({
            "subject": "google-42",
            "name": "Omar",
            "email": "omar@gmail.com"
        });
        for secret in [None, Some("guess")] {
            let mut req = test::TestRequest::post().uri("/auth/provider").set_json(&profile);
            if let Some(secret) = secret {
                req = req.insert_header((PROVIDER_SECRET_HEADER, secret));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "secret: {secret:?}");
        }

        let req = test::TestRequest::post()
            .uri("/auth/provider")
            .insert_header((PROVIDER_SECRET_HEADER, PROXY_SECRET))
            .set_json(&profile)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["user"]["provider"], "google");
        assert_ne!(body["session"]["user"]["id"], "google-42");
        let token = body["session"]["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri("/balance").insert_header(bearer(&token)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"]["value"], "25.00");
    }

    #[actix_web::test]
    async fn test_oversized_cafeteria_quantity_is_rejected() {
        let app = init_app!();
        let req = test::TestRequest::post()
            .uri("/quotes/cafeteria")
            .set_json(json!({"items": [
                {"itemId": "hd1", "quantity": u32::MAX},
                {"itemId": "sn1", "quantity": 1}
            ]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["oneError"]["badParameter"]["name"], "items");
    }
}
