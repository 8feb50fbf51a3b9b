use crate::{
    api::{SharedState, models::*},
    auth::guard::{AuthStatus, Session},
    core::{
        errors::FreewiseError,
        models::{
            expense::{Expense, ExpenseShare, ExpenseUpdate, NewExpense},
            group::{Group, GroupDetail, GroupMember, LeaveOutcome, UserWithGroups},
            user::UserSummary,
        },
        services::validate_currency,
    },
    infrastructure::currency::{ExchangeRates, convert_amount},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::info;

// Define API routes
pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session_status))
        .route("/me", get(current_user))
        .route("/groups", post(create_group))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/join", post(join_group))
        .route("/groups/{group_id}/leave", post(leave_group))
        .route("/expenses", post(create_expense))
        .route("/expenses/{expense_id}", put(update_expense).delete(delete_expense))
        .route("/admin/users", get(admin_users))
        .route("/admin/groups", get(admin_groups))
        .route("/admin/memberships", get(admin_memberships))
        .route("/admin/expenses", get(admin_expenses))
        .route("/admin/expense-shares", get(admin_expense_shares))
        .route("/exchange-rates/{base}", get(exchange_rates))
        .route("/exchange-rates/convert", post(convert))
}

fn cookie_error(err: axum::http::header::InvalidHeaderValue) -> ApiError {
    ApiError(FreewiseError::InternalServerError(format!("cookie header: {}", err)))
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, no session issued", body = Envelope<UserSummary>),
        (status = 400, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Envelope<UserSummary>, ApiError> {
    let user = state.service.register(&req.username, &req.password).await?;
    Ok(Envelope::ok(user))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = Envelope<UserSummary>),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
async fn login(State(state): State<SharedState>, Json(req): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.service.login(&req.username, &req.password).await?;
    let cookie = state.cookie.create(&outcome.session).map_err(cookie_error)?;
    Ok(([(SET_COOKIE, cookie)], Envelope::ok(outcome.user)))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Session cookie cleared; envelope with null data"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
async fn logout(State(state): State<SharedState>, session: Session) -> Result<impl IntoResponse, ApiError> {
    let cookie = state.cookie.destroy().map_err(cookie_error)?;
    if let Ok(payload) = session.verify() {
        info!(user_id = %payload.id, "user logged out");
    }
    Ok(([(SET_COOKIE, cookie)], Envelope::<()>::empty()))
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Outcome of the session check", body = AuthStatus)
    ),
    tag = "auth"
)]
async fn session_status(session: Session) -> Json<AuthStatus> {
    Json(session.status())
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller with their groups", body = Envelope<UserWithGroups>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "groups"
)]
async fn current_user(State(state): State<SharedState>, session: Session) -> Result<Envelope<UserWithGroups>, ApiError> {
    let user = state.service.get_user_with_groups(&session).await?;
    Ok(Envelope::ok(user))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created with the caller as member", body = Envelope<Group>),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "groups"
)]
async fn create_group(
    State(state): State<SharedState>,
    session: Session,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Envelope<Group>, ApiError> {
    let group = state
        .service
        .create_group(&session, &req.name, req.description.as_deref())
        .await?;
    Ok(Envelope::ok(group))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group with members and expenses", body = Envelope<GroupDetail>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "groups"
)]
async fn get_group(
    State(state): State<SharedState>,
    session: Session,
    Path(group_id): Path<String>,
) -> Result<Envelope<GroupDetail>, ApiError> {
    let detail = state.service.get_group(&session, &group_id).await?;
    Ok(Envelope::ok(detail))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/join",
    params(
        ("group_id" = String, Path, description = "ID of the group to join")
    ),
    responses(
        (status = 200, description = "Joined the group", body = Envelope<GroupMember>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "groups"
)]
async fn join_group(
    State(state): State<SharedState>,
    session: Session,
    Path(group_id): Path<String>,
) -> Result<Envelope<GroupMember>, ApiError> {
    let member = state.service.join_group(&session, &group_id).await?;
    Ok(Envelope::ok(member))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/leave",
    params(
        ("group_id" = String, Path, description = "ID of the group to leave")
    ),
    responses(
        (status = 200, description = "Left the group; the group is deleted when nobody remains", body = Envelope<LeaveOutcome>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "groups"
)]
async fn leave_group(
    State(state): State<SharedState>,
    session: Session,
    Path(group_id): Path<String>,
) -> Result<Envelope<LeaveOutcome>, ApiError> {
    let outcome = state.service.leave_group(&session, &group_id).await?;
    Ok(Envelope::ok(outcome))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = NewExpense,
    responses(
        (status = 200, description = "Expense recorded with the caller as payer", body = Envelope<Expense>),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "expenses"
)]
async fn create_expense(
    State(state): State<SharedState>,
    session: Session,
    Json(req): Json<NewExpense>,
) -> Result<Envelope<Expense>, ApiError> {
    let expense = state.service.create_expense(&session, req).await?;
    Ok(Envelope::ok(expense))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{expense_id}",
    params(
        ("expense_id" = String, Path, description = "ID of the expense")
    ),
    request_body = ExpenseUpdate,
    responses(
        (status = 200, description = "Expense updated", body = Envelope<Expense>),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Caller did not pay for the expense", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "expenses"
)]
async fn update_expense(
    State(state): State<SharedState>,
    session: Session,
    Path(expense_id): Path<String>,
    Json(req): Json<ExpenseUpdate>,
) -> Result<Envelope<Expense>, ApiError> {
    let expense = state.service.update_expense(&session, &expense_id, req).await?;
    Ok(Envelope::ok(expense))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{expense_id}",
    params(
        ("expense_id" = String, Path, description = "ID of the expense")
    ),
    responses(
        (status = 200, description = "Expense and its shares deleted", body = Envelope<Expense>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Caller did not pay for the expense", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "expenses"
)]
async fn delete_expense(
    State(state): State<SharedState>,
    session: Session,
    Path(expense_id): Path<String>,
) -> Result<Envelope<Expense>, ApiError> {
    let expense = state.service.delete_expense(&session, &expense_id).await?;
    Ok(Envelope::ok(expense))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users, sorted by username", body = Envelope<Vec<UserSummary>>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "admin"
)]
async fn admin_users(State(state): State<SharedState>, session: Session) -> Result<Envelope<Vec<UserSummary>>, ApiError> {
    Ok(Envelope::ok(state.service.get_all_users(&session).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/groups",
    responses(
        (status = 200, description = "All groups", body = Envelope<Vec<Group>>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "admin"
)]
async fn admin_groups(State(state): State<SharedState>, session: Session) -> Result<Envelope<Vec<Group>>, ApiError> {
    Ok(Envelope::ok(state.service.get_all_groups(&session).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/memberships",
    responses(
        (status = 200, description = "All group memberships", body = Envelope<Vec<GroupMember>>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "admin"
)]
async fn admin_memberships(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Envelope<Vec<GroupMember>>, ApiError> {
    Ok(Envelope::ok(state.service.get_all_group_memberships(&session).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/expenses",
    responses(
        (status = 200, description = "All expenses", body = Envelope<Vec<Expense>>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "admin"
)]
async fn admin_expenses(State(state): State<SharedState>, session: Session) -> Result<Envelope<Vec<Expense>>, ApiError> {
    Ok(Envelope::ok(state.service.get_all_expenses(&session).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/expense-shares",
    responses(
        (status = 200, description = "All expense shares", body = Envelope<Vec<ExpenseShare>>),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "admin"
)]
async fn admin_expense_shares(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Envelope<Vec<ExpenseShare>>, ApiError> {
    Ok(Envelope::ok(state.service.get_all_expense_shares(&session).await?))
}

#[utoipa::path(
    get,
    path = "/api/exchange-rates/{base}",
    params(
        ("base" = String, Path, description = "Base currency code, e.g. EUR")
    ),
    responses(
        (status = 200, description = "Rates relative to the base currency", body = Envelope<ExchangeRates>),
        (status = 400, description = "Not a three-letter currency code", body = ErrorResponse),
        (status = 502, description = "Exchange rate service unavailable", body = ErrorResponse)
    ),
    tag = "currency"
)]
async fn exchange_rates(
    State(state): State<SharedState>,
    Path(base): Path<String>,
) -> Result<Envelope<ExchangeRates>, ApiError> {
    let base = validate_currency(&base)?;
    let rates = state
        .currency
        .exchange_rates(&base)
        .await
        .map_err(FreewiseError::from)?;
    Ok(Envelope::ok(rates))
}

#[utoipa::path(
    post,
    path = "/api/exchange-rates/convert",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Converted amount", body = Envelope<ConvertResponse>),
        (status = 400, description = "Malformed or unknown currency", body = ErrorResponse),
        (status = 502, description = "Exchange rate service unavailable", body = ErrorResponse)
    ),
    tag = "currency"
)]
async fn convert(State(state): State<SharedState>, Json(req): Json<ConvertRequest>) -> Result<Envelope<ConvertResponse>, ApiError> {
    let from = validate_currency(&req.from)?;
    let to = validate_currency(&req.to)?;
    let rates = state
        .currency
        .exchange_rates(&from)
        .await
        .map_err(FreewiseError::from)?;
    let converted = convert_amount(req.amount, &from, &to, &rates.rates).map_err(FreewiseError::from)?;
    Ok(Envelope::ok(ConvertResponse {
        amount: req.amount,
        from,
        to,
        converted,
    }))
}
