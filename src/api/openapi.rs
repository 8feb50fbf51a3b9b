use utoipa::{
    Modify, OpenApi,
    openapi::{
        Components,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};

use crate::{
    api::models::{ConvertRequest, ConvertResponse, CreateGroupRequest, ErrorResponse, LoginRequest, RegisterRequest},
    auth::{guard::AuthStatus, jwt::SessionPayload},
    config::DEFAULT_COOKIE_NAME,
    core::models::{
        expense::{Expense, ExpenseShare, ExpenseUpdate, NewExpense},
        group::{ExpenseView, Group, GroupDetail, GroupMember, LeaveOutcome, MemberView, UserWithGroups},
        user::{Role, UserSummary},
    },
    infrastructure::currency::ExchangeRates,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register,
        super::handlers::login,
        super::handlers::logout,
        super::handlers::session_status,
        super::handlers::current_user,
        super::handlers::create_group,
        super::handlers::get_group,
        super::handlers::join_group,
        super::handlers::leave_group,
        super::handlers::create_expense,
        super::handlers::update_expense,
        super::handlers::delete_expense,
        super::handlers::admin_users,
        super::handlers::admin_groups,
        super::handlers::admin_memberships,
        super::handlers::admin_expenses,
        super::handlers::admin_expense_shares,
        super::handlers::exchange_rates,
        super::handlers::convert
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        CreateGroupRequest,
        ConvertRequest,
        ConvertResponse,
        ErrorResponse,
        AuthStatus,
        SessionPayload,
        Role,
        UserSummary,
        UserWithGroups,
        Group,
        GroupMember,
        GroupDetail,
        MemberView,
        ExpenseView,
        LeaveOutcome,
        Expense,
        ExpenseShare,
        NewExpense,
        ExpenseUpdate,
        ExchangeRates
    )),
    modifiers(&SessionCookieAuth),
    tags(
        (name = "auth", description = "Registration, login and session status"),
        (name = "groups", description = "Groups and memberships"),
        (name = "expenses", description = "Expenses paid inside a group"),
        (name = "admin", description = "Admin-only listings"),
        (name = "currency", description = "Exchange rates")
    ),
    info(
        title = "FreeWise API",
        version = "0.1.0",
        description = "Expense splitting for small groups. Every JSON response uses the envelope `{ success, data, error }`."
    )
)]
pub struct ApiDoc;

/// Declares the `session` scheme referenced by protected paths.
struct SessionCookieAuth;

impl Modify for SessionCookieAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::default);
        components.add_security_scheme(
            "session",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(DEFAULT_COOKIE_NAME))),
        );
    }
}
