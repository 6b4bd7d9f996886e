use super::http_auth::{AdminUser, AuthUser};
use super::http_errors::{map_auth_error, map_service_error, map_tool_run_error};
use super::http_parse::{parse_access_type, parse_role, parse_tool_id};
use super::http_types::*;
use super::state::AppState;
use crate::domain::Role;
use crate::tools::catalogue;
use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;
use validator::Validate;

const MAX_PAGINATION_LIMIT: i64 = 1000;

type JsonReply = (StatusCode, Json<serde_json::Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/tools", get(list_tools))
        .route("/tools/:tool_id/access", get(get_tool_access))
        .route("/tools/:tool_id/run", post(run_tool))
        .route("/me/usage", get(my_usage))
        .route("/me/subscription", get(my_subscription))
        .route("/plans", get(list_plans))
        .route("/admin/users", post(create_user).get(list_users))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/users/:id/role", put(update_user_role))
        .route("/admin/users/:id/subscriptions", get(list_user_subscriptions))
        .route("/admin/plans", post(create_plan))
        .route("/admin/plans/:id", put(update_plan).delete(delete_plan))
        .route("/admin/plans/:id/tools", get(list_plan_tools))
        .route(
            "/admin/plans/:id/tools/:tool_id",
            put(set_plan_tool).delete(remove_plan_tool),
        )
        .route("/admin/subscriptions", post(create_subscription))
        .route("/admin/subscriptions/:id/cancel", post(cancel_subscription))
        .route("/admin/usage/:user_id/:tool_id/reset", post(reset_usage))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn reply<T: Serialize>(status: StatusCode, body: T) -> JsonReply {
    (status, Json(serde_json::json!(body)))
}

fn failure((status, body): (StatusCode, serde_json::Value)) -> JsonReply {
    (status, Json(body))
}

fn bad_request(message: impl Into<String>) -> JsonReply {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

fn unknown_tool(tool_id: &str) -> JsonReply {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("Unknown tool: {}", tool_id) })),
    )
}

fn invalid_request(errors: validator::ValidationErrors) -> JsonReply {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "Invalid request",
            "details": errors.to_string(),
        })),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        login,
        list_tools,
        get_tool_access,
        run_tool,
        my_usage,
        my_subscription,
        list_plans,
        create_user,
        list_users,
        update_user_role,
        delete_user,
        list_user_subscriptions,
        create_plan,
        update_plan,
        delete_plan,
        list_plan_tools,
        set_plan_tool,
        remove_plan_tool,
        create_subscription,
        cancel_subscription,
        reset_usage,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            UpdateRoleRequest,
            UserResponse,
            PlanRequest,
            PlanResponse,
            PlanToolRequest,
            PlanToolResponse,
            SubscribeRequest,
            SubscriptionResponse,
            UsageResponse,
            AccessResponse,
            ToolInfoResponse,
            RunToolRequest,
            RunToolResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Credential login"),
        (name = "Tools", description = "Tool catalogue, access checks and execution"),
        (name = "Me", description = "The caller's own usage and subscription"),
        (name = "Plans", description = "Public plan listing"),
        (name = "Admin", description = "User, plan, override and subscription management"),
    ),
    info(
        title = "Toolhub API",
        version = "0.1.0",
        description = "Single-purpose tools behind plan-based access control and usage metering",
        license(name = "MIT")
    )
)]
struct ApiDoc;

/// Health check endpoint
///
/// Verifies database connectivity and returns service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed: DB connectivity issue");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    error: Some("Database connectivity failed".to_string()),
                }),
            )
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, description = "Malformed request", body = Object),
        (status = 401, description = "Invalid email or password", body = Object)
    )
)]
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return invalid_request(e);
    }

    match state.auth.login(&req.email, &req.password).await {
        Ok(outcome) => reply(
            StatusCode::OK,
            LoginResponse {
                token: outcome.token,
                user: outcome.user.into(),
            },
        ),
        Err(e) => {
            info!(error = %e, "Login failed");
            failure(map_auth_error(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/tools",
    tag = "Tools",
    responses((status = 200, description = "Every available tool", body = [ToolInfoResponse]))
)]
async fn list_tools() -> impl IntoResponse {
    let tools: Vec<ToolInfoResponse> = catalogue().into_iter().map(Into::into).collect();
    Json(tools)
}

#[utoipa::path(
    get,
    path = "/tools/{tool_id}/access",
    tag = "Tools",
    params(("tool_id" = String, Path, description = "Tool id, e.g. json-formatter")),
    responses(
        (status = 200, description = "Caller's access to the tool", body = AccessResponse),
        (status = 401, description = "Missing or invalid session token", body = Object),
        (status = 404, description = "Unknown tool", body = Object)
    )
)]
async fn get_tool_access(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(tool_id): Path<String>,
) -> impl IntoResponse {
    let Some(tool) = parse_tool_id(&tool_id) else {
        return unknown_tool(&tool_id);
    };

    match state
        .plan_tools
        .get_tool_access_info(caller.user_id, &tool.to_string())
        .await
    {
        Ok(info) => reply(StatusCode::OK, AccessResponse::from(info)),
        Err(e) => {
            error!(error = %e, user_id = %caller.user_id, "Failed to resolve tool access");
            failure(map_service_error(&e, "Failed to resolve tool access"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/tools/{tool_id}/run",
    tag = "Tools",
    params(("tool_id" = String, Path, description = "Tool id, e.g. json-formatter")),
    request_body = RunToolRequest,
    responses(
        (status = 200, description = "Tool output and updated access", body = RunToolResponse),
        (status = 400, description = "Invalid tool input", body = Object),
        (status = 401, description = "Missing or invalid session token", body = Object),
        (status = 403, description = "Plan does not allow this tool or its allowance is used up", body = Object),
        (status = 404, description = "Unknown tool", body = Object)
    )
)]
async fn run_tool(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(tool_id): Path<String>,
    Json(req): Json<RunToolRequest>,
) -> impl IntoResponse {
    let Some(tool) = parse_tool_id(&tool_id) else {
        return unknown_tool(&tool_id);
    };

    match state.runner.run(caller.user_id, tool, req.input).await {
        Ok(run) => reply(StatusCode::OK, RunToolResponse::from(run)),
        Err(e) => failure(map_tool_run_error(&e)),
    }
}

#[utoipa::path(
    get,
    path = "/me/usage",
    tag = "Me",
    responses(
        (status = 200, description = "Usage counters of the caller", body = [UsageResponse]),
        (status = 401, description = "Missing or invalid session token", body = Object)
    )
)]
async fn my_usage(State(state): State<AppState>, caller: AuthUser) -> impl IntoResponse {
    match state.usage.list_usage(caller.user_id).await {
        Ok(usages) => {
            let body: Vec<UsageResponse> = usages.into_iter().map(Into::into).collect();
            reply(StatusCode::OK, body)
        }
        Err(e) => {
            error!(error = %e, user_id = %caller.user_id, "Failed to list usage");
            failure(map_service_error(&e, "Failed to list usage"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/me/subscription",
    tag = "Me",
    responses(
        (status = 200, description = "Subscription and plan currently in force, or null", body = Object),
        (status = 401, description = "Missing or invalid session token", body = Object)
    )
)]
async fn my_subscription(State(state): State<AppState>, caller: AuthUser) -> impl IntoResponse {
    match state.subscriptions.get_active_subscription(caller.user_id).await {
        Ok(Some(active)) => reply(
            StatusCode::OK,
            serde_json::json!({
                "subscription": SubscriptionResponse::from(active.subscription),
                "plan": PlanResponse::from(active.plan),
            }),
        ),
        Ok(None) => reply(StatusCode::OK, serde_json::Value::Null),
        Err(e) => {
            error!(error = %e, user_id = %caller.user_id, "Failed to resolve subscription");
            failure(map_service_error(&e, "Failed to resolve subscription"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/plans",
    tag = "Plans",
    responses(
        (status = 200, description = "Plans, highest priority first", body = [PlanResponse]),
        (status = 500, description = "Failed to list plans", body = Object)
    )
)]
async fn list_plans(State(state): State<AppState>) -> impl IntoResponse {
    match state.plans.list_plans().await {
        Ok(plans) => {
            let body: Vec<PlanResponse> = plans.into_iter().map(Into::into).collect();
            reply(StatusCode::OK, body)
        }
        Err(e) => {
            error!(error = %e, "Failed to list plans");
            failure(map_service_error(&e, "Failed to list plans"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Object),
        (status = 403, description = "Admin role required", body = Object),
        (status = 409, description = "Email already registered", body = Object)
    )
)]
async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return invalid_request(e);
    }

    let role = match req.role.as_deref() {
        None => Role::User,
        Some(raw) => match parse_role(raw) {
            Some(role) => role,
            None => return bad_request(format!("Invalid role: {}", raw)),
        },
    };

    match state
        .users
        .create_user(&req.email, req.name, req.password.as_deref(), role)
        .await
    {
        Ok(user) => reply(StatusCode::CREATED, UserResponse::from(user)),
        Err(e) => {
            error!(error = %e, "Failed to create user");
            failure(map_service_error(&e, "Failed to create user"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    params(PaginationParams),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 403, description = "Admin role required", body = Object)
    )
)]
async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let limit = params.limit.clamp(1, MAX_PAGINATION_LIMIT);
    let offset = params.offset.max(0);

    match state.users.list_users(limit, offset).await {
        Ok(users) => {
            let body: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
            reply(StatusCode::OK, body)
        }
        Err(e) => {
            error!(error = %e, "Failed to list users");
            failure(map_service_error(&e, "Failed to list users"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Invalid role", body = Object),
        (status = 404, description = "User not found", body = Object)
    )
)]
async fn update_user_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> impl IntoResponse {
    let Some(role) = parse_role(&req.role) else {
        return bad_request(format!("Invalid role: {}", req.role));
    };

    match state.users.update_role(id, role).await {
        Ok(user) => reply(StatusCode::OK, UserResponse::from(user)),
        Err(e) => {
            error!(error = %e, user_id = %id, "Failed to update role");
            failure(map_service_error(&e, "Failed to update role"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Admins cannot delete themselves", body = Object),
        (status = 404, description = "User not found", body = Object)
    )
)]
async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Response {
    if admin.user_id == id {
        return bad_request("Admins cannot delete their own account").into_response();
    }

    match state.users.delete_user(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, user_id = %id, "Failed to delete user");
            failure(map_service_error(&e, "Failed to delete user")).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}/subscriptions",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "Every subscription of the user", body = [SubscriptionResponse]))
)]
async fn list_user_subscriptions(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.subscriptions.list_for_user(id).await {
        Ok(subs) => {
            let body: Vec<SubscriptionResponse> = subs.into_iter().map(Into::into).collect();
            reply(StatusCode::OK, body)
        }
        Err(e) => {
            error!(error = %e, user_id = %id, "Failed to list subscriptions");
            failure(map_service_error(&e, "Failed to list subscriptions"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/plans",
    tag = "Admin",
    request_body = PlanRequest,
    responses(
        (status = 201, description = "Plan created", body = PlanResponse),
        (status = 400, description = "Invalid plan", body = Object),
        (status = 409, description = "Plan name taken", body = Object)
    )
)]
async fn create_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<PlanRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return invalid_request(e);
    }
    let draft = match req.into_draft() {
        Ok(d) => d,
        Err(msg) => return bad_request(msg),
    };

    match state.plans.create_plan(draft).await {
        Ok(plan) => reply(StatusCode::CREATED, PlanResponse::from(plan)),
        Err(e) => {
            error!(error = %e, "Failed to create plan");
            failure(map_service_error(&e, "Failed to create plan"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/admin/plans/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Plan ID")),
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Plan updated", body = PlanResponse),
        (status = 400, description = "Invalid plan", body = Object),
        (status = 404, description = "Plan not found", body = Object)
    )
)]
async fn update_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PlanRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return invalid_request(e);
    }
    let draft = match req.into_draft() {
        Ok(d) => d,
        Err(msg) => return bad_request(msg),
    };

    match state.plans.update_plan(id, draft).await {
        Ok(plan) => reply(StatusCode::OK, PlanResponse::from(plan)),
        Err(e) => {
            error!(error = %e, plan_id = %id, "Failed to update plan");
            failure(map_service_error(&e, "Failed to update plan"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/admin/plans/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses(
        (status = 204, description = "Plan deleted with its overrides and subscriptions"),
        (status = 404, description = "Plan not found", body = Object)
    )
)]
async fn delete_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Response {
    match state.plans.delete_plan(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, plan_id = %id, "Failed to delete plan");
            failure(map_service_error(&e, "Failed to delete plan")).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/plans/{id}/tools",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses((status = 200, description = "Tool overrides of the plan", body = [PlanToolResponse]))
)]
async fn list_plan_tools(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.plan_tools.list_plan_tools(id).await {
        Ok(tools) => {
            let body: Vec<PlanToolResponse> = tools.into_iter().map(Into::into).collect();
            reply(StatusCode::OK, body)
        }
        Err(e) => {
            error!(error = %e, plan_id = %id, "Failed to list plan tools");
            failure(map_service_error(&e, "Failed to list plan tools"))
        }
    }
}

#[utoipa::path(
    put,
    path = "/admin/plans/{id}/tools/{tool_id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Plan ID"),
        ("tool_id" = String, Path, description = "Tool id")
    ),
    request_body = PlanToolRequest,
    responses(
        (status = 200, description = "Override stored", body = PlanToolResponse),
        (status = 400, description = "Invalid override", body = Object),
        (status = 404, description = "Plan not found", body = Object)
    )
)]
async fn set_plan_tool(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((plan_id, tool_id)): Path<(Uuid, String)>,
    Json(req): Json<PlanToolRequest>,
) -> impl IntoResponse {
    let Some(access_type) = parse_access_type(&req.access_type) else {
        return bad_request(format!("Invalid access_type: {}", req.access_type));
    };
    let features = req.features.unwrap_or_else(|| serde_json::json!({}));

    match state
        .plan_tools
        .set_plan_tool(plan_id, &tool_id, access_type, req.max_usage, features)
        .await
    {
        Ok(tool) => reply(StatusCode::OK, PlanToolResponse::from(tool)),
        Err(e) => {
            error!(error = %e, plan_id = %plan_id, tool_id = %tool_id, "Failed to set plan tool");
            failure(map_service_error(&e, "Failed to set plan tool"))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/admin/plans/{id}/tools/{tool_id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Plan ID"),
        ("tool_id" = String, Path, description = "Tool id")
    ),
    responses(
        (status = 204, description = "Override removed"),
        (status = 404, description = "No such override", body = Object)
    )
)]
async fn remove_plan_tool(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((plan_id, tool_id)): Path<(Uuid, String)>,
) -> Response {
    match state.plan_tools.remove_plan_tool(plan_id, &tool_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, plan_id = %plan_id, tool_id = %tool_id, "Failed to remove plan tool");
            failure(map_service_error(&e, "Failed to remove plan tool")).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/subscriptions",
    tag = "Admin",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "End date in the past", body = Object),
        (status = 404, description = "User or plan not found", body = Object)
    )
)]
async fn create_subscription(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<SubscribeRequest>,
) -> impl IntoResponse {
    match state
        .subscriptions
        .subscribe(req.user_id, req.plan_id, req.ends_at)
        .await
    {
        Ok(sub) => reply(StatusCode::CREATED, SubscriptionResponse::from(sub)),
        Err(e) => {
            error!(error = %e, user_id = %req.user_id, "Failed to create subscription");
            failure(map_service_error(&e, "Failed to create subscription"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/subscriptions/{id}/cancel",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription cancelled", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = Object)
    )
)]
async fn cancel_subscription(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.subscriptions.cancel(id).await {
        Ok(sub) => reply(StatusCode::OK, SubscriptionResponse::from(sub)),
        Err(e) => {
            error!(error = %e, subscription_id = %id, "Failed to cancel subscription");
            failure(map_service_error(&e, "Failed to cancel subscription"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/usage/{user_id}/{tool_id}/reset",
    tag = "Admin",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("tool_id" = String, Path, description = "Tool id")
    ),
    responses(
        (status = 200, description = "Counter reset to zero", body = UsageResponse),
        (status = 404, description = "Unknown tool")
    )
)]
async fn reset_usage(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((user_id, tool_id)): Path<(Uuid, String)>,
) -> impl IntoResponse {
    if parse_tool_id(&tool_id).is_none() {
        return unknown_tool(&tool_id);
    }

    if let Err(e) = state.usage.reset_usage(user_id, &tool_id).await {
        error!(error = %e, user_id = %user_id, tool_id = %tool_id, "Failed to reset usage");
        return failure(map_service_error(&e, "Failed to reset usage"));
    }

    match state.usage.get_usage(user_id, &tool_id).await {
        Ok(usage) => reply(StatusCode::OK, UsageResponse::from(usage)),
        Err(e) => failure(map_service_error(&e, "Failed to reset usage")),
    }
}
