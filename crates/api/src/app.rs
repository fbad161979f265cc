use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    auth_rate_limit_middleware, metrics_handler, metrics_middleware, security_headers_middleware,
    trace_id, AuthRateLimiter,
};
use crate::routes::{admin, auth, content, health, payment, requests, users};
use crate::services::cookies::CookieHelper;
use crate::services::SettingsService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Validates session tokens
    pub jwt: Arc<JwtConfig>,
    /// Cached request limit and other runtime settings
    pub settings: SettingsService,
    pub cookies: CookieHelper,
    /// `None` when auth rate limiting is disabled
    pub auth_rate_limiter: Option<Arc<AuthRateLimiter>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let jwt = JwtConfig::with_leeway(
            &config.jwt.secret,
            config.jwt.token_expiry_secs(),
            config.jwt.leeway_secs,
        )?;
        let cookies = CookieHelper::new(
            config.security.secure_cookies,
            config.jwt.token_expiry_secs(),
        );
        let auth_rate_limiter =
            AuthRateLimiter::new(config.security.auth_rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            settings: SettingsService::new(pool.clone()),
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            cookies,
            auth_rate_limiter,
        })
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let state = AppState::new(config, pool)?;
    Ok(create_router(state))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Credentialed requests need explicit origins, methods and headers
        use axum::http::{header, Method};
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    };

    // Credential endpoints, limited per client IP
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/admin-login", post(auth::admin_login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/request-otp", post(auth::request_otp))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_rate_limit_middleware,
        ));

    // Session routes; handlers authenticate through the AuthUser extractor
    let member_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/requests", post(requests::create_request))
        .route("/api/requests/limit-status", get(requests::limit_status))
        .route("/api/requests/my", get(requests::my_requests))
        .route("/api/users/dashboard", get(users::dashboard))
        .route("/api/users/request-delete", post(users::request_delete))
        .route("/api/users/favorite-genre", put(users::set_favorite_genre))
        .route("/api/users/recommendations", get(users::recommendations))
        .route(
            "/api/users/watchlist",
            get(users::watchlist).post(users::add_to_watchlist),
        )
        .route(
            "/api/users/watchlist/:content_id",
            delete(users::remove_from_watchlist),
        )
        .route("/api/content", get(content::list_content))
        .route("/api/content/:id", get(content::get_content))
        .route("/api/payment/plans", get(payment::plans))
        .route("/api/payment/subscribe", post(payment::subscribe));

    // Admin routes; handlers require the AdminUser extractor
    let admin_routes = Router::new()
        .route("/api/admin/requests", get(admin::list_requests))
        .route("/api/admin/requests/:id", put(admin::update_request_status))
        .route("/api/admin/settings", get(admin::get_settings))
        .route(
            "/api/admin/settings/request-limit",
            put(admin::update_request_limit),
        )
        .route(
            "/api/admin/subscriptions",
            get(admin::list_subscriptions).post(admin::grant_subscription),
        )
        .route(
            "/api/admin/subscriptions/:user_id",
            put(admin::update_subscription),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id", delete(admin::delete_user))
        .route(
            "/api/admin/content",
            get(admin::list_content).post(admin::create_content),
        )
        .route(
            "/api/admin/content/:id",
            put(admin::update_content).delete(admin::delete_content),
        )
        .route("/api/admin/logins", get(admin::list_logins));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/content/categories", get(content::categories))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(member_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
