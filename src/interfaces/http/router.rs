//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    EntitlementResolver, FeeCalculator, IdentityService, MeteredFeeService, QuotaManager,
};
use crate::config::{AppConfig, CorsSection};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, fees, health, metrics, request_id::request_id_middleware, usage,
};

/// Application services shared by every handler
#[derive(Clone)]
pub struct AppServices {
    pub identity: Arc<IdentityService>,
    pub quota: Arc<QuotaManager>,
    pub calculator: Arc<FeeCalculator>,
    pub metered_fees: Arc<MeteredFeeService>,
    pub jwt_config: JwtConfig,
}

impl AppServices {
    /// Wire the services over one repository provider
    pub fn new(repos: Arc<dyn RepositoryProvider>, config: &AppConfig) -> Self {
        let jwt_config = config.jwt_config();
        let resolver = Arc::new(EntitlementResolver::new(
            Arc::clone(&repos),
            config.quota.unlimited_product.clone(),
        ));
        let quota = Arc::new(QuotaManager::new(
            Arc::clone(&repos),
            Arc::clone(&resolver),
            config.quota_policy(),
        ));
        let calculator = Arc::new(FeeCalculator::new(config.fee_schedule()));
        let metered_fees = Arc::new(MeteredFeeService::new(
            Arc::clone(&quota),
            Arc::clone(&calculator),
        ));
        let identity = Arc::new(IdentityService::new(
            repos,
            resolver,
            Arc::clone(&quota),
            jwt_config.clone(),
        ));

        Self {
            identity,
            quota,
            calculator,
            metered_fees,
            jwt_config,
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::service_info,
        health::health_check,
        metrics::handlers::prometheus_metrics,
        // Auth
        auth::register,
        auth::login,
        auth::get_current_user,
        auth::get_user,
        // Fees
        fees::calculate_fees,
        fees::fees_info,
        fees::calculate_metered_fees,
        // Usage
        usage::get_usage,
        usage::increment_usage,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::ServiceInfo,
            health::HealthResponse,
            health::ComponentHealth,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::UserInfoResponse,
            fees::FeeCalculationRequest,
            fees::OffsiteAdsTierParam,
            fees::FeeLines,
            fees::FeeCalculationResponse,
            fees::MeteredFeeResponse,
            fees::FeeRateInfo,
            fees::FeeInfoResponse,
            usage::QuotaStatusResponse,
            usage::UsageIncrementResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service banner, health check, metrics"),
        (name = "Authentication", description = "Registration, login, customer profile"),
        (name = "Fees", description = "Marketplace fee and margin calculator"),
        (name = "Usage", description = "Free-tier usage quota"),
    ),
    info(
        title = "Seller Dashboard API",
        version = "1.0.0",
        description = "Fee calculator and usage quota service for marketplace sellers",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn cors_layer(cors: &CorsSection) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE];

    if cors.allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(methods)
        .allow_headers(headers)
}

/// Create the API router with all routes
pub fn create_api_router(
    services: AppServices,
    db: Option<DatabaseConnection>,
    metrics_handle: PrometheusHandle,
    config: &AppConfig,
) -> Router {
    let auth_state = AuthState {
        jwt_config: services.jwt_config.clone(),
    };

    let auth_handler_state = auth::AuthHandlerState {
        identity: Arc::clone(&services.identity),
    };
    let fees_state = fees::FeesHandlerState {
        calculator: Arc::clone(&services.calculator),
        metered: Arc::clone(&services.metered_fees),
    };
    let usage_state = usage::UsageHandlerState {
        quota: Arc::clone(&services.quota),
    };
    let health_state = health::HealthState {
        db,
        environment: config.server.environment.clone(),
        docs_enabled: config.server.docs_enabled(),
        started_at: Arc::new(Instant::now()),
    };

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .with_state(auth_handler_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::get_current_user))
        .route("/api/v1/auth/users/{user_id}", get(auth::get_user))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_handler_state);

    // Fee calculator (public)
    let fee_routes = Router::new()
        .route("/api/v1/calculate-fees", post(fees::calculate_fees))
        .route("/api/v1/fees/info", get(fees::fees_info))
        .with_state(fees_state.clone());

    // Metered calculation (protected)
    let metered_routes = Router::new()
        .route("/api/v1/analyses/fees", post(fees::calculate_metered_fees))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(fees_state);

    // Usage quota (protected)
    let usage_routes = Router::new()
        .route("/api/v1/usage", get(usage::get_usage))
        .route("/api/v1/usage/increment", post(usage::increment_usage))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(usage_state);

    let health_routes = Router::new()
        .route("/", get(health::service_info))
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: metrics_handle,
        });

    let mut router = Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(auth_routes)
        .merge(auth_protected_routes)
        .merge(fee_routes)
        .merge(metered_routes)
        .merge(usage_routes);

    if config.server.docs_enabled() {
        router = router
            .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors))
}

/// Per-client-IP rate limiting; `0` requests per minute leaves the router as is.
///
/// The limiter keys on the peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn with_rate_limit(router: Router, requests_per_minute: u32) -> Router {
    if requests_per_minute == 0 {
        return router;
    }

    let period_ms = (60_000 / u64::from(requests_per_minute)).max(1);
    let Some(config) = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(requests_per_minute)
        .finish()
    else {
        warn!(requests_per_minute, "Invalid rate limit configuration, limiter disabled");
        return router;
    };

    router.layer(GovernorLayer::new(Arc::new(config)))
}
