//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    AuthService, BookingNotifier, BookingService, ChargerService, DashboardService,
    PaymentService, ReviewService,
};
use crate::domain::RepositoryProvider;
use crate::interfaces::http::common::{ApiResponse, RelayErrorBody};
use crate::interfaces::http::middleware::{auth_middleware, optional_auth_middleware, AuthState};
use crate::interfaces::http::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    auth, bookings, chargers, dashboards, email, health, payments, reviews, stripe_connect, webhooks,
};

/// Everything the HTTP layer calls into
#[derive(Clone)]
pub struct ApiServices {
    pub repos: Arc<dyn RepositoryProvider>,
    /// `sqlite` or `memory`, reported by `/health`
    pub storage_backend: &'static str,
    pub auth: Arc<AuthService>,
    pub chargers: Arc<ChargerService>,
    pub bookings: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
    pub dashboards: Arc<DashboardService>,
    pub payments: Arc<PaymentService>,
    pub notifier: Arc<BookingNotifier>,
    pub started_at: Arc<Instant>,
}

/// Unified state of the `/api/v1/chargers` routes, which also serve the
/// per-charger review list. Handlers extract their own state via `FromRef`.
#[derive(Clone)]
pub struct ChargerUnifiedState {
    pub chargers: Arc<ChargerService>,
    pub bookings: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
}

impl FromRef<ChargerUnifiedState> for chargers::ChargerHandlerState {
    fn from_ref(s: &ChargerUnifiedState) -> Self {
        chargers::ChargerHandlerState {
            chargers: Arc::clone(&s.chargers),
            bookings: Arc::clone(&s.bookings),
        }
    }
}

impl FromRef<ChargerUnifiedState> for reviews::ReviewHandlerState {
    fn from_ref(s: &ChargerUnifiedState) -> Self {
        reviews::ReviewHandlerState {
            reviews: Arc::clone(&s.reviews),
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
        health::health_check,
        // Auth
        auth::signup,
        auth::login,
        auth::get_current_user,
        // Chargers
        chargers::browse_chargers,
        chargers::get_charger,
        chargers::get_availability,
        chargers::get_slots,
        chargers::create_charger,
        chargers::update_charger,
        chargers::set_charger_active,
        chargers::list_my_chargers,
        // Favorites
        chargers::list_favorites,
        chargers::toggle_favorite,
        // Bookings
        bookings::quote,
        bookings::checkout,
        bookings::commit,
        bookings::list_my_bookings,
        bookings::get_booking,
        bookings::cancel_booking,
        // Reviews
        reviews::submit_review,
        reviews::list_charger_reviews,
        // Dashboards
        dashboards::host_dashboard,
        dashboards::platform_dashboard,
        // Relay
        payments::create_payment_intent,
        payments::confirm_payment,
        stripe_connect::oauth_url,
        stripe_connect::oauth_callback,
        stripe_connect::get_account,
        webhooks::stripe_webhook,
        email::send_email,
    ),
    components(
        schemas(
            ApiResponse<String>,
            RelayErrorBody,
            health::HealthResponse,
            health::ComponentHealth,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            chargers::ChargerDto,
            chargers::ChargerListingDto,
            chargers::AvailabilityDto,
            chargers::CreateChargerRequest,
            chargers::UpdateChargerRequest,
            chargers::SetActiveRequest,
            chargers::CreatedChargerResponse,
            chargers::SlotsResponse,
            chargers::FavoriteToggleResponse,
            bookings::BookingDto,
            bookings::CostBreakdownDto,
            bookings::SlotRequest,
            bookings::QuoteResponse,
            bookings::CheckoutResponse,
            bookings::CommitBookingRequest,
            reviews::SubmitReviewRequest,
            reviews::ReviewDto,
            reviews::ChargerReviewsResponse,
            dashboards::BookingCountsDto,
            dashboards::HostDashboardDto,
            dashboards::PlatformDashboardDto,
            payments::CreateIntentBody,
            payments::CreateIntentResponse,
            payments::ConfirmBody,
            payments::ConfirmResponse,
            payments::PaymentIntentDto,
            stripe_connect::OAuthUrlResponse,
            stripe_connect::CallbackBody,
            stripe_connect::ConnectedAccountResponse,
            webhooks::WebhookAck,
            email::SendEmailBody,
            email::SendEmailResponse,
            email::Recipients,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and storage health"),
        (name = "Authentication", description = "Signup, login (JWT) and current user"),
        (name = "Chargers", description = "Browse, detail, availability and listing management"),
        (name = "Favorites", description = "Saved chargers"),
        (name = "Bookings", description = "Quote, checkout, commit and cancel bookings"),
        (name = "Reviews", description = "Ratings of completed bookings"),
        (name = "Dashboards", description = "Host and platform earnings"),
        (name = "Payments", description = "PaymentIntent relay and Stripe webhooks"),
        (name = "Stripe Connect", description = "Host payout account onboarding"),
        (name = "Email", description = "Transactional email relay"),
    ),
    info(
        title = "PlugSpot API",
        version = "1.0.0",
        description = "Peer-to-peer EV charger rental marketplace",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}

/// Create the API router with all routes
pub fn create_api_router(
    services: ApiServices,
    auth_state: AuthState,
    cors_origins: &[String],
    metrics: Option<PrometheusHandle>,
) -> Router {
    // ── Auth ───────────────────────────────────────────────────
    let auth_handler_state = auth::AuthHandlerState {
        auth: services.auth.clone(),
    };
    let auth_public = Router::new()
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .with_state(auth_handler_state.clone());
    let auth_protected = Router::new()
        .route("/api/v1/auth/me", get(auth::get_current_user))
        .layer(middleware::from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(auth_handler_state);

    // ── Chargers + per-charger reviews (reads public) ──────────
    let charger_unified = ChargerUnifiedState {
        chargers: services.chargers.clone(),
        bookings: services.bookings.clone(),
        reviews: services.reviews.clone(),
    };
    let charger_routes = Router::new()
        .route(
            "/api/v1/chargers",
            get(chargers::browse_chargers).post(chargers::create_charger),
        )
        .route("/api/v1/chargers/mine", get(chargers::list_my_chargers))
        .route(
            "/api/v1/chargers/{id}",
            get(chargers::get_charger).put(chargers::update_charger),
        )
        .route("/api/v1/chargers/{id}/active", put(chargers::set_charger_active))
        .route("/api/v1/chargers/{id}/availability", get(chargers::get_availability))
        .route("/api/v1/chargers/{id}/slots", get(chargers::get_slots))
        .route("/api/v1/chargers/{id}/reviews", get(reviews::list_charger_reviews))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            optional_auth_middleware,
        ))
        .with_state(charger_unified);

    let charger_handler_state = chargers::ChargerHandlerState {
        chargers: services.chargers.clone(),
        bookings: services.bookings.clone(),
    };
    let favorite_routes = Router::new()
        .route("/api/v1/favorites", get(chargers::list_favorites))
        .route("/api/v1/favorites/{charger_id}", post(chargers::toggle_favorite))
        .layer(middleware::from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(charger_handler_state);

    // ── Bookings ───────────────────────────────────────────────
    let booking_routes = Router::new()
        .route(
            "/api/v1/bookings",
            get(bookings::list_my_bookings).post(bookings::commit),
        )
        .route("/api/v1/bookings/quote", post(bookings::quote))
        .route("/api/v1/bookings/checkout", post(bookings::checkout))
        .route("/api/v1/bookings/{id}", get(bookings::get_booking))
        .route("/api/v1/bookings/{id}/cancel", post(bookings::cancel_booking))
        .layer(middleware::from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(bookings::BookingHandlerState {
            bookings: services.bookings.clone(),
        });

    // ── Reviews, dashboards ────────────────────────────────────
    let review_routes = Router::new()
        .route("/api/v1/reviews", post(reviews::submit_review))
        .layer(middleware::from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(reviews::ReviewHandlerState {
            reviews: services.reviews.clone(),
        });

    let dashboard_routes = Router::new()
        .route("/api/v1/dashboard/host", get(dashboards::host_dashboard))
        .route("/api/v1/dashboard/platform", get(dashboards::platform_dashboard))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(dashboards::DashboardHandlerState {
            dashboards: services.dashboards.clone(),
        });

    // ── Relay surface (unauthenticated, bare JSON) ─────────────
    let payment_routes = Router::new()
        .route("/api/payments/create-intent", post(payments::create_payment_intent))
        .route("/api/payments/confirm", post(payments::confirm_payment))
        .with_state(payments::PaymentHandlerState {
            payments: services.payments.clone(),
        });

    let connect_routes = Router::new()
        .route("/api/stripe-connect/oauth-url", get(stripe_connect::oauth_url))
        .route("/api/stripe-connect/callback", post(stripe_connect::oauth_callback))
        .route(
            "/api/stripe-connect/account/{host_id}",
            get(stripe_connect::get_account),
        )
        .with_state(stripe_connect::ConnectHandlerState {
            payments: services.payments.clone(),
        });

    let webhook_routes = Router::new()
        .route("/api/webhooks/stripe", post(webhooks::stripe_webhook))
        .with_state(webhooks::WebhookHandlerState {
            payments: services.payments.clone(),
        });

    let email_routes = Router::new()
        .route("/api/email/send", post(email::send_email))
        .with_state(email::EmailHandlerState {
            notifier: services.notifier.clone(),
        });

    // ── Health, metrics, docs ──────────────────────────────────
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            repos: services.repos.clone(),
            started_at: services.started_at.clone(),
            storage_backend: services.storage_backend,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(auth_public)
        .merge(auth_protected)
        .merge(charger_routes)
        .merge(favorite_routes)
        .merge(booking_routes)
        .merge(review_routes)
        .merge(dashboard_routes)
        .merge(payment_routes)
        .merge(connect_routes)
        .merge(webhook_routes)
        .merge(email_routes);

    if let Some(handle) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
