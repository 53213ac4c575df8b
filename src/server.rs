//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: storage and migrations, gateway
//! selection, services, the REST API, the booking status task and graceful
//! shutdown.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::services::{
    start_booking_status_task, utc_offset, BookingSettings, PaymentSettings,
};
use crate::application::{
    AuthService, BookingNotifier, BookingService, ChargerService, DashboardService,
    PaymentService, ReviewService, SharedEmailSender, SharedPaymentGateway,
};
use crate::config::{AppConfig, DatabaseBackend, EmailMode, PaymentMode};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::{JwtConfig, TOKEN_ISSUER};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::email::{LogEmailSender, ResendClient};
use crate::infrastructure::stripe::{MockPaymentGateway, StripeClient};
use crate::infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};
use crate::interfaces::http::middleware::AuthState;
use crate::interfaces::http::{create_api_router, ApiServices};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup
    pub auto_migrate: bool,
    /// Create the configured admin when there are no users
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running PlugSpot server.
///
/// ```rust,no_run
/// use plugspot::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), plugspot::server::BoxError> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Port actually bound, which differs from the config when it was 0
    pub api_port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
    status_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, BoxError> {
        let app_cfg = opts.config;
        info!(environment = ?app_cfg.environment, "Starting PlugSpot...");

        let prometheus_handle = prometheus_handle();

        // ── Storage ────────────────────────────────────────────
        let (repos, db, storage_backend) = match app_cfg.database.backend {
            DatabaseBackend::Sqlite => {
                let db = init_database(&DatabaseConfig::from(&app_cfg.database)).await?;
                if opts.auto_migrate {
                    info!("Running database migrations...");
                    Migrator::up(&db, None).await?;
                    info!("Migrations completed");
                }
                let repos: Arc<dyn RepositoryProvider> =
                    Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
                (repos, Some(db), "sqlite")
            }
            DatabaseBackend::Memory => {
                warn!("Using in-memory storage; data is lost on restart");
                let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
                (repos, None, "memory")
            }
        };

        // ── Gateways ───────────────────────────────────────────
        let gateway = payment_gateway(&app_cfg)?;
        let email_sender = email_sender(&app_cfg)?;

        // ── Services ───────────────────────────────────────────
        let jwt_config = JwtConfig {
            secret: app_cfg.security.jwt_secret.clone(),
            expiration_hours: app_cfg.security.jwt_expiration_hours,
            issuer: TOKEN_ISSUER.to_string(),
        };
        info!(expiration_hours = jwt_config.expiration_hours, "JWT configured");

        let auth = Arc::new(AuthService::new(
            repos.clone(),
            jwt_config.clone(),
            app_cfg.security.bcrypt_cost,
        ));
        if opts.create_default_admin {
            match auth.ensure_default_admin(&app_cfg.admin).await {
                Ok(Some(_)) => warn!("Default admin created; change its password"),
                Ok(None) => {}
                Err(e) => error!(error = %e, "Failed to create default admin"),
            }
        }

        let notifier = Arc::new(BookingNotifier::new(
            email_sender,
            app_cfg.server.public_base_url.clone(),
            utc_offset(app_cfg.scheduling.utc_offset_minutes),
        ));
        let bookings = Arc::new(BookingService::new(
            repos.clone(),
            gateway.clone(),
            notifier.clone(),
            BookingSettings::from_config(&app_cfg),
        ));
        let services = ApiServices {
            repos: repos.clone(),
            storage_backend,
            auth,
            chargers: Arc::new(ChargerService::new(
                repos.clone(),
                (app_cfg.browse.default_latitude, app_cfg.browse.default_longitude),
            )),
            bookings: bookings.clone(),
            reviews: Arc::new(ReviewService::new(repos.clone())),
            dashboards: Arc::new(DashboardService::new(repos.clone())),
            payments: Arc::new(PaymentService::new(
                repos.clone(),
                gateway,
                PaymentSettings::from(&app_cfg.payments),
            )),
            notifier,
            started_at: Arc::new(Instant::now()),
        };

        // ── Shutdown coordinator + background task ─────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let status_task = start_booking_status_task(
            bookings,
            shutdown_signal.clone(),
            app_cfg.scheduling.status_check_interval_secs,
        );

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(
            services,
            AuthState { jwt_config },
            &app_cfg.server.cors_origins,
            prometheus_handle,
        );

        let api_addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = listener.local_addr()?.port();
        info!(address = %api_addr, "REST API server listening");
        info!("Swagger UI available at http://{}:{}/docs/", app_cfg.server.api_host, api_port);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });
        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        info!("PlugSpot started");
        Ok(Self {
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            status_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait until the API server stops, then drain the background task
    /// within the shutdown timeout and close the database.
    pub async fn wait(self) {
        match self.api_task.await {
            Ok(()) => info!("REST API server stopped"),
            Err(e) => error!(error = %e, "REST API server task panicked"),
        }

        // The server can also stop on its own; make sure the task sees it
        self.shutdown.signal().trigger();
        let timeout = Duration::from_secs(self.shutdown.timeout_secs());
        match tokio::time::timeout(timeout, self.status_task).await {
            Ok(Ok(())) => info!("Booking status task stopped"),
            Ok(Err(e)) => error!(error = %e, "Booking status task panicked"),
            Err(_) => warn!(timeout_secs = timeout.as_secs(), "Booking status task did not stop in time"),
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!(error = %e, "Error closing database connection");
            } else {
                info!("Database connection closed");
            }
        }
        info!("PlugSpot shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down PlugSpot...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process; later
/// starts reuse it. `None` when another recorder is already installed.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable; /metrics disabled");
                None
            }
        })
        .clone()
}

fn payment_gateway(cfg: &AppConfig) -> Result<SharedPaymentGateway, BoxError> {
    match cfg.payments.mode {
        PaymentMode::Stripe => {
            info!(currency = %cfg.payments.currency, "Using Stripe payment gateway");
            Ok(Arc::new(StripeClient::new(&cfg.payments)?))
        }
        PaymentMode::Mock => {
            if cfg.is_production() {
                return Err("mock payments are not allowed in production".into());
            }
            warn!("Using mock payment gateway; every payment succeeds");
            Ok(Arc::new(MockPaymentGateway::new(
                cfg.server.public_base_url.clone(),
            )))
        }
    }
}

fn email_sender(cfg: &AppConfig) -> Result<SharedEmailSender, BoxError> {
    match cfg.email.mode {
        EmailMode::Resend => {
            info!(from = %cfg.email.from, "Using Resend email delivery");
            Ok(Arc::new(ResendClient::new(&cfg.email)?))
        }
        EmailMode::Log => {
            info!("Emails are logged, not sent");
            Ok(Arc::new(LogEmailSender::new()))
        }
    }
}

/// Initialize tracing from the application config. Call once at startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn memory_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.database.backend = DatabaseBackend::Memory;
        cfg.server.api_host = "127.0.0.1".into();
        cfg.server.api_port = 0;
        cfg.security.bcrypt_cost = 4;
        cfg
    }

    #[tokio::test]
    async fn starts_and_stops_with_memory_storage() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_ne!(handle.api_port, 0);
        assert!(handle.is_running());
        assert_eq!(handle.repos.users().count().await.unwrap(), 1, "default admin");
        handle.shutdown().await;
    }

    #[test]
    fn mock_gateway_is_refused_in_production() {
        let mut cfg = memory_config();
        cfg.environment = Environment::Production;
        assert!(payment_gateway(&cfg).is_err());
    }
}
