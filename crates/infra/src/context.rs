//! Application context - dependency injection container

use std::sync::Arc;

use careslot_core::{
    AppointmentQueryService, AppointmentRepository, AppointmentSynchronizer, CalendarProvider,
    PaymentGateway, PaymentRepository, PaymentService,
};
use careslot_domain::{CareslotError, Config, Result, ServiceState, ServiceStatus};
use tracing::{info, warn};

use crate::database::{DbManager, SqliteAppointmentRepository, SqlitePaymentRepository};
use crate::integrations::{
    GoogleCalendarProvider, StripePaymentGateway, UnconfiguredCalendarProvider,
    UnconfiguredPaymentGateway,
};

/// Application context - holds all services and their adapters
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub synchronizer: Arc<AppointmentSynchronizer>,
    pub queries: Arc<AppointmentQueryService>,
    pub payments: Arc<PaymentService>,
    calendar: Arc<dyn CalendarProvider>,
    gateway: Arc<dyn PaymentGateway>,
}

impl AppContext {
    /// Wire every service from `config`.
    ///
    /// Opens the database and applies migrations. A missing calendar or
    /// payments section wires an adapter that reports itself unavailable.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let time_zone = config.clinic.tz()?;

        let db_path = config.database.path.clone();
        let pool_size = config.database.pool_size;
        let db = tokio::task::spawn_blocking(move || -> careslot_domain::AdapterResult<DbManager> {
            let manager = DbManager::new(&db_path, pool_size)?;
            manager.run_migrations()?;
            Ok(manager)
        })
        .await
        .map_err(|err| CareslotError::Internal(format!("database bootstrap task failed: {err}")))?
        .map_err(|err| CareslotError::Config(format!("failed to open record store: {err}")))?;
        let db = Arc::new(db);

        let calendar: Arc<dyn CalendarProvider> = match &config.calendar {
            Some(calendar) => Arc::new(GoogleCalendarProvider::new(calendar).map_err(|err| {
                CareslotError::Config(format!("failed to build calendar client: {err}"))
            })?),
            None => {
                warn!("calendar not configured; appointment writes will fail as unavailable");
                Arc::new(UnconfiguredCalendarProvider)
            }
        };

        let gateway: Arc<dyn PaymentGateway> = match &config.payments {
            Some(payments) => Arc::new(StripePaymentGateway::new(payments).map_err(|err| {
                CareslotError::Config(format!("failed to build payment client: {err}"))
            })?),
            None => Arc::new(UnconfiguredPaymentGateway),
        };

        let appointments: Arc<dyn AppointmentRepository> =
            Arc::new(SqliteAppointmentRepository::new(Arc::clone(&db)));
        let ledger: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(Arc::clone(&db)));

        let synchronizer =
            AppointmentSynchronizer::new(Arc::clone(&calendar), Arc::clone(&appointments))
                .with_time_zone(time_zone)
                .with_appointment_duration(config.clinic.appointment_duration_minutes);
        let queries = AppointmentQueryService::new(appointments).with_time_zone(time_zone);
        let payments = PaymentService::new(Arc::clone(&gateway), ledger);

        info!(
            db_path = %db.path().display(),
            time_zone = %time_zone,
            calendar = calendar.is_configured(),
            payments = gateway.is_configured(),
            "application context initialised"
        );

        Ok(Self {
            config,
            db,
            synchronizer: Arc::new(synchronizer),
            queries: Arc::new(queries),
            payments: Arc::new(payments),
            calendar,
            gateway,
        })
    }

    /// Which services are wired, without touching the network or disk.
    pub fn service_status(&self) -> ServiceStatus {
        ServiceStatus {
            record_store: ServiceState::Connected,
            calendar: configured_state(self.calendar.is_configured()),
            payments: configured_state(self.gateway.is_configured()),
        }
    }

    /// Like [`Self::service_status`], but probes the database.
    pub async fn health_check(&self) -> ServiceStatus {
        let mut status = self.service_status();

        let db = Arc::clone(&self.db);
        let probe = tokio::task::spawn_blocking(move || db.health_check()).await;
        if !matches!(probe, Ok(Ok(()))) {
            warn!(outcome = ?probe, "record store health check failed");
            status.record_store = ServiceState::Unreachable;
        }

        status
    }
}

fn configured_state(configured: bool) -> ServiceState {
    if configured {
        ServiceState::Connected
    } else {
        ServiceState::NotConfigured
    }
}
