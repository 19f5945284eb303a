//! # Scheduler Module
//!
//! Periodic background jobs: cache refresh and notification sweep.
//!
//! [`RefreshScheduler`] is built once by `main` and shared by reference. Each
//! purpose can be registered only once; a second `start_*` call is a no-op.
//! Every tick walks the backends sequentially, and an error or panic from one
//! backend is logged without affecting the others or later ticks.
//!
//! ## Schedule
//!
//! | Job              | Initial delay | Default period |
//! |------------------|---------------|----------------|
//! | Cache refresh    | 0             | 2 minutes      |
//! | Notifications    | 0             | 1 hour         |
//!
//! Periods are fixed delays: the next tick is scheduled `period` after the
//! previous one completes, so a slow tick pushes the following ones back
//! instead of firing them in a burst.
//!
//! Both jobs stop when [`RefreshScheduler::shutdown`] cancels the shared
//! [`CancellationToken`].

use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::FetchError;
use crate::ui::messages::ChatMessage;

/// Lo que el scheduler necesita de cada backend
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Recarga completa del caché del backend
    async fn reload_cache(&self) -> Result<usize, FetchError>;

    /// Envía las notificaciones periódicas del backend
    async fn send_periodic_notifications(&self, notifier: &dyn Notifier) -> anyhow::Result<()>;
}

/// Destino de las notificaciones (canales de Discord en producción)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: ChatMessage) -> anyhow::Result<()>;
}

pub struct RefreshScheduler {
    cache_refresh_interval: Duration,
    notification_interval: Duration,
    cache_refresh_started: AtomicBool,
    notification_sweep_started: AtomicBool,
    shutdown: CancellationToken,
    jobs: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(cache_refresh_interval: Duration, notification_interval: Duration) -> Self {
        Self {
            cache_refresh_interval,
            notification_interval,
            cache_refresh_started: AtomicBool::new(false),
            notification_sweep_started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            jobs: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_refresh_interval, config.notification_interval)
    }

    /// Reloads every cache once, then registers the periodic job.
    ///
    /// The initial reload completes before this returns, so callers can
    /// start accepting lookups right after. Returns `false` without doing
    /// anything if the job was already registered.
    pub async fn start_cache_refresh(&self, backends: Vec<Arc<dyn Backend>>) -> bool {
        if self.cache_refresh_started.swap(true, Ordering::SeqCst) {
            debug!("Refresco de caché ya registrado, ignorando");
            return false;
        }

        info!("📦 Carga inicial de caché para {} backends", backends.len());
        refresh_tick(&backends).await;

        let backends = Arc::new(backends);
        self.spawn_job("cache-refresh", self.cache_refresh_interval, move || {
            let backends = backends.clone();
            async move { refresh_tick(&backends).await }
        });
        true
    }

    /// Registra el barrido periódico de notificaciones.
    ///
    /// Returns `false` without doing anything if already registered.
    pub fn start_notification_sweep(
        &self,
        backends: Vec<Arc<dyn Backend>>,
        notifier: Arc<dyn Notifier>,
    ) -> bool {
        if self.notification_sweep_started.swap(true, Ordering::SeqCst) {
            debug!("Barrido de notificaciones ya registrado, ignorando");
            return false;
        }

        let backends = Arc::new(backends);
        self.spawn_job("notifications", self.notification_interval, move || {
            let backends = backends.clone();
            let notifier = notifier.clone();
            async move { notification_tick(&backends, notifier.as_ref()).await }
        });
        true
    }

    /// Cancels the jobs and waits for them to exit.
    ///
    /// A tick already in progress finishes before its job exits.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let jobs = std::mem::take(&mut *self.jobs.lock());
        for job in jobs {
            if let Err(e) = job.await {
                error!("Job del scheduler terminó con error: {:?}", e);
            }
        }
        info!("⏹️ Scheduler detenido");
    }

    fn spawn_job<F, Fut>(&self, name: &'static str, period: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        info!(
            "⏰ Job '{}' registrado cada {}",
            name,
            humantime::format_duration(period)
        );

        let handle = tokio::spawn(async move {
            // retraso inicial 0; la espera corre desde el fin de cada tick
            while !token.is_cancelled() {
                tick().await;
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(period) => {}
                }
            }
            debug!("Job '{}' finalizado", name);
        });

        self.jobs.lock().push(handle);
    }
}

async fn refresh_tick(backends: &[Arc<dyn Backend>]) {
    for backend in backends {
        match AssertUnwindSafe(backend.reload_cache()).catch_unwind().await {
            Ok(Ok(count)) => debug!("Caché de {} con {} entradas", backend.name(), count),
            Ok(Err(e)) => error!("❌ Error recargando caché de {}: {}", backend.name(), e),
            Err(_) => error!("💥 Panic recargando caché de {}", backend.name()),
        }
    }
}

async fn notification_tick(backends: &[Arc<dyn Backend>], notifier: &dyn Notifier) {
    for backend in backends {
        match AssertUnwindSafe(backend.send_periodic_notifications(notifier))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("❌ Error en notificaciones de {}: {:?}", backend.name(), e),
            Err(_) => error!("💥 Panic en notificaciones de {}", backend.name()),
        }
    }
}
