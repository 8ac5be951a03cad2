use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::LimiterConfig;
use crate::error::ApiError;

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(burst: f64, now: Instant) -> Self {
        Self {
            tokens: burst,
            last_refill: now,
        }
    }

    /// Refill tokens based on elapsed time and try to consume one.
    /// Returns `true` if a token was consumed, `false` if rate-limited.
    fn try_consume(&mut self, rps: f64, burst: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rps).min(burst);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

struct Client {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Per-client token-bucket limiter keyed by remote IP.
///
/// All buckets share one fill rate and burst size. Clients idle for longer than
/// `stale_after` are dropped by the sweeper. A single mutex guards the client
/// map for both request admission and sweeping.
#[derive(Clone)]
pub struct RateLimiter {
    clients: Arc<Mutex<HashMap<IpAddr, Client>>>,
    enabled: bool,
    rps: f64,
    burst: f64,
    sweep_interval: Duration,
    stale_after: Duration,
}

impl RateLimiter {
    pub fn new(config: &LimiterConfig) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            enabled: config.enabled,
            rps: config.rps,
            burst: f64::from(config.burst),
            sweep_interval: config.sweep_interval(),
            stale_after: config.stale_after(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn allow(&self, client: IpAddr) -> bool {
        self.allow_at(client, Instant::now()).await
    }

    /// Admission check against an explicit clock reading.
    pub async fn allow_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock().await;
        let entry = clients.entry(client).or_insert_with(|| Client {
            bucket: TokenBucket::full(self.burst, now),
            last_seen: now,
        });
        entry.last_seen = now;
        entry.bucket.try_consume(self.rps, self.burst, now)
    }

    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    /// Drop clients idle for longer than the staleness threshold. Returns how many were removed.
    pub async fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock().await;
        let before = clients.len();
        clients.retain(|_, client| now.saturating_duration_since(client.last_seen) <= self.stale_after);
        before - clients.len()
    }

    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Spawn the periodic sweep. The task runs until the returned handle is stopped.
    pub fn start_sweeper(&self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let limiter = self.clone();
        let period = self.sweep_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep().await;
                        if removed > 0 {
                            debug!(removed, "evicted idle rate-limit clients");
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        info!(interval = ?period, stale_after = ?self.stale_after, "rate limiter sweeper started");
        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Owns the sweeper task started by [`RateLimiter::start_sweeper`].
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("rate limiter sweeper ended abnormally: {}", e);
        }
        info!("rate limiter sweeper stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Admission middleware. Needs the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let client = match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip(),
        None => return ApiError::server_error("unable to resolve client address").into_response(),
    };

    if !limiter.allow(client).await {
        debug!(%client, "rate limit exceeded");
        return ApiError::rate_limit_exceeded().into_response();
    }

    next.run(request).await
}
