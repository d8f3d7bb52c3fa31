//! Tuned connection-pooling HTTP transport and its idle-connection janitor.
//!
//! Desktop deployments frequently sit behind proxies that silently drop idle
//! keep-alive connections after 30-60s. The transport keeps its own idle
//! timeout below that window, and the janitor additionally recycles the pool
//! on a fixed cadence so a stale socket is never picked up for a new request.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::ServiceConfig;
use crate::error::{RemoteError, ServiceError};

/// Floor defaults, applied when a knob is unset or non-positive.
const DEFAULT_MAX_IDLE_PER_HOST: usize = 4;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum janitor tick, to avoid busy-looping on tiny idle timeouts.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(2);

/// Resolved transport tuning with floor defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTuning {
    pub max_idle_per_host: usize,
    pub idle_timeout: Duration,
    pub handshake_timeout: Duration,
    pub disable_keep_alives: bool,
}

impl TransportTuning {
    /// Resolve tuning from a configuration snapshot.
    pub fn resolve(cfg: &ServiceConfig) -> Self {
        let max_idle_per_host = if cfg.http_max_idle_per_host > 0 {
            cfg.http_max_idle_per_host as usize
        } else {
            DEFAULT_MAX_IDLE_PER_HOST
        };
        let idle_timeout = if cfg.http_idle_timeout_secs > 0 {
            Duration::from_secs(cfg.http_idle_timeout_secs as u64)
        } else {
            DEFAULT_IDLE_TIMEOUT
        };
        let handshake_timeout = if cfg.http_handshake_timeout_secs > 0 {
            Duration::from_secs(cfg.http_handshake_timeout_secs as u64)
        } else {
            DEFAULT_HANDSHAKE_TIMEOUT
        };
        Self {
            max_idle_per_host,
            idle_timeout,
            handshake_timeout,
            disable_keep_alives: cfg.http_disable_keep_alives,
        }
    }

    /// Janitor cadence: half the idle timeout, floored at 2s.
    pub fn sweep_interval(&self) -> Duration {
        std::cmp::max(self.idle_timeout / 2, MIN_SWEEP_INTERVAL)
    }
}

/// Connection-pooling transport shared by one session.
///
/// Environment proxies are honored (reqwest default) and HTTP/2 is negotiated
/// opportunistically over ALPN; a server that only speaks HTTP/1.1 is not an
/// error. The pooled client is replaced wholesale by [`Transport::sweep_idle`],
/// never partially mutated.
pub struct Transport {
    client: RwLock<reqwest::Client>,
    tuning: TransportTuning,
    request_timeout: Duration,
}

impl Transport {
    /// Build a transport with the given tuning and per-request timeout.
    pub fn build(tuning: TransportTuning, request_timeout: Duration) -> Result<Self, ServiceError> {
        let client = Self::build_client(&tuning, request_timeout)
            .map_err(|e| ServiceError::Remote(RemoteError::Transport(e)))?;
        Ok(Self {
            client: RwLock::new(client),
            tuning,
            request_timeout,
        })
    }

    fn build_client(
        tuning: &TransportTuning,
        request_timeout: Duration,
    ) -> Result<reqwest::Client, reqwest::Error> {
        let max_idle = if tuning.disable_keep_alives {
            // No idle sockets at all: every request gets a fresh connection.
            0
        } else {
            tuning.max_idle_per_host
        };
        reqwest::Client::builder()
            .pool_max_idle_per_host(max_idle)
            .pool_idle_timeout(tuning.idle_timeout)
            .connect_timeout(tuning.handshake_timeout)
            .timeout(request_timeout)
            .build()
    }

    pub fn tuning(&self) -> TransportTuning {
        self.tuning
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Cheap handle to the current pooled client.
    pub fn client(&self) -> reqwest::Client {
        self.client.read().clone()
    }

    /// Close currently-idle pooled connections.
    ///
    /// reqwest exposes no direct close-idle call, so the pool is recycled by
    /// swapping in a freshly built client. Idle sockets die with the old pool
    /// while in-flight requests keep their connection until they finish.
    pub fn sweep_idle(&self) {
        match Self::build_client(&self.tuning, self.request_timeout) {
            Ok(fresh) => {
                *self.client.write() = fresh;
                debug!("transport: recycled idle connection pool");
            }
            Err(e) => {
                // Keep the old pool; a sweep is best-effort.
                warn!("transport: failed to rebuild pooled client: {e}");
            }
        }
    }
}

/// Spawn the idle-connection janitor for `transport`.
///
/// Ticks at [`TransportTuning::sweep_interval`] and sweeps unconditionally.
/// The task is owned through `stop`: the session holding the transport cancels
/// it when the session is replaced, so no janitor outlives its transport.
pub fn spawn_janitor(
    transport: Arc<Transport>,
    stop: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let period = transport.tuning().sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // the first tick fires immediately; skip it
        loop {
            tokio::select! {
                _ = stop.cancelled() => {
                    debug!("janitor: stopping (session replaced)");
                    break;
                }
                _ = ticker.tick() => {
                    transport.sweep_idle();
                }
            }
        }
    })
}
