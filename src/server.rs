//! Serve the router over HTTP/1, enforcing per-connection timeouts that
//! `axum::serve` doesn't expose.
//!
//! - A request must complete within [REQUEST_TIMEOUT]; this is enforced by
//!   the router itself.
//! - Request headers must arrive within [HEADER_READ_TIMEOUT].
//! - Connections idle for [KEEP_ALIVE_TIMEOUT] between requests are closed.
//!
//! hyper arms its header read timer while waiting for the next request on a
//! kept-alive connection too, so a silent connection is usually dropped after
//! [HEADER_READ_TIMEOUT]. The idle check is the upper bound, covering hyper
//! releases that only start the timer once the first bytes arrive.

use axum::{body::Body, Router};
use hyper::{body::Incoming, server::conn::http1, Request};
use hyper_util::{
    rt::{TokioIo, TokioTimer},
    service::TowerToHyperService,
};
use std::{
    pin::pin,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
};
use tower::ServiceExt;
use tracing::{debug, warn};

pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
pub const HEADER_READ_TIMEOUT: Duration = Duration::from_millis(2000);
pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_millis(3000);

/// How often idle connections are checked for.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Accept connections until `shutdown` resolves (or its sender is dropped).
/// Connections already accepted are left to finish.
pub async fn serve(listener: TcpListener, app: Router, shutdown: oneshot::Receiver<()>) {
    let mut shutdown = pin!(shutdown);

    loop {
        let (stream, remote) = tokio::select! {
            res = listener.accept() => match res {
                Ok(x) => x,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            },
            _ = &mut shutdown => break,
        };

        let app = app.clone();
        tokio::spawn(async move {
            serve_connection(stream, app).await;
            debug!(%remote, "Connection closed");
        });
    }
}

/// Tracks whether a connection is in the middle of a request, and if not
/// how long it's been since the last one.
#[derive(Clone)]
struct Activity {
    epoch: Instant,
    in_flight: Arc<AtomicUsize>,
    last_seen_ms: Arc<AtomicU64>,
}

impl Activity {
    fn new() -> Self {
        Activity {
            epoch: Instant::now(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            last_seen_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn begin(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self) {
        self.last_seen_ms.store(self.now_ms(), Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn idle_for(&self) -> Duration {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return Duration::ZERO;
        }

        let last = self.last_seen_ms.load(Ordering::SeqCst);
        Duration::from_millis(self.now_ms().saturating_sub(last))
    }
}

async fn serve_connection(stream: TcpStream, app: Router) {
    let activity = Activity::new();

    let svc = {
        let activity = activity.clone();

        tower::service_fn(move |req: Request<Incoming>| {
            let activity = activity.clone();
            let app = app.clone();

            async move {
                activity.begin();
                let res = app.oneshot(req.map(Body::new)).await;
                activity.end();
                res
            }
        })
    };

    let conn = http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(HEADER_READ_TIMEOUT)
        .keep_alive(true)
        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(svc));
    let mut conn = pin!(conn);

    let mut ticker = tokio::time::interval(IDLE_CHECK_INTERVAL);
    let mut closing = false;

    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(e) = res {
                    debug!("Connection error: {}", e);
                }
                break;
            }
            _ = ticker.tick(), if !closing => {
                if activity.idle_for() >= KEEP_ALIVE_TIMEOUT {
                    conn.as_mut().graceful_shutdown();
                    closing = true;
                }
            }
        }
    }
}
