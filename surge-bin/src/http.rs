use crate::config::Config;
use crate::interrupt::Interrupted;
use anyhow::Error;
use http::{StatusCode, Uri};
use hyper::client::HttpConnector;
use hyper::Client;
use std::time::{Duration, Instant};
use surge_metrics::LatencySeries;
use thiserror::Error as ThisError;
use tokio::runtime::{Builder, Runtime};

#[derive(Debug, ThisError)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] hyper::Error),
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

pub struct RequestLoop {
    config: Config,
    logger: slog::Logger,
}

impl RequestLoop {
    pub fn new(config: Config, logger: slog::Logger) -> RequestLoop {
        RequestLoop { config, logger }
    }

    /// Issue GET requests against the target url until the configured
    /// duration elapses, one at a time, and return the recorded series.
    ///
    /// The deadline is checked between requests only, so a slow response can
    /// overshoot the nominal duration by up to its own round-trip time. Any
    /// HTTP response is recorded as a sample; network-level failures are
    /// logged and skipped.
    pub fn run(&self, interrupted: &Interrupted) -> Result<LatencySeries, Error> {
        let mut rt: Runtime = Builder::new().basic_scheduler().enable_all().build()?;
        let client = Client::new();
        let timeout = Duration::from_secs(self.config.request_timeout_seconds);
        let deadline = Instant::now() + Duration::from_secs(self.config.duration_seconds);
        let mut series = LatencySeries::new();

        while Instant::now() < deadline && !interrupted.interrupted() {
            let started = Instant::now();
            match rt.block_on(fetch(&client, &self.config.target_url, timeout)) {
                Ok(status) => {
                    let elapsed = started.elapsed();
                    series.push_elapsed(elapsed);
                    let millis = elapsed.as_secs_f64() * 1000.0;
                    if status.is_success() {
                        slog::info!(
                            self.logger,
                            "Request {}: {:.2}ms - SUCCESS",
                            series.len(),
                            millis
                        );
                    } else {
                        slog::warn!(
                            self.logger,
                            "Request {}: {:.2}ms - failed with status {}",
                            series.len(),
                            millis,
                            status
                        );
                    }
                }
                Err(e) => {
                    slog::error!(self.logger, "Request failed: {}", e);
                }
            }
        }
        Ok(series)
    }
}

/// One GET round trip: the response body is read to the end so the recorded
/// time covers the full transfer, and the status is returned regardless of
/// its class. The timeout caps the whole round trip.
async fn fetch(
    client: &Client<HttpConnector>,
    url: &Uri,
    timeout: Duration,
) -> Result<StatusCode, FetchError> {
    let round_trip = async {
        let res = client.get(url.clone()).await?;
        let status = res.status();
        hyper::body::to_bytes(res.into_body()).await?;
        Ok::<_, hyper::Error>(status)
    };
    match tokio::time::timeout(timeout, round_trip).await {
        Ok(outcome) => outcome.map_err(FetchError::from),
        Err(_) => Err(FetchError::TimedOut(timeout)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{DEFAULT_SLOW_THRESHOLD_MS, DEFAULT_REQUEST_TIMEOUT_SECONDS};
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Response, Server};
    use slog::Drain;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use std::sync::mpsc;
    use std::thread;
    use surge_metrics::SummaryStats;

    fn test_logger() -> slog::Logger {
        slog::Logger::root(slog::Discard.fuse(), slog::o!())
    }

    fn config(url: &str, duration_seconds: u64) -> Config {
        Config {
            target_url: url.parse().unwrap(),
            duration_seconds,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        }
    }

    // Serves 200 "ok" on an ephemeral port from a background thread.
    fn start_server() -> SocketAddr {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut rt = Builder::new().basic_scheduler().enable_all().build().unwrap();
            rt.block_on(async move {
                let make_svc = make_service_fn(|_| async {
                    Ok::<_, Infallible>(service_fn(|_req| async {
                        Ok::<_, Infallible>(Response::new(Body::from("ok")))
                    }))
                });
                let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_svc);
                tx.send(server.local_addr()).unwrap();
                server.await.unwrap();
            });
        });
        rx.recv().unwrap()
    }

    #[test]
    fn zero_duration_yields_empty_series() {
        let started = Instant::now();
        let series = RequestLoop::new(config("http://127.0.0.1:1/", 0), test_logger())
            .run(&Interrupted::new())
            .unwrap();
        assert!(series.is_empty());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn loop_records_samples_from_local_server() {
        let addr = start_server();
        let url = format!("http://{}/albums", addr);
        let series = RequestLoop::new(config(&url, 1), test_logger())
            .run(&Interrupted::new())
            .unwrap();
        assert!(!series.is_empty());
        assert!(series.samples().iter().all(|&s| s >= 0.0));

        let stats = SummaryStats::from_series(&series, DEFAULT_SLOW_THRESHOLD_MS).unwrap();
        assert_eq!(stats.count, series.len());
        // loopback round trips are nowhere near the slow threshold
        assert_eq!(stats.slow_count, 0);
        assert_eq!(stats.slow_percentage, 0.0);
    }

    #[test]
    fn network_failure_leaves_no_sample() {
        // nothing listens on this port; every attempt is a connection error
        let series = RequestLoop::new(config("http://127.0.0.1:9/", 1), test_logger())
            .run(&Interrupted::new())
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn interrupted_loop_stops_early() {
        let interrupted = Interrupted::new();
        interrupted.set();
        let series = RequestLoop::new(config("http://127.0.0.1:1/", 30), test_logger())
            .run(&interrupted)
            .unwrap();
        assert!(series.is_empty());
    }
}
