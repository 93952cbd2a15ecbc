//! Baseline driver: ordinary request/response cycles against `/metrics`.

use std::time::Duration;

use crate::client::transport::{fetch, StreamTransport};
use crate::client::METRICS_PATH;
use crate::config::{DemoConfig, TimeoutConfig};

/// Characters of each response body echoed to the log.
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaselineSummary {
    pub succeeded: u32,
    pub failed: u32,
}

#[derive(Debug, Clone)]
pub struct BaselineDriver {
    requests: u32,
    pause: Duration,
    request_timeout: Duration,
}

impl BaselineDriver {
    pub fn new(demo: &DemoConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            requests: demo.normal_requests,
            pause: demo.baseline_pause(),
            request_timeout: timeouts.request(),
        }
    }

    /// Issue the requests one after another. A failed request is logged and
    /// the sequence moves on, unless the session itself is gone.
    pub async fn run<T: StreamTransport>(&self, transport: &mut T) -> BaselineSummary {
        let mut summary = BaselineSummary::default();

        for i in 1..=self.requests {
            tracing::info!(request = i, "Sending normal request");

            match fetch(transport, METRICS_PATH, self.request_timeout).await {
                Ok(response) => {
                    summary.succeeded += 1;
                    tracing::info!(
                        request = i,
                        status = %response.status,
                        data = %response.preview(PREVIEW_CHARS),
                        "Response received"
                    );
                }
                Err(e) if e.is_session_error() => {
                    summary.failed += 1;
                    tracing::error!(request = i, error = %e, "Session lost, stopping baseline");
                    break;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(request = i, error = %e, "Request failed");
                }
            }

            tokio::time::sleep(self.pause).await;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ClientError;
    use crate::client::transport::{InFlightStream, StreamResponse};
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use std::future::Future;

    /// Fails every request whose 1-based index is listed; from `lost_at`
    /// on, streams cannot be opened at all.
    struct ScriptedTransport {
        calls: u32,
        failing: Vec<u32>,
        lost_at: Option<u32>,
    }

    struct ScriptedStream {
        fail: bool,
    }

    impl StreamTransport for ScriptedTransport {
        type Stream = ScriptedStream;

        fn open_stream(
            &mut self,
            path: &str,
        ) -> impl Future<Output = Result<Self::Stream, ClientError>> + Send {
            assert_eq!(path, METRICS_PATH);
            self.calls += 1;
            let result = match self.lost_at {
                Some(n) if self.calls >= n => Err(ClientError::Connect {
                    addr: "localhost:3000".into(),
                    source: std::io::Error::from(std::io::ErrorKind::ConnectionReset),
                }),
                _ => Ok(ScriptedStream {
                    fail: self.failing.contains(&self.calls),
                }),
            };
            async move { result }
        }
    }

    impl InFlightStream for ScriptedStream {
        fn cancel(self) -> bool {
            false
        }

        fn response(self) -> impl Future<Output = Result<StreamResponse, ClientError>> + Send {
            async move {
                if self.fail {
                    Err(ClientError::Status(StatusCode::BAD_GATEWAY))
                } else {
                    Ok(StreamResponse {
                        status: StatusCode::OK,
                        body: Bytes::from_static(b"{\"activeStreams\": 1}"),
                    })
                }
            }
        }
    }

    fn driver(requests: u32) -> BaselineDriver {
        let demo = DemoConfig {
            normal_requests: requests,
            ..DemoConfig::default()
        };
        BaselineDriver::new(&demo, &TimeoutConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn runs_every_request_sequentially() {
        let mut transport = ScriptedTransport {
            calls: 0,
            failing: vec![],
            lost_at: None,
        };
        let summary = driver(3).run(&mut transport).await;

        assert_eq!(transport.calls, 3);
        assert_eq!(
            summary,
            BaselineSummary {
                succeeded: 3,
                failed: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_abort_the_sequence() {
        let mut transport = ScriptedTransport {
            calls: 0,
            failing: vec![1, 2],
            lost_at: None,
        };
        let summary = driver(3).run(&mut transport).await;

        assert_eq!(transport.calls, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_session_stops_the_sequence() {
        let mut transport = ScriptedTransport {
            calls: 0,
            failing: vec![],
            lost_at: Some(2),
        };
        let summary = driver(5).run(&mut transport).await;

        assert_eq!(transport.calls, 2);
        assert_eq!(
            summary,
            BaselineSummary {
                succeeded: 1,
                failed: 1
            }
        );
    }
}
