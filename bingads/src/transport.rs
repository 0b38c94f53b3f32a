use crate::errors::BingAdsError;
use bingconfig::Config;
use parking_lot::RwLock;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

/// Connection settings of the HTTP agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub open_timeout: Duration,
    pub read_timeout: Duration,
    /// Total number of attempts for a request, the first one included
    pub retry_limit: usize,
    pub retry_interval: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            open_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(20),
            retry_limit: 2,
            retry_interval: Duration::from_secs(1),
        }
    }
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            open_timeout: config.get_open_timeout(),
            read_timeout: config.get_read_timeout(),
            retry_limit: config.get_retry_limit(),
            retry_interval: config.get_retry_interval(),
        }
    }
}

/// Raw HTTP response: status code and full body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Persistent HTTP agent shared by all the services of a client.
///
/// The agent keeps one idle connection per host. HTTP error statuses are
/// returned as responses, not as errors, so SOAP fault bodies can be read.
pub struct Transport {
    settings: HttpSettings,
    agent: RwLock<Agent>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(settings: HttpSettings) -> Self {
        let agent = build_agent(&settings);
        Self {
            settings,
            agent: RwLock::new(agent),
        }
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    /// POST a SOAP envelope to `url`.
    ///
    /// Timeouts, I/O and connection errors are retried up to the attempt
    /// limit, waiting `retry_interval` in between.
    pub fn post(
        &self,
        url: &str,
        soap_action: &str,
        body: &str,
    ) -> Result<HttpResponse, BingAdsError> {
        let attempts = self.settings.retry_limit.max(1);
        let soap_action_header = format!(r#""{soap_action}""#);

        let mut attempt = 1;
        loop {
            // Le verrou n'est pas gardé pendant la requête
            let agent = self.agent.read().clone();

            match send(&agent, url, &soap_action_header, body) {
                Ok(response) => {
                    debug!(url = %url, status = response.status, attempt, "SOAP response received");
                    return Ok(response);
                }
                Err(err) if attempt < attempts && is_retryable(&err) => {
                    warn!(url = %url, attempt, "HTTP request failed, retrying: {}", err);
                    attempt += 1;
                    thread::sleep(self.settings.retry_interval);
                }
                Err(source) => {
                    return Err(BingAdsError::Transport {
                        url: url.to_string(),
                        source,
                    });
                }
            }
        }
    }

    /// Drops the pooled connections
    pub fn reset(&self) {
        debug!("Resetting HTTP connections");
        *self.agent.write() = build_agent(&self.settings);
    }
}

fn build_agent(settings: &HttpSettings) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_connect(Some(settings.open_timeout))
        .timeout_recv_response(Some(settings.read_timeout))
        .timeout_recv_body(Some(settings.read_timeout))
        .max_idle_connections_per_host(1)
        .build()
        .into()
}

fn send(
    agent: &Agent,
    url: &str,
    soap_action: &str,
    body: &str,
) -> Result<HttpResponse, ureq::Error> {
    let mut response = agent
        .post(url)
        .header("Content-Type", "text/xml; charset=utf-8")
        .header("SOAPAction", soap_action)
        .send(body)?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;
    Ok(HttpResponse { status, body })
}

fn is_retryable(err: &ureq::Error) -> bool {
    matches!(
        err,
        ureq::Error::Timeout(_) | ureq::Error::Io(_) | ureq::Error::ConnectionFailed
    )
}
