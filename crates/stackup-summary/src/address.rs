//! External address detection.
//!
//! Sources are tried strictly in order and the first one that yields a
//! dotted-quad IPv4 address wins. A later source is never consulted once
//! an earlier one has answered. Exhausting the chain is not an error; it
//! yields [`DetectedAddress::Unknown`].

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use stackup_runner::{CommandSpec, ProbeError, ProcessRunner, run_probe};
use thiserror::Error;
use tracing::debug;

/// Public echo services, in the order they are tried.
pub const ECHO_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
    "https://checkip.amazonaws.com",
];

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("'{value}' is not an IPv4 address")]
    NotIpv4 { value: String },

    #[error("local lookup task failed: {0}")]
    Task(String),
}

/// One way of learning the external address.
#[async_trait]
pub trait AddressSource: Send + Sync {
    fn name(&self) -> &str;

    /// Raw answer; validated by the detector.
    async fn lookup(&self) -> Result<String, AddressError>;
}

/// GET a plain-text "what is my IP" endpoint.
pub struct HttpEchoSource {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpEchoSource {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client,
            timeout,
        }
    }
}

#[async_trait]
impl AddressSource for HttpEchoSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn lookup(&self) -> Result<String, AddressError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                AddressError::Timeout {
                    url: self.url.clone(),
                }
            } else {
                AddressError::Http {
                    url: self.url.clone(),
                    reason: e.to_string(),
                }
            }
        };

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_err)?
            .error_for_status()
            .map_err(map_err)?;
        let body = response.text().await.map_err(map_err)?;
        Ok(body.trim().to_string())
    }
}

/// First IPv4 address reported by `hostname -I`.
///
/// Usually a private address; it is the last resort when no echo service
/// is reachable.
pub struct LocalInterfaceSource<R> {
    runner: Arc<R>,
    timeout: Duration,
}

impl<R> LocalInterfaceSource<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self {
            runner,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

#[async_trait]
impl<R> AddressSource for LocalInterfaceSource<R>
where
    R: ProcessRunner + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "hostname -I"
    }

    async fn lookup(&self) -> Result<String, AddressError> {
        let runner = Arc::clone(&self.runner);
        let timeout = self.timeout;
        let output = tokio::task::spawn_blocking(move || {
            run_probe(runner.as_ref(), &CommandSpec::new("hostname").arg("-I"), timeout)
        })
        .await
        .map_err(|e| AddressError::Task(e.to_string()))??;

        let first = output
            .split_whitespace()
            .find(|token| parse_ipv4(token).is_some())
            .or_else(|| output.split_whitespace().next())
            .unwrap_or_default();
        Ok(first.to_string())
    }
}

/// Strict dotted-quad parse of a trimmed answer.
#[must_use]
pub fn parse_ipv4(raw: &str) -> Option<Ipv4Addr> {
    raw.trim().parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedAddress {
    Known(Ipv4Addr),
    Unknown,
}

impl DetectedAddress {
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for DetectedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(addr) => write!(f, "{addr}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Ordered fallback chain of [`AddressSource`]s.
pub struct AddressDetector {
    sources: Vec<Box<dyn AddressSource>>,
}

impl AddressDetector {
    pub fn new(sources: Vec<Box<dyn AddressSource>>) -> Self {
        Self { sources }
    }

    /// Echo services first, then the local interface.
    pub fn standard<R>(runner: Arc<R>) -> Self
    where
        R: ProcessRunner + Send + Sync + 'static,
    {
        let client = Client::builder()
            .user_agent(concat!("stackup/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        let mut sources: Vec<Box<dyn AddressSource>> = ECHO_SERVICES
            .iter()
            .map(|url| {
                Box::new(HttpEchoSource::new(client.clone(), *url, DEFAULT_LOOKUP_TIMEOUT))
                    as Box<dyn AddressSource>
            })
            .collect();
        sources.push(Box::new(LocalInterfaceSource::new(runner)));
        Self::new(sources)
    }

    /// Local interface only; no network traffic.
    pub fn offline<R>(runner: Arc<R>) -> Self
    where
        R: ProcessRunner + Send + Sync + 'static,
    {
        Self::new(vec![Box::new(LocalInterfaceSource::new(runner))])
    }

    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// First valid IPv4 answer, or `Unknown`. Never fails.
    pub async fn detect(&self) -> DetectedAddress {
        for source in &self.sources {
            match source.lookup().await {
                Ok(raw) => match parse_ipv4(&raw) {
                    Some(addr) => {
                        debug!(source = source.name(), address = %addr, "External address detected");
                        return DetectedAddress::Known(addr);
                    }
                    None => {
                        let err = AddressError::NotIpv4 { value: raw };
                        debug!(source = source.name(), error = %err, "Address source returned garbage");
                    }
                },
                Err(e) => debug!(source = source.name(), error = %e, "Address source failed"),
            }
        }
        tracing::warn!("No address source answered; reporting the address as unknown");
        DetectedAddress::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stackup_runner::{ProcessOutput, RunnerError};
    use std::sync::Mutex;

    /// Source with a canned answer that records whether it was asked.
    struct Canned {
        name: String,
        answer: Result<String, ()>,
        asked: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl AddressSource for Canned {
        fn name(&self) -> &str {
            &self.name
        }

        async fn lookup(&self) -> Result<String, AddressError> {
            self.asked.lock().unwrap().push(self.name.clone());
            self.answer.clone().map_err(|()| AddressError::Timeout {
                url: self.name.clone(),
            })
        }
    }

    fn chain(answers: &[Result<&str, ()>]) -> (AddressDetector, Arc<Mutex<Vec<String>>>) {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let sources = answers
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                Box::new(Canned {
                    name: format!("s{i}"),
                    answer: (*answer).map(str::to_string),
                    asked: Arc::clone(&asked),
                }) as Box<dyn AddressSource>
            })
            .collect();
        (AddressDetector::new(sources), asked)
    }

    struct Hostname(Result<&'static str, ()>);

    impl ProcessRunner for Hostname {
        fn run(&self, _: &CommandSpec, _: Duration) -> Result<ProcessOutput, RunnerError> {
            match self.0 {
                Ok(out) => Ok(ProcessOutput::new(out.as_bytes().to_vec(), vec![], Some(0))),
                Err(()) => Err(RunnerError::ProgramNotFound {
                    program: "hostname".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_first_valid_answer_wins_and_later_sources_are_not_asked() {
        let (detector, asked) =
            chain(&[Err(()), Ok("not an ip"), Ok("203.0.113.7"), Ok("198.51.100.1")]);
        assert_eq!(
            detector.detect().await,
            DetectedAddress::Known(Ipv4Addr::new(203, 0, 113, 7))
        );
        assert_eq!(*asked.lock().unwrap(), vec!["s0", "s1", "s2"]);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_unknown() {
        let (detector, _) = chain(&[Err(()), Ok(""), Ok("2001:db8::1")]);
        let detected = detector.detect().await;
        assert_eq!(detected, DetectedAddress::Unknown);
        assert_eq!(detected.to_string(), "unknown");
    }

    #[tokio::test]
    async fn test_remote_timeouts_fall_back_to_local_interface() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let mut sources: Vec<Box<dyn AddressSource>> = (0..4)
            .map(|i| {
                Box::new(Canned {
                    name: format!("remote{i}"),
                    answer: Err(()),
                    asked: Arc::clone(&asked),
                }) as Box<dyn AddressSource>
            })
            .collect();
        sources.push(Box::new(LocalInterfaceSource::new(Arc::new(Hostname(Ok(
            "192.168.1.50 10.0.0.4 fe80::1\n",
        ))))));

        let detected = AddressDetector::new(sources).detect().await;
        assert_eq!(detected.to_string(), "192.168.1.50");
        assert_eq!(asked.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_local_interface_skips_leading_ipv6() {
        let source = LocalInterfaceSource::new(Arc::new(Hostname(Ok("fd00::2 172.16.0.9"))));
        assert_eq!(source.lookup().await.unwrap(), "172.16.0.9");
    }

    #[tokio::test]
    async fn test_local_interface_missing_binary_is_an_error() {
        let source = LocalInterfaceSource::new(Arc::new(Hostname(Err(()))));
        assert!(matches!(
            source.lookup().await,
            Err(AddressError::Probe(ProbeError::NotInstalled { .. }))
        ));
    }

    #[tokio::test]
    async fn test_http_echo_source_trims_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ip")
            .with_status(200)
            .with_body("203.0.113.9\n")
            .create_async()
            .await;

        let source = HttpEchoSource::new(
            Client::new(),
            format!("{}/ip", server.url()),
            Duration::from_secs(5),
        );
        assert_eq!(source.lookup().await.unwrap(), "203.0.113.9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status_falls_through_to_next_source() {
        let mut server = mockito::Server::new_async().await;
        let _down = server
            .mock("GET", "/down")
            .with_status(503)
            .create_async()
            .await;
        let _up = server
            .mock("GET", "/up")
            .with_body("198.51.100.23")
            .create_async()
            .await;

        let client = Client::new();
        let detector = AddressDetector::new(vec![
            Box::new(HttpEchoSource::new(
                client.clone(),
                format!("{}/down", server.url()),
                Duration::from_secs(5),
            )),
            Box::new(HttpEchoSource::new(
                client,
                format!("{}/up", server.url()),
                Duration::from_secs(5),
            )),
        ]);
        assert_eq!(detector.detect().await.to_string(), "198.51.100.23");
    }

    #[test]
    fn test_standard_and_offline_chains() {
        let runner = Arc::new(Hostname(Err(())));
        let standard = AddressDetector::standard(Arc::clone(&runner));
        assert_eq!(
            standard.source_names(),
            vec![
                "https://api.ipify.org",
                "https://ifconfig.me/ip",
                "https://icanhazip.com",
                "https://checkip.amazonaws.com",
                "hostname -I",
            ]
        );
        assert_eq!(AddressDetector::offline(runner).source_names(), vec!["hostname -I"]);
    }

    proptest! {
        #[test]
        fn prop_parse_ipv4_accepts_every_dotted_quad(
            a in any::<u8>(),
            b in any::<u8>(),
            c in any::<u8>(),
            d in any::<u8>(),
        ) {
            let text = format!(" {a}.{b}.{c}.{d}\n");
            prop_assert_eq!(parse_ipv4(&text), Some(Ipv4Addr::new(a, b, c, d)));
        }

        #[test]
        fn prop_parse_ipv4_rejects_three_octets(a in any::<u8>(), b in any::<u8>(), c in any::<u8>()) {
            let text = format!("{a}.{b}.{c}");
            prop_assert_eq!(parse_ipv4(&text), None);
        }
    }
}
