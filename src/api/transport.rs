use std::thread;
use std::time::Duration;

/// What the retry loop needs to know about one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Raw `Retry-After` header value, if the server sent one.
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Connection-level failure: DNS, reset, timeout, unreadable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError(pub String);

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything able to perform a blocking HTTP GET.
///
/// Every status code, error statuses included, comes back as `Ok`; only
/// failures below HTTP are reported as [`NetworkError`].
pub trait Transport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RawResponse, NetworkError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        UreqTransport { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RawResponse, NetworkError> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        let response = match request.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(e)) => return Err(NetworkError(e.to_string())),
        };

        let status = response.status();
        let retry_after = response.header("Retry-After").map(str::to_string);
        let body = response
            .into_string()
            .map_err(|e| NetworkError(format!("failed to read body: {}", e)))?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Blocks the current thread between retries.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
