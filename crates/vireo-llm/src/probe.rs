use std::time::Duration;

use tracing::debug;

const DEFAULT_PORT: u16 = 1234;
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Discovers a locally running OpenAI-compatible inference server
/// (LM Studio and friends expose `/v1/models` on port 1234).
///
/// Candidates are probed in order; the first host answering 200 wins.
/// Absence of a server is a normal outcome, never an error — every transport
/// failure is swallowed and the next candidate is tried.
pub struct EndpointProber {
    http: reqwest::Client,
    candidates: Vec<String>,
}

impl EndpointProber {
    /// Candidate list from the environment: an optional `LMSTUDIO_LAN_HOST`
    /// entry first, then the default local hosts.
    pub fn from_env() -> Self {
        let mut candidates = Vec::new();
        if let Ok(host) = std::env::var("LMSTUDIO_LAN_HOST") {
            if !host.is_empty() {
                candidates.push(format!("http://{host}:{DEFAULT_PORT}"));
            }
        }
        candidates.extend([
            format!("http://localhost:{DEFAULT_PORT}"),
            format!("http://127.0.0.1:{DEFAULT_PORT}"),
            format!("http://192.168.2.65:{DEFAULT_PORT}"),
        ]);
        Self::with_candidates(candidates)
    }

    /// Probe an explicit candidate list (tests, fixed deployments).
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            candidates,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Base URL of the first reachable candidate as `<host>/v1`, or `None`
    /// when every candidate is unreachable or answers non-200.
    pub async fn probe(&self) -> Option<String> {
        for host in &self.candidates {
            let url = format!("{host}/v1/models");
            match self.http.get(&url).timeout(PROBE_TIMEOUT).send().await {
                Ok(res) if res.status() == reqwest::StatusCode::OK => {
                    debug!(host = %host, "local inference server detected");
                    return Some(format!("{host}/v1"));
                }
                Ok(res) => {
                    debug!(host = %host, status = %res.status(), "candidate answered non-200");
                }
                Err(e) => {
                    debug!(host = %host, error = %e, "candidate unreachable");
                }
            }
        }
        None
    }
}
