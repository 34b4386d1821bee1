// forge.rs — Blocking HTTP client for the embedded git forge API.

use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::GatewayError;

const API_PREFIX: &str = "/api/v1";
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Raw API response. Callers interpret status codes themselves because
/// "conflict" is a success for idempotent creates.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Created, or already present from an earlier run.
    pub fn is_ok_or_conflict(&self) -> bool {
        self.is_ok() || self.status == 409 || self.status == 422
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Client bound to one forge instance, optionally authenticated.
pub struct ForgeClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl ForgeClient {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self, GatewayError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn authorized(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => req.header("Authorization", format!("token {token}")),
            None => req,
        }
    }

    pub fn get(&self, path: &str) -> Result<ApiResponse, GatewayError> {
        let response = self.authorized(self.http.get(self.api_url(path))).send()?;
        Ok(ApiResponse {
            status: response.status().as_u16(),
            body: response.text()?,
        })
    }

    pub fn post(&self, path: &str, payload: &Value) -> Result<ApiResponse, GatewayError> {
        let response = self
            .authorized(self.http.post(self.api_url(path)).json(payload))
            .send()?;
        Ok(ApiResponse {
            status: response.status().as_u16(),
            body: response.text()?,
        })
    }

    /// Poll the health endpoint until the forge answers 200, checking
    /// every two seconds up to the deadline.
    pub fn wait_ready(&self, deadline: Duration) -> Result<(), GatewayError> {
        let started = Instant::now();
        let url = format!("{}/api/healthz", self.base_url);
        loop {
            match self.http.get(&url).send() {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(_) | Err(_) => {}
            }
            if started.elapsed() >= deadline {
                return Err(GatewayError::NotReady(deadline.as_secs()));
            }
            thread::sleep(READY_POLL_INTERVAL);
        }
    }
}
