use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::field::field_model::FieldDescriptor;
use crate::session::error::AutofillError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5055/api/get_autofill_data";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Map of field id to backend-supplied value.
///
/// Entirely untrusted input: the filler only looks keys up against live
/// elements. Ordered so fill application is deterministic.
pub type AutofillResponse = BTreeMap<String, String>;

pub trait AutofillBackend {
    /// Request values for one chunk of descriptors (at most
    /// [`BATCH_SIZE`](crate::dispatch::queue::BATCH_SIZE)).
    fn request_values(&self, fields: &[FieldDescriptor]) -> Result<AutofillResponse, AutofillError>;
}

#[derive(Serialize)]
struct AutofillRequest<'a> {
    form_fields: &'a [FieldDescriptor],
}

/// Blocking HTTP client for the autofill service.
///
/// The per-request timeout and retry count are a deliberate departure from
/// the fire-and-forget behavior this pipeline was modeled on; retries
/// default to zero so the observed behavior holds unless opted in.
pub struct HttpBackend {
    pub endpoint: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: 0,
        }
    }
}

impl HttpBackend {
    pub fn new(endpoint: &str, timeout_ms: u64, max_retries: u32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout_ms,
            max_retries,
        }
    }

    fn try_once(
        &self,
        client: &reqwest::blocking::Client,
        request: &AutofillRequest<'_>,
    ) -> Result<AutofillResponse, AutofillError> {
        let response = client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(AutofillError::BackendTransport)?;

        if !response.status().is_success() {
            return Err(AutofillError::BackendStatus {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<AutofillResponse>()
            .map_err(AutofillError::BackendTransport)
    }
}

impl AutofillBackend for HttpBackend {
    fn request_values(&self, fields: &[FieldDescriptor]) -> Result<AutofillResponse, AutofillError> {
        let request = AutofillRequest {
            form_fields: fields,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(AutofillError::BackendTransport)?;

        let mut attempt = 0;
        loop {
            match self.try_once(&client, &request) {
                Ok(values) => return Ok(values),
                Err(error) if attempt < self.max_retries => {
                    eprintln!(
                        "Autofill request failed (attempt {} of {}): {}",
                        attempt + 1,
                        self.max_retries + 1,
                        error
                    );
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Canned backend for tests and offline runs.
///
/// Answers each chunk from a fixed map, returning only the keys the chunk
/// asked for — the same shape a live backend produces.
#[derive(Debug, Default)]
pub struct StaticBackend {
    pub values: AutofillResponse,
}

impl StaticBackend {
    pub fn new(values: AutofillResponse) -> Self {
        Self { values }
    }
}

impl AutofillBackend for StaticBackend {
    fn request_values(&self, fields: &[FieldDescriptor]) -> Result<AutofillResponse, AutofillError> {
        Ok(fields
            .iter()
            .filter_map(|f| self.values.get(&f.id).map(|v| (f.id.clone(), v.clone())))
            .collect())
    }
}
