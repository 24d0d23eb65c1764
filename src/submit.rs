//! Remote logger: reports each generated card to a spreadsheet endpoint.
//!
//! The record is sent once as a JSON string inside a multipart form field
//! named `data`. There is no retry, no timeout and no queueing; the outcome
//! only ever becomes a [`SubmissionStatus`].

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::form::{Field, FormFields};
use crate::identity::CardDetails;
use crate::Result;

/// Shown when the endpoint rejects a record without saying why
pub const FAILED_TO_SEND: &str = "Failed to send data.";

/// Name of the multipart field carrying the JSON record
pub const FORM_FIELD: &str = "data";

/// Row appended to the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub name: String,
    pub dob: String,
    pub aadhar: String,
    pub id_number: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub whatsapp: String,
    pub issued_date: String,
    pub expires_on: String,
}

impl SubmissionRecord {
    /// Raw form values plus the identifier and formatted dates of the card
    pub fn new(form: &FormFields, details: &CardDetails) -> Self {
        Self {
            name: form.get(Field::Name).to_string(),
            dob: form.get(Field::DateOfBirth).to_string(),
            aadhar: form.get(Field::IdentifierSeed).to_string(),
            id_number: details.id_number.clone(),
            city: form.get(Field::City).to_string(),
            state: form.get(Field::Region).to_string(),
            pincode: form.get(Field::PostalCode).to_string(),
            whatsapp: form.get(Field::ContactNumber).to_string(),
            issued_date: details.dates.issued_display(),
            expires_on: details.dates.expires_display(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Other(e.to_string()))
    }
}

/// Body returned by the endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SheetResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of the most recent submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Unset,
    Success,
    Error(String),
}

impl SubmissionStatus {
    /// Map a transport result onto a status. Anything but an explicit
    /// `"success"` is an error carrying the endpoint's message, or
    /// [`FAILED_TO_SEND`] when it gave none.
    pub fn from_result(result: Result<SheetResponse>) -> Self {
        match result {
            Ok(resp) if resp.status.as_deref() == Some("success") => SubmissionStatus::Success,
            Ok(resp) => SubmissionStatus::Error(
                resp.message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FAILED_TO_SEND.to_string()),
            ),
            Err(e) => {
                let text = e.to_string();
                SubmissionStatus::Error(if text.is_empty() { FAILED_TO_SEND.to_string() } else { text })
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubmissionStatus::Error(_))
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Unset => Ok(()),
            SubmissionStatus::Success => f.write_str("Data saved successfully!"),
            SubmissionStatus::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Transport for submission records
pub trait Submitter: Send + Sync {
    /// Send one record and return the parsed reply.
    fn submit<'a>(&'a self, record: &'a SubmissionRecord) -> BoxFuture<'a, Result<SheetResponse>>;
}

#[cfg(feature = "remote")]
pub use self::sheet::SheetSubmitter;

#[cfg(feature = "remote")]
mod sheet {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use log::debug;
    use reqwest::multipart::Form;
    use reqwest::Client;

    use super::{SheetResponse, SubmissionRecord, Submitter, FORM_FIELD};
    use crate::{Error, GeneratorConfig, Result};

    /// Posts records to a spreadsheet web app over HTTP
    pub struct SheetSubmitter {
        client: Client,
        endpoint: String,
    }

    impl SheetSubmitter {
        pub fn new(config: &GeneratorConfig) -> Result<Self> {
            let client = Client::builder()
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| {
                    Error::ConfigError(format!("Failed to build HTTP client: {}", e))
                })?;
            Ok(Self { client, endpoint: config.endpoint.clone() })
        }

        async fn post(&self, record: &SubmissionRecord) -> Result<SheetResponse> {
            let form = Form::new().text(FORM_FIELD, record.to_json()?);
            let res = self.client.post(&self.endpoint).multipart(form).send().await?;
            debug!("submission answered with HTTP {}", res.status());
            let body = res.bytes().await?;
            serde_json::from_slice(&body).map_err(|e| Error::Other(e.to_string()))
        }
    }

    impl Submitter for SheetSubmitter {
        fn submit<'a>(&'a self, record: &'a SubmissionRecord) -> BoxFuture<'a, Result<SheetResponse>> {
            self.post(record).boxed()
        }
    }
}
