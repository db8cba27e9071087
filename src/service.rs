use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::submission::SubmissionPayload;

const EMPLOYER_PROFILE_PATH: &str = "/api/employers/me";
const CREATE_JOB_PATH: &str = "/api/jobs";

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const CREATE_JOB_FALLBACK_MESSAGE: &str = "Failed to create job posting. Please try again.";
pub const PROFILE_CHECK_FALLBACK_MESSAGE: &str = "Failed to check employer profile.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not reach the job service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a failure status. `message` is the
    /// backend's own wording when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response from the job service: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    Ready,
    /// The employer has to create a profile before posting jobs.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedJob {
    pub id: String,
}

// --- Service trait ---

pub trait JobService {
    fn employer_profile(&self) -> Result<ProfileStatus, ServiceError>;
    fn create_job(&self, payload: &SubmissionPayload) -> Result<CreatedJob, ServiceError>;
}

// --- HTTP implementation ---

#[derive(Debug)]
pub struct HttpJobService {
    base_url: String,
    api_token: Option<String>,
    client: Client,
}

impl HttpJobService {
    pub fn new(base_url: &str, api_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "job service request");
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl JobService for HttpJobService {
    fn employer_profile(&self) -> Result<ProfileStatus, ServiceError> {
        let response = self.request(Method::GET, EMPLOYER_PROFILE_PATH).send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(ProfileStatus::Missing);
        }
        if status.is_success() {
            return Ok(ProfileStatus::Ready);
        }

        let body = response.text().unwrap_or_default();
        Err(ServiceError::Rejected {
            status: status.as_u16(),
            message: error_message(&body, PROFILE_CHECK_FALLBACK_MESSAGE),
        })
    }

    fn create_job(&self, payload: &SubmissionPayload) -> Result<CreatedJob, ServiceError> {
        let response = self
            .request(Method::POST, CREATE_JOB_PATH)
            .json(payload)
            .send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: error_message(&body, CREATE_JOB_FALLBACK_MESSAGE),
            });
        }

        parse_created_job(&body)
    }
}

// --- Response helpers ---

/// The backend's error wording from a JSON body, or `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback.to_string();
    };

    let candidates = [
        value.get("message"),
        value.get("error").filter(|error| error.is_string()),
        value.get("error").and_then(|error| error.get("message")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Accepts `{"id": ..}`, `{"job": {"id": ..}}` and `{"data": {"id": ..}}`,
/// with string or numeric ids.
pub fn parse_created_job(body: &str) -> Result<CreatedJob, ServiceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ServiceError::UnexpectedResponse(format!("invalid JSON: {}", err)))?;

    let id = [Some(&value), value.get("job"), value.get("data")]
        .into_iter()
        .flatten()
        .filter_map(|object| object.get("id"))
        .find_map(|id| match id {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .ok_or_else(|| ServiceError::UnexpectedResponse("missing job id".to_string()))?;

    Ok(CreatedJob { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobDraft;
    use crate::submission::transform_for_submission;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one request with a canned response and hands back the
    /// raw request line and body.
    fn one_shot_server(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut content_length = 0usize;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }

            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            (request_line, String::from_utf8(request_body).unwrap())
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_error_message_prefers_backend_wording() {
        assert_eq!(
            error_message(r#"{"message":"Title is too long"}"#, "fallback"),
            "Title is too long"
        );
        assert_eq!(error_message(r#"{"error":"Forbidden"}"#, "fallback"), "Forbidden");
        assert_eq!(
            error_message(r#"{"error":{"message":"Quota reached"}}"#, "fallback"),
            "Quota reached"
        );
    }

    #[test]
    fn test_error_message_falls_back() {
        assert_eq!(error_message("<html>502</html>", "fallback"), "fallback");
        assert_eq!(error_message(r#"{"message":"  "}"#, "fallback"), "fallback");
        assert_eq!(error_message(r#"{"status":500}"#, "fallback"), "fallback");
    }

    #[test]
    fn test_parse_created_job_shapes() {
        assert_eq!(parse_created_job(r#"{"id":"job_1"}"#).unwrap().id, "job_1");
        assert_eq!(parse_created_job(r#"{"job":{"id":42}}"#).unwrap().id, "42");
        assert_eq!(parse_created_job(r#"{"data":{"id":"abc"}}"#).unwrap().id, "abc");
        assert!(matches!(
            parse_created_job(r#"{"ok":true}"#),
            Err(ServiceError::UnexpectedResponse(_))
        ));
        assert!(matches!(
            parse_created_job("not json"),
            Err(ServiceError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_profile_not_found_means_missing() {
        let (base_url, handle) = one_shot_server("404 Not Found", r#"{"message":"not found"}"#);
        let service = HttpJobService::new(&base_url, Some("token".to_string())).unwrap();

        assert_eq!(service.employer_profile().unwrap(), ProfileStatus::Missing);

        let (request_line, _) = handle.join().unwrap();
        assert!(request_line.starts_with("GET /api/employers/me "));
    }

    #[test]
    fn test_create_job_posts_payload() {
        let (base_url, handle) = one_shot_server("201 Created", r#"{"job":{"id":"job_77"}}"#);
        let service = HttpJobService::new(&format!("{}/", base_url), None).unwrap();

        let draft = JobDraft {
            title: "Platform Engineer".to_string(),
            ..JobDraft::default()
        };
        let created = service.create_job(&transform_for_submission(&draft)).unwrap();
        assert_eq!(created.id, "job_77");

        let (request_line, body) = handle.join().unwrap();
        assert!(request_line.starts_with("POST /api/jobs "));
        let sent: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent["title"], "Platform Engineer");
        assert_eq!(sent["remote"], false);
    }

    #[test]
    fn test_create_job_surfaces_backend_message() {
        let (base_url, handle) =
            one_shot_server("422 Unprocessable Entity", r#"{"message":"Deadline is in the past"}"#);
        let service = HttpJobService::new(&base_url, None).unwrap();

        let err = service
            .create_job(&transform_for_submission(&JobDraft::default()))
            .unwrap_err();
        match err {
            ServiceError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Deadline is in the past");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        handle.join().unwrap();
    }
}
