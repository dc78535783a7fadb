use futures::StreamExt;
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use std::env;
use std::time::{Duration, Instant};
use url::Url;

use crate::decoder::StreamTextDecoder;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_CHUNKS,
    STREAM_DURATION, STREAM_ERRORS, STREAM_FRAGMENTS,
};
use crate::types::{AskRequest, AskResponse, RepoListResponse, ScanRequest, ScanResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(200);

/// Receives decoded answer fragments as they arrive from the network.
///
/// Fragments are delivered synchronously, one at a time, in exactly the
/// order they arrived; empty fragments are suppressed before delivery.
/// A fragment is an arbitrary slice of the answer text and need not align
/// with any word or sentence boundary.
pub trait FragmentSink {
    /// Handle the next fragment of the streamed answer.
    fn on_fragment(&mut self, fragment: &str);
}

impl<F: FnMut(&str)> FragmentSink for F {
    fn on_fragment(&mut self, fragment: &str) {
        self(fragment)
    }
}

/// Client for the repository question-answering service.
#[derive(Debug, Clone)]
pub struct RepoLore {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl RepoLore {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the
    /// REPOLORE_BASE_URL environment variable; it defaults to the
    /// service's local development address.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var("REPOLORE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        Self::build(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var("REPOLORE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        Self::build(base_url, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    fn build(mut base_url: String, timeout: Duration) -> Result<Self> {
        // Endpoint paths are joined onto the base, so it must end in '/'.
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The configured request-duration ceiling.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Error::from)
    }

    /// Map a reqwest transport error to the matching error variant.
    fn request_error(&self, err: reqwest::Error) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        if err.is_timeout() {
            Error::timeout(
                format!("Request timed out: {err}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if err.is_connect() {
            Error::connection(format!("Connection error: {err}"), Some(Box::new(err)))
        } else {
            Error::http_client(format!("Request failed: {err}"), Some(Box::new(err)))
        }
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // The service reports errors as plain text bodies.
        let message = match response.text().await {
            Ok(body) if !body.is_empty() => body,
            Ok(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            Err(e) => format!("Failed to read error response: {e}"),
        };

        match status_code {
            400 => Error::bad_request(message, None),
            408 => Error::timeout(message, None),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message, retry_after),
            _ => Error::api(status_code, message),
        }
    }

    fn validate_ask(repo_identifier: &str, question: &str) -> Result<()> {
        if repo_identifier.trim().is_empty() {
            return Err(Error::validation(
                "repository identifier must not be blank",
                Some("repo_identifier".to_string()),
            ));
        }
        if question.trim().is_empty() {
            return Err(Error::validation(
                "question must not be blank",
                Some("question".to_string()),
            ));
        }
        Ok(())
    }

    /// Ask a question and stream the answer to `sink` as it arrives.
    ///
    /// Issues one request to the ask endpoint and consumes the chunked
    /// answer body incrementally, delivering each decoded non-empty
    /// fragment to `sink` in network arrival order. Resolves once the
    /// body is fully consumed, however many fragments were empty.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `repo_identifier` or `question` is blank
    ///   after trimming (no request is issued).
    /// - [`Error::NoBody`] if the response carries no readable body.
    /// - The network-failure family ([`Error::is_network_failure`]) if the
    ///   connection breaks before end-of-stream. Fragments already
    ///   delivered to `sink` remain valid and are not retracted.
    ///
    /// The client never retries; retry policy belongs to the caller.
    pub async fn ask_streamed(
        &self,
        repo_identifier: &str,
        question: &str,
        instructions: &str,
        sink: &mut dyn FragmentSink,
    ) -> Result<()> {
        Self::validate_ask(repo_identifier, question)?;
        let url = self.endpoint("ask_repo")?;
        let request = AskRequest::new(question, instructions, repo_identifier);

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(Error::no_body(
                "the ask endpoint returned a response with no readable body",
            ));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = StreamTextDecoder::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    STREAM_CHUNKS.click();
                    let fragment = decoder.decode(&bytes);
                    if !fragment.is_empty() {
                        STREAM_FRAGMENTS.click();
                        sink.on_fragment(&fragment);
                    }
                }
                Err(e) => {
                    STREAM_ERRORS.click();
                    return Err(if e.is_timeout() {
                        Error::timeout(
                            format!("Answer stream timed out: {e}"),
                            Some(self.timeout.as_secs_f64()),
                        )
                    } else {
                        Error::streaming(
                            format!("Error in answer stream: {e}"),
                            Some(Box::new(e)),
                        )
                    });
                }
            }
        }

        let tail = decoder.flush();
        if !tail.is_empty() {
            STREAM_FRAGMENTS.click();
            sink.on_fragment(&tail);
        }
        STREAM_DURATION.add(start.elapsed().as_secs_f64());
        Ok(())
    }

    /// Ask a question and aggregate the whole streamed answer.
    ///
    /// Convenience wrapper over the same endpoint for callers that do not
    /// care about incremental delivery.
    pub async fn ask(
        &self,
        repo_identifier: &str,
        question: &str,
        instructions: &str,
    ) -> Result<AskResponse> {
        let mut answer = String::new();
        self.ask_streamed(repo_identifier, question, instructions, &mut |fragment: &str| {
            answer.push_str(fragment)
        })
        .await?;
        Ok(AskResponse { answer })
    }

    /// Index a repository on the service.
    pub async fn scan(&self, repo_path: &str) -> Result<ScanResponse> {
        if repo_path.trim().is_empty() {
            return Err(Error::validation(
                "repository path must not be blank",
                Some("repo_path".to_string()),
            ));
        }
        let url = self.endpoint("scan_repo")?;

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .json(&ScanRequest::new(repo_path))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let scanned = response.json::<ScanResponse>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        Ok(scanned)
    }

    /// Retrieve the list of indexed repositories.
    pub async fn repos(&self) -> Result<RepoListResponse> {
        self.fetch_repo_list("repos").await
    }

    /// Retrieve the list of repositories available for indexing.
    pub async fn indexable_repos(&self) -> Result<RepoListResponse> {
        self.fetch_repo_list("indexable-repos").await
    }

    async fn fetch_repo_list(&self, path: &str) -> Result<RepoListResponse> {
        let url = self.endpoint(path)?;

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let list = response.json::<RepoListResponse>().await.map_err(|e| {
            Error::serialization(format!("Failed to parse response: {e}"), Some(Box::new(e)))
        })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::{
        chunked_response, json_response, serve_once, truncated_chunked_response,
    };

    #[tokio::test]
    async fn fragments_preserve_arrival_order() {
        let base = serve_once(chunked_response(&[b"It ", b"computes ", b"X."])).await;
        let client = RepoLore::new(Some(base)).unwrap();

        let mut fragments: Vec<String> = Vec::new();
        client
            .ask_streamed("demo", "What does X do?", "", &mut |f: &str| {
                fragments.push(f.to_string())
            })
            .await
            .unwrap();

        assert_eq!(fragments, vec!["It ", "computes ", "X."]);
        assert_eq!(fragments.concat(), "It computes X.");
    }

    #[tokio::test]
    async fn multibyte_scalar_split_across_chunks_decodes_cleanly() {
        // "é" split between two network chunks.
        let base = serve_once(chunked_response(&[
            b"caf\xC3".as_slice(),
            b"\xA9 au lait".as_slice(),
        ]))
        .await;
        let client = RepoLore::new(Some(base)).unwrap();

        let mut answer = String::new();
        client
            .ask_streamed("demo", "coffee?", "", &mut |f: &str| answer.push_str(f))
            .await
            .unwrap();

        assert_eq!(answer, "caf\u{e9} au lait");
    }

    #[tokio::test]
    async fn mid_stream_disconnect_is_a_network_failure() {
        let base = serve_once(truncated_chunked_response(&[b"Partial"])).await;
        let client = RepoLore::new(Some(base)).unwrap();

        let mut fragments: Vec<String> = Vec::new();
        let err = client
            .ask_streamed("demo", "q", "", &mut |f: &str| fragments.push(f.to_string()))
            .await
            .unwrap_err();

        assert!(err.is_network_failure());
        // Fragments delivered before the failure are not retracted.
        assert_eq!(fragments, vec!["Partial"]);
    }

    #[tokio::test]
    async fn no_content_response_is_no_body() {
        let base = serve_once(b"HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n".to_vec())
            .await;
        let client = RepoLore::new(Some(base)).unwrap();

        let err = client
            .ask_streamed("demo", "q", "", &mut |_: &str| {})
            .await
            .unwrap_err();
        assert!(err.is_no_body());
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let base = serve_once(
            b"HTTP/1.1 404 Not Found\r\n\
              content-length: 12\r\n\
              connection: close\r\n\r\nunknown repo"
                .to_vec(),
        )
        .await;
        let client = RepoLore::new(Some(base)).unwrap();

        let err = client
            .ask_streamed("demo", "q", "", &mut |_: &str| {})
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn blank_question_rejected_before_any_request() {
        // Port 9 is never contacted; validation fails first.
        let client = RepoLore::new(Some("http://127.0.0.1:9/".to_string())).unwrap();

        let err = client
            .ask_streamed("demo", "   ", "", &mut |_: &str| {})
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = client
            .ask_streamed("", "question", "", &mut |_: &str| {})
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn ask_aggregates_the_streamed_answer() {
        let base = serve_once(chunked_response(&[b"one ", b"two ", b"three"])).await;
        let client = RepoLore::new(Some(base)).unwrap();

        let response = client.ask("demo", "count", "").await.unwrap();
        assert_eq!(response.answer, "one two three");
    }

    #[tokio::test]
    async fn repos_parses_the_repo_list() {
        let base = serve_once(json_response(r#"{"repos":["alpha","beta"]}"#)).await;
        let client = RepoLore::new(Some(base)).unwrap();

        let list = client.repos().await.unwrap();
        assert_eq!(list.repos, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn scan_parses_the_new_identifier() {
        let base = serve_once(json_response(r#"{"repo_identifier":"project"}"#)).await;
        let client = RepoLore::new(Some(base)).unwrap();

        let scanned = client.scan("/home/user/project").await.unwrap();
        assert_eq!(scanned.repo_identifier, "project");
    }

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let client = RepoLore::new(Some("http://example.com/api".to_string())).unwrap();
        assert_eq!(client.base_url.as_str(), "http://example.com/api/");
    }
}
