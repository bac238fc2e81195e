// Request pipeline
//
// Every outbound call passes through here: the endpoint path is resolved
// against the base URL, the session credential is attached unless the
// endpoint is public, the shared client enforces the timeout, and the
// response is classified into a decoded body or an `Error`.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::session::SessionStore;
use crate::transport::TransportConfig;

/// Endpoints that must never carry a credential.
const PUBLIC_ENDPOINTS: &[&str] = &["auth/login", "auth/register"];

/// FastAPI-style error body: `{"detail": "..."}` or a list of `{msg}` items.
#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Attaches credentials, enforces timeouts, and normalizes responses.
///
/// Calls are independent of each other; the pipeline gives no ordering
/// guarantee between them.
pub struct RequestPipeline {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    timeout_secs: u64,
}

impl RequestPipeline {
    /// Build a pipeline with its own HTTP client from `transport`.
    ///
    /// `base_url` is the API root, e.g. `http://10.0.2.2:8000/api/`.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            session,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Ensure the base path ends with `/` so relative joins append to it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Whether a call to `path` should carry the session credential.
    pub fn requires_credential(path: &str) -> bool {
        let endpoint = path
            .trim_start_matches('/')
            .split('?')
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        !PUBLIC_ENDPOINTS.contains(&endpoint)
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn authorize(&self, path: &str, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        if !Self::requires_credential(path) {
            trace!(path, "public endpoint, no credential attached");
            return Ok(builder);
        }
        let Some(value) = self.session.authorization_header_value() else {
            trace!(path, "no credential held, sending unauthenticated");
            return Ok(builder);
        };
        let mut header = HeaderValue::from_str(value.expose_secret())
            .map_err(|_| Error::session("stored credential is not a valid header value"))?;
        header.set_sensitive(true);
        Ok(builder.header(AUTHORIZATION, header))
    }

    fn classify_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    // ── Execution ────────────────────────────────────────────────────

    async fn execute(
        &self,
        method: Method,
        path: &str,
        configure: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let builder = self.authorize(path, self.http.request(method, url))?;
        configure(builder)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.execute(Method::GET, path, |b| b).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!(?params, "query");
        let resp = self.execute(Method::GET, path, |b| b.query(params)).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.execute(Method::POST, path, |b| b.json(body)).await?;
        self.handle_response(resp).await
    }

    /// POST without a request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.execute(Method::POST, path, |b| b).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.execute(Method::PUT, path, |b| b.json(body)).await?;
        self.handle_response(resp).await
    }

    /// PUT without a request body.
    pub(crate) async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.execute(Method::PUT, path, |b| b).await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.execute(Method::DELETE, path, |b| b).await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }
        if body.trim().is_empty() {
            return Err(Error::EmptyBody {
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    fn parse_error(status: StatusCode, raw: &str) -> Error {
        let message = Self::detail_message(raw).unwrap_or_else(|| format!("HTTP {status}"));
        debug!(status = status.as_u16(), %message, "request rejected");
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Pull a human-readable message out of a `{detail}` error body.
    fn detail_message(raw: &str) -> Option<String> {
        let body: ErrorBody = serde_json::from_str(raw).ok()?;
        match body.detail {
            serde_json::Value::String(detail) => Some(detail),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn login_and_register_are_public() {
        assert!(!RequestPipeline::requires_credential("auth/login"));
        assert!(!RequestPipeline::requires_credential("/auth/register"));
        assert!(!RequestPipeline::requires_credential("auth/login/"));
        assert!(RequestPipeline::requires_credential("auth/me"));
        assert!(RequestPipeline::requires_credential("auth/logout"));
        assert!(RequestPipeline::requires_credential("students?search=login"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = RequestPipeline::normalize_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("classes/3").unwrap().as_str(),
            "http://localhost:8000/api/classes/3"
        );
    }

    #[test]
    fn string_detail_is_verbatim() {
        assert_eq!(
            RequestPipeline::detail_message(r#"{"detail":"Class not found"}"#).as_deref(),
            Some("Class not found")
        );
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let raw = r#"{"detail":[{"loc":["body","email"],"msg":"field required"},{"msg":"value is not a valid email"}]}"#;
        assert_eq!(
            RequestPipeline::detail_message(raw).as_deref(),
            Some("field required; value is not a valid email")
        );
    }

    #[test]
    fn unparseable_body_falls_back_to_status_line() {
        let err = RequestPipeline::parse_error(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "HTTP 502 Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
