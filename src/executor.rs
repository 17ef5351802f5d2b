//! Request execution: sign, send, classify, decode.
//!
//! The executor is stateless between calls. Every call builds a fresh
//! signed request, makes exactly one transport round trip bounded by the
//! configured timeout, and never retries: provider operations such as key
//! creation are not idempotent, so retry policy belongs to the caller.

use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::signer::{Request, Signer};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use log::{debug, trace, warn};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF-8";

/// A call against one provider service.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Service name used for endpoint resolution, e.g. `kms`.
    pub service: &'static str,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn get(service: &'static str, path: impl Into<String>) -> Self {
        Self {
            service,
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A POST carrying `body` serialized as JSON.
    pub fn post_json<B: Serialize>(
        service: &'static str,
        path: impl Into<String>,
        body: &B,
    ) -> Result<Self> {
        let body = serde_json::to_vec(body)
            .map_err(|e| Error::Encoding(format!("failed to serialize request body: {e}")))?;
        Ok(Self {
            service,
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        })
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Signs and dispatches [`ApiRequest`]s over a [`Transport`].
#[derive(Debug, Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    signer: Signer,
    credential: Arc<Credential>,
    config: Arc<ClientConfig>,
}

impl Executor {
    pub fn new(
        credential: Arc<Credential>,
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            signer: Signer::new(),
            credential,
            config,
        }
    }

    /// Replace the signer, e.g. to pin the signing time in tests.
    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.signer = signer;
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL for `service` in the credential's region.
    pub fn endpoint(&self, service: &str) -> String {
        self.config.endpoint(service, self.credential.region())
    }

    /// Execute `request` and decode a successful JSON body into `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        serde_json::from_slice(&response.body).map_err(Error::from)
    }

    /// Execute `request` and return the raw successful response.
    ///
    /// Non-2xx statuses are turned into errors here.
    pub async fn send(&self, request: ApiRequest) -> Result<HttpResponse> {
        let base_url = self.endpoint(request.service);
        let host = host_header(&base_url)?;

        let mut unsigned = Request::new(request.method, request.path)
            .header("Host", host)
            .header("Content-Type", CONTENT_TYPE_JSON)
            .header("X-Project-Id", self.credential.project_id());
        if let Some(language) = &self.config.language {
            unsigned = unsigned.header("X-Language", language.as_str());
        }
        unsigned.query = request.query;
        if let Some(body) = request.body {
            unsigned.body = body;
        }

        let signed = self.signer.sign(unsigned, &self.credential)?;
        let url = signed.url(&base_url);
        debug!("{} {}", signed.method, url);
        trace!(
            "request headers: {:?}",
            signed
                .headers
                .iter()
                .filter(|(k, _)| !k.eq_ignore_ascii_case(crate::signer::AUTHORIZATION))
                .collect::<Vec<_>>()
        );

        let http = HttpRequest {
            method: signed.method,
            url,
            headers: signed.headers,
            body: signed.body,
        };

        let timeout = self.config.effective_timeout();
        let response = tokio::time::timeout(timeout, self.transport.send(http, timeout))
            .await
            .map_err(|_| Error::Transport(format!("request timed out after {timeout:?}")))??;
        debug!("response status: {}", response.status);

        classify(response)
    }
}

fn host_header(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)
        .map_err(|e| Error::Validation(format!("invalid endpoint {base_url:?}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::Validation(format!("endpoint {base_url:?} has no host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Map an HTTP status onto the error taxonomy.
fn classify(response: HttpResponse) -> Result<HttpResponse> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(response);
    }

    let (code, message) = parse_provider_error(&response.body);
    warn!("provider returned {status}: [{code}] {message}");
    match status {
        404 => Err(Error::NotFound { code, message }),
        400..=499 => Err(Error::Client {
            status_code: status,
            code,
            message,
        }),
        500..=599 => Err(Error::Server {
            status_code: status,
            code,
            message,
        }),
        _ => Err(Error::Protocol(format!("unexpected HTTP status {status}"))),
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
    #[serde(flatten)]
    inline: ErrorDetail,
}

#[derive(Deserialize, Default)]
struct ErrorDetail {
    #[serde(alias = "code")]
    error_code: Option<String>,
    #[serde(alias = "message")]
    error_msg: Option<String>,
}

/// Provider errors come as `{"error": {"error_code", "error_msg"}}` or with
/// the same fields at top level.
fn parse_provider_error(body: &[u8]) -> (String, String) {
    let parsed: Option<ErrorDetail> = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| match b.error {
            Some(detail) if detail.error_code.is_some() || detail.error_msg.is_some() => detail,
            _ => b.inline,
        });

    match parsed {
        Some(ErrorDetail {
            error_code: code,
            error_msg: message,
        }) if code.is_some() || message.is_some() => (
            code.unwrap_or_else(|| "unknown".to_string()),
            message.unwrap_or_default(),
        ),
        _ => {
            let text = String::from_utf8_lossy(body);
            ("unknown".to_string(), text.chars().take(256).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records requests and answers with a canned response.
    #[derive(Debug)]
    struct Canned {
        status: u16,
        body: &'static str,
        delay: Option<Duration>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                delay: None,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: HttpRequest, _timeout: Duration) -> Result<HttpResponse> {
            self.sent.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn executor(transport: Arc<Canned>, config: ClientConfig) -> Executor {
        let cred = Credential::new("AK", "SK", "cn-north-1", "proj", "dom");
        Executor::new(Arc::new(cred), Arc::new(config), transport)
    }

    fn config() -> ClientConfig {
        ClientConfig::new().with_endpoint("kms", "http://127.0.0.1:18080")
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Amount {
        instance_num: u32,
    }

    #[tokio::test]
    async fn test_execute_signs_and_decodes() {
        let transport = Canned::new(200, r#"{"instance_num": 3}"#);
        let exec = executor(transport.clone(), config().with_language("zh-cn"));

        let amount: Amount = exec
            .execute(ApiRequest::get("kms", "/v1.0/proj/kms/user-instances"))
            .await
            .unwrap();
        assert_eq!(amount, Amount { instance_num: 3 });

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://127.0.0.1:18080/v1.0/proj/kms/user-instances");
        let header = |name: &str| {
            sent[0]
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };
        assert_eq!(header("host").as_deref(), Some("127.0.0.1:18080"));
        assert_eq!(header("x-project-id").as_deref(), Some("proj"));
        assert_eq!(header("x-language").as_deref(), Some("zh-cn"));
        assert!(header("x-sdk-date").is_some());
        assert!(header("authorization").unwrap().starts_with("SDK-HMAC-SHA256 Access=AK"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases: Vec<(u16, &'static str)> = vec![
            (400, r#"{"error": {"error_code": "KMS.0205", "error_msg": "bad state"}}"#),
            (404, r#"{"error_code": "KMS.0207", "error_msg": "no such key"}"#),
            (500, "internal failure"),
            (302, ""),
        ];
        let mut errors = Vec::new();
        for (status, body) in cases {
            let exec = executor(Canned::new(status, body), config());
            let result: Result<Amount> = exec.execute(ApiRequest::get("kms", "/v1.0/proj/kms/x")).await;
            errors.push(result.unwrap_err());
        }

        match &errors[0] {
            Error::Client {
                status_code,
                code,
                message,
            } => {
                assert_eq!(*status_code, 400);
                assert_eq!(code, "KMS.0205");
                assert_eq!(message, "bad state");
            }
            other => panic!("expected client error, got {other:?}"),
        }
        assert!(matches!(&errors[1], Error::NotFound { code, .. } if code == "KMS.0207"));
        match &errors[2] {
            Error::Server { status_code, code, message } => {
                assert_eq!(*status_code, 500);
                assert_eq!(code, "unknown");
                assert_eq!(message, "internal failure");
            }
            other => panic!("expected server error, got {other:?}"),
        }
        assert!(matches!(&errors[3], Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_protocol_error() {
        let exec = executor(Canned::new(200, "<html>oops</html>"), config());
        let result: Result<Amount> = exec.execute(ApiRequest::get("kms", "/v1.0/proj/kms/x")).await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let transport = Arc::new(Canned {
            status: 200,
            body: "{}",
            delay: Some(Duration::from_millis(500)),
            sent: Mutex::new(Vec::new()),
        });
        let exec = executor(transport, config().with_timeout(Duration::from_millis(20)));
        let result: Result<Amount> = exec.execute(ApiRequest::get("kms", "/v1.0/proj/kms/x")).await;
        match result {
            Err(err @ Error::Transport(_)) => assert!(err.is_retryable()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_credential_sends_nothing() {
        let transport = Canned::new(200, "{}");
        let cred = Credential::new("AK", "SK", "cn-north-1", "", "dom");
        let exec = Executor::new(Arc::new(cred), Arc::new(config()), transport.clone());
        let result: Result<Amount> = exec.execute(ApiRequest::get("kms", "/v1.0/proj/kms/x")).await;
        assert!(matches!(result, Err(Error::Credential(_))));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parse_provider_error_shapes() {
        let nested = br#"{"error": {"error_code": "KMS.0303", "error_msg": "quota"}}"#;
        assert_eq!(
            parse_provider_error(nested),
            ("KMS.0303".to_string(), "quota".to_string())
        );
        let alias = br#"{"code": "NAT.0001", "message": "bad"}"#;
        assert_eq!(
            parse_provider_error(alias),
            ("NAT.0001".to_string(), "bad".to_string())
        );
        assert_eq!(
            parse_provider_error(b""),
            ("unknown".to_string(), String::new())
        );
    }

    #[test]
    fn test_host_header() {
        assert_eq!(
            host_header("https://kms.cn-north-1.myhuaweicloud.com").unwrap(),
            "kms.cn-north-1.myhuaweicloud.com"
        );
        assert_eq!(host_header("http://127.0.0.1:8080").unwrap(), "127.0.0.1:8080");
        assert!(matches!(host_header("not a url"), Err(Error::Validation(_))));
    }
}
