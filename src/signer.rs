//! AK/SK request signing.
//!
//! Implements the provider's `SDK-HMAC-SHA256` scheme:
//!
//! ```text
//! CanonicalRequest =
//!     Method + "\n" +
//!     CanonicalURI + "\n" +
//!     CanonicalQueryString + "\n" +
//!     CanonicalHeaders + "\n" +
//!     SignedHeaders + "\n" +
//!     HexEncode(SHA256(Body))
//!
//! StringToSign =
//!     "SDK-HMAC-SHA256" + "\n" +
//!     X-Sdk-Date + "\n" +
//!     HexEncode(SHA256(CanonicalRequest))
//!
//! Signature = HexEncode(HMAC-SHA256(SecretKey, StringToSign))
//! ```
//!
//! The `X-Sdk-Date` header bounds the replay window: the provider rejects
//! signatures whose timestamp is too far from its own clock.

use crate::credential::Credential;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use sha2::{Digest, Sha256};
use std::fmt::Write;

pub const ALGORITHM: &str = "SDK-HMAC-SHA256";
pub const X_SDK_DATE: &str = "X-Sdk-Date";
pub const AUTHORIZATION: &str = "Authorization";

const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Everything outside the RFC 3986 unreserved set is escaped.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Request descriptor handed to the signer.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Absolute path, e.g. `/v1.0/{project_id}/kms/describe-key`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// An empty request for `path`, which must start with `/`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Append a header. Every header is signed.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append an unencoded query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the body. It must be UTF-8 to be signed.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// A request carrying its authorization headers. Built per call.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Caller headers in insertion order, followed by `X-Sdk-Date` and
    /// `Authorization`.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    signature: String,
}

impl SignedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Hex-encoded signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Full URL for this request relative to `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), encode_path(&self.path));
        let query = canonical_query(&self.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

/// Signs requests with an AK/SK credential.
#[derive(Debug, Clone, Default)]
pub struct Signer {
    time: Option<DateTime<Utc>>,
}

impl Signer {
    /// A signer using the current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// Requests should always be signed with the current time.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign `request` with `credential`.
    ///
    /// Fails with [`Error::Credential`] if any credential field is empty,
    /// [`Error::Validation`] if the path is not absolute, and
    /// [`Error::Encoding`] if the body is not UTF-8.
    pub fn sign(&self, request: Request, credential: &Credential) -> Result<SignedRequest> {
        credential.validate()?;
        let Request {
            method,
            path,
            query,
            mut headers,
            body: raw_body,
        } = request;
        if !path.starts_with('/') {
            return Err(Error::Validation(format!(
                "request path must be absolute, got {path:?}"
            )));
        }
        let body = std::str::from_utf8(&raw_body)
            .map_err(|e| Error::Encoding(format!("request body is not valid UTF-8: {e}")))?;

        let now = self.time.unwrap_or_else(Utc::now);
        let date = now.format(DATE_FORMAT).to_string();

        headers.retain(|(k, _)| {
            !k.eq_ignore_ascii_case(X_SDK_DATE) && !k.eq_ignore_ascii_case(AUTHORIZATION)
        });
        headers.push((X_SDK_DATE.to_string(), date.clone()));

        let (canonical_headers, signed_headers) = canonical_headers(&headers);
        let creq = canonical_request(
            &method,
            &path,
            &query,
            &canonical_headers,
            &signed_headers,
            body,
        )?;
        debug!("canonical request: {creq}");

        let string_to_sign = format!("{ALGORITHM}\n{date}\n{}", hex_sha256(creq.as_bytes()));
        debug!("string to sign: {string_to_sign}");

        let signature = hex_hmac_sha256(credential.secret_key().as_bytes(), string_to_sign.as_bytes())?;
        headers.push((
            AUTHORIZATION.to_string(),
            format!(
                "{ALGORITHM} Access={}, SignedHeaders={}, Signature={}",
                credential.access_key(),
                signed_headers,
                signature
            ),
        ));

        Ok(SignedRequest {
            method,
            path,
            query,
            headers,
            body: raw_body,
            timestamp: now,
            signature,
        })
    }
}

fn canonical_request(
    method: &Method,
    path: &str,
    query: &[(String, String)],
    canonical_headers: &str,
    signed_headers: &str,
    body: &str,
) -> Result<String> {
    let mut f = String::with_capacity(256);
    write_line(&mut f, method.as_str())?;
    write_line(&mut f, &canonical_uri(path))?;
    write_line(&mut f, &canonical_query(query))?;
    write_line(&mut f, canonical_headers)?;
    write_line(&mut f, signed_headers)?;
    write!(f, "{}", hex_sha256(body.as_bytes()))
        .map_err(|e| Error::Encoding(format!("failed to write body hash: {e}")))?;
    Ok(f)
}

fn write_line(f: &mut String, line: &str) -> Result<()> {
    writeln!(f, "{line}").map_err(|e| Error::Encoding(format!("failed to write canonical request: {e}")))
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, URI_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Encoded path, always terminated by `/`.
fn canonical_uri(path: &str) -> String {
    let mut uri = encode_path(path);
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}

/// Sorted, encoded `k=v` pairs joined by `&`.
pub(crate) fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, URI_ENCODE_SET).to_string(),
                utf8_percent_encode(v, URI_ENCODE_SET).to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns the canonical header block and the signed header list.
fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut sorted: Vec<(String, &str)> = headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.trim()))
        .collect();
    sorted.sort();

    let mut block = String::new();
    for (name, value) in &sorted {
        block.push_str(name);
        block.push(':');
        block.push_str(value);
        block.push('\n');
    }

    let mut names: Vec<&str> = sorted.iter().map(|(k, _)| k.as_str()).collect();
    names.dedup();
    (block, names.join(";"))
}

fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> Result<String> {
    let mut h = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| Error::Credential(format!("unusable secret key: {e}")))?;
    h.update(content);
    Ok(hex::encode(h.finalize().into_bytes()))
}
