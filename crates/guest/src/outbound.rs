use crate::allocation::GuestBuffer;
use crate::allocation::HostBytes;
use crate::config::BridgeConfig;
use crate::config::Truncation;
use crate::host::Host;
use crate::import::Imports;
use bytes::Bytes;
use http::header::HeaderName;
use http::header::HeaderValue;
use http::HeaderMap;
use http::Request;
use http::Response;
use http::StatusCode;
use http::Version;
use http_wasm_guest_common::*;

/// Response extension present when the host had more body than the body buffer could take.
/// The response body then holds only the first `capacity` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyTruncated {
    pub reported: Len,
    pub capacity: Len,
}

/// one outbound request through the http_request import
///
/// marshal → invoke → decode envelope → branch on host error → build the response
pub(crate) fn round_trip<I: Imports>(
    imports: &I,
    config: &BridgeConfig,
    method: &str,
    uri: &str,
    body: &[u8],
) -> Result<Response<Bytes>, WasmError> {
    let mut envelope_buf = GuestBuffer::zeroed(config.envelope_capacity);
    let mut body_buf = GuestBuffer::zeroed(config.body_capacity);

    let reported = imports.http_request(
        envelope_buf.as_mut_slice(),
        method.as_bytes(),
        uri.as_bytes(),
        body,
        body_buf.as_mut_slice(),
    );
    tracing::trace!(method, uri, reported, "http request crossed the boundary");

    decode_response(
        envelope_buf.into_host_bytes(reported),
        |body_len| body_buf.into_host_bytes(body_len),
        config.truncation,
    )
}

/// turn what the host wrote into a response or the host's error
///
/// `read_body` is only called once the envelope has decoded, with the body length it declares
fn decode_response<R>(
    envelope_bytes: HostBytes,
    read_body: R,
    truncation: Truncation,
) -> Result<Response<Bytes>, WasmError>
where
    R: FnOnce(Len) -> HostBytes,
{
    let envelope = decode_envelope(envelope_bytes)?;
    let body = read_body(envelope.body_len);

    if envelope.is_host_error() {
        return Err(wasm_error!(WasmErrorInner::Host(
            String::from_utf8_lossy(body.as_slice()).into_owned()
        )));
    }

    into_response(envelope, body, truncation)
}

/// a clamped envelope is cut off JSON, say so instead of surfacing the parse error
fn decode_envelope(envelope_bytes: HostBytes) -> Result<ResponseEnvelope, WasmError> {
    match ResponseEnvelope::decode(envelope_bytes.as_slice()) {
        Ok(envelope) => Ok(envelope),
        Err(_) if envelope_bytes.is_truncated() => Err(wasm_error!(WasmErrorInner::Truncated {
            reported: envelope_bytes.reported(),
            capacity: envelope_bytes.capacity(),
        })),
        Err(e) => Err(e),
    }
}

fn into_response(
    envelope: ResponseEnvelope,
    body: HostBytes,
    truncation: Truncation,
) -> Result<Response<Bytes>, WasmError> {
    let status = u16::try_from(envelope.code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| {
            wasm_error!(WasmErrorInner::Response(format!(
                "status code {} out of range",
                envelope.code
            )))
        })?;

    let mut headers = HeaderMap::new();
    for (name, values) in envelope.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            wasm_error!(WasmErrorInner::Response(format!("header {:?}: {}", name, e)))
        })?;
        for value in values {
            let value = HeaderValue::from_str(&value).map_err(|e| {
                wasm_error!(WasmErrorInner::Response(format!("header {}: {}", name, e)))
            })?;
            headers.append(&name, value);
        }
    }

    let truncated = body.is_truncated().then(|| BodyTruncated {
        reported: body.reported(),
        capacity: body.capacity(),
    });
    let body = match truncation {
        Truncation::Clamp => body.into_vec(),
        Truncation::Error => body.require_complete()?,
    };

    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    *response.version_mut() = Version::HTTP_11;
    *response.headers_mut() = headers;
    if let Some(truncated) = truncated {
        tracing::debug!(
            reported = truncated.reported,
            capacity = truncated.capacity,
            "response body clamped to buffer"
        );
        response.extensions_mut().insert(truncated);
    }
    Ok(response)
}

/// Send a request through the host.
///
/// Only the method, the full uri and the body cross the boundary, request headers and
/// extensions are not part of the host call and are dropped.
pub fn send<H, B>(host: &H, request: Request<B>) -> Result<Response<Bytes>, WasmError>
where
    H: Host + ?Sized,
    B: AsRef<[u8]>,
{
    let (parts, body) = request.into_parts();
    host.http_request(parts.method.as_str(), &parts.uri.to_string(), body.as_ref())
}

/// Reusable sender of outbound requests over a Host.
#[derive(Clone, Debug, Default)]
pub struct Client<H> {
    host: H,
}

impl<H: Host> Client<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn send<B: AsRef<[u8]>>(&self, request: Request<B>) -> Result<Response<Bytes>, WasmError> {
        send(&self.host, request)
    }
}
