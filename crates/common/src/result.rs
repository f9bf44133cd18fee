use crate::Len;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Enum of all the ways a call across the host/guest boundary can fail.
///
/// Failures the host reports on purpose (`Host`) are kept apart from failures in moving the bytes
/// (`Envelope`, `Truncated`, `Response`) so callers can branch on the variant instead of the
/// message text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Error)]
#[rustfmt::skip]
pub enum WasmErrorInner {
    /// a pointer or length could not be represented as a WasmSize
    /// wasm memory is at most 4GB so this is always a bug somewhere
    #[error("pointer or length does not fit in wasm linear memory")]
    PointerMap,
    /// the host reported writing more bytes than the buffer it was given could hold
    #[error("host reported {reported} bytes for a {capacity} byte buffer")]
    Truncated { reported: Len, capacity: Len },
    /// the bytes the host wrote as a response envelope did not decode
    #[error("malformed response envelope: {0}")]
    Envelope(String),
    /// the host handled the call and reported a failure, the message is the host's own text
    #[error("{0}")]
    Host(String),
    /// the envelope decoded but could not become an http response
    /// e.g. an out of range status code or an invalid header name
    #[error("invalid response: {0}")]
    Response(String),
    /// the configuration bytes from the host did not deserialize into the requested type
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WasmErrorInner {
    /// true if the host itself reported the failure rather than the bridge failing to move bytes
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host(_))
    }
}

impl From<std::num::TryFromIntError> for WasmErrorInner {
    fn from(_: std::num::TryFromIntError) -> Self {
        Self::PointerMap
    }
}

/// Wraps a WasmErrorInner with a file and line number.
/// The easiest way to generate this is with the `wasm_error!` macro that will
/// insert the correct file/line and can create strings by forwarding args to
/// the `format!` macro.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct WasmError {
    pub file: String,
    pub line: u32,
    pub error: WasmErrorInner,
}

impl WasmError {
    pub fn inner(&self) -> &WasmErrorInner {
        &self.error
    }

    pub fn into_inner(self) -> WasmErrorInner {
        self.error
    }
}

#[macro_export]
macro_rules! wasm_error {
    ($e:expr) => {
        $crate::WasmError {
            // On Windows the `file!()` macro returns a path with inconsistent formatting:
            // from the workspace to the package root it uses backwards-slashes,
            // then within the package it uses forwards-slashes.
            file: file!().replace('\\', "/").to_string(),
            line: line!(),
            error: $e.into(),
        }
    };
}
