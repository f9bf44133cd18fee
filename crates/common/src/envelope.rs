use crate::wasm_error;
use crate::Len;
use crate::WasmError;
use crate::WasmErrorInner;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use std::collections::BTreeMap;

/// header name to every value sent for it, in the order the host received them
pub type Headers = BTreeMap<String, Vec<String>>;

/// The metadata the host writes ahead of an outbound response body.
///
/// On the wire this is JSON with the exact field names `Code`, `Body` and `Headers`.
/// `Body` is the length of the body the host wrote into the separate body buffer, not the body.
///
/// A `Code` of 0 means the call failed on the host and the body buffer holds an error message
/// instead of a response body, in which case `headers` means nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "Code")]
    pub code: u32,
    #[serde(rename = "Body")]
    pub body_len: Len,
    #[serde(rename = "Headers", default, deserialize_with = "null_as_empty")]
    pub headers: Headers,
}

/// hosts written in go send `null` for a response without headers
fn null_as_empty<'de, D>(deserializer: D) -> Result<Headers, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Headers>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResponseEnvelope {
    pub const HOST_ERROR_CODE: u32 = 0;

    pub fn decode(bytes: &[u8]) -> Result<Self, WasmError> {
        serde_json::from_slice(bytes)
            .map_err(|e| wasm_error!(WasmErrorInner::Envelope(e.to_string())))
    }

    pub fn encode(&self) -> Result<Vec<u8>, WasmError> {
        serde_json::to_vec(self).map_err(|e| wasm_error!(WasmErrorInner::Envelope(e.to_string())))
    }

    pub fn is_host_error(&self) -> bool {
        self.code == Self::HOST_ERROR_CODE
    }
}
