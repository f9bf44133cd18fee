//! A scripted host for tests, records every import the bridge makes.

use crate::import::Imports;
use http_wasm_guest_common::*;
use parking_lot::Mutex;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    EnableFeatures(u64),
    GetConfig {
        capacity: usize,
    },
    LogEnabled(i32),
    Log(i32, Vec<u8>),
    HttpRequest {
        method: Vec<u8>,
        uri: Vec<u8>,
        body: Vec<u8>,
        envelope_capacity: usize,
        body_capacity: usize,
    },
}

pub struct FakeImports {
    granted: u64,
    config: Vec<u8>,
    min_level: i32,
    envelope: Vec<u8>,
    response_body: Vec<u8>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeImports {
    fn default() -> Self {
        Self {
            granted: u64::MAX,
            config: vec![],
            min_level: LogLevel::Info.as_i32(),
            envelope: br#"{"Code":200,"Body":0,"Headers":{}}"#.to_vec(),
            response_body: vec![],
            calls: Mutex::new(vec![]),
        }
    }
}

/// behaves like a well mannered host, writes what fits and reports the full size
fn write(buf: &mut [u8], bytes: &[u8]) -> PackedSize {
    let n = std::cmp::min(buf.len(), bytes.len());
    buf[..n].copy_from_slice(&bytes[..n]);
    bytes.len() as PackedSize
}

impl FakeImports {
    /// the host only ever turns on features inside this mask
    pub fn with_granted(mut self, granted: Features) -> Self {
        self.granted = granted.bits();
        self
    }

    pub fn with_config(mut self, config: Vec<u8>) -> Self {
        self.config = config;
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level.as_i32();
        self
    }

    pub fn with_response(self, envelope: &ResponseEnvelope, body: &[u8]) -> Self {
        self.with_raw_envelope(envelope.encode().unwrap())
            .with_response_body(body.to_vec())
    }

    pub fn with_raw_envelope(mut self, envelope: Vec<u8>) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_response_body(mut self, body: Vec<u8>) -> Self {
        self.response_body = body;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Imports for FakeImports {
    fn enable_features(&self, features: u64) -> u64 {
        self.record(Call::EnableFeatures(features));
        features & self.granted
    }

    fn get_config(&self, buf: &mut [u8]) -> PackedSize {
        self.record(Call::GetConfig {
            capacity: buf.len(),
        });
        write(buf, &self.config)
    }

    fn log_enabled(&self, level: i32) -> u32 {
        self.record(Call::LogEnabled(level));
        u32::from(level >= self.min_level)
    }

    fn log(&self, level: i32, message: &[u8]) {
        self.record(Call::Log(level, message.to_vec()));
    }

    fn http_request(
        &self,
        envelope_buf: &mut [u8],
        method: &[u8],
        uri: &[u8],
        body: &[u8],
        body_buf: &mut [u8],
    ) -> PackedSize {
        self.record(Call::HttpRequest {
            method: method.to_vec(),
            uri: uri.to_vec(),
            body: body.to_vec(),
            envelope_capacity: envelope_buf.len(),
            body_capacity: body_buf.len(),
        });
        write(body_buf, &self.response_body);
        write(envelope_buf, &self.envelope)
    }
}
