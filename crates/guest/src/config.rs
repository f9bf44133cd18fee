use crate::host::Host;
use http_wasm_guest_common::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

/// the receive buffer size used when nothing else is configured
pub const DEFAULT_BUFFER_CAPACITY: Len = 2048;

/// the largest configuration the guest will allocate for when the host asks for more room
pub const DEFAULT_CONFIG_LIMIT: Len = 1 << 20;

/// What to do with a response body the host reports as larger than the body buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// keep what fits and mark the response with a `BodyTruncated` extension
    #[default]
    Clamp,
    /// fail the request with `WasmErrorInner::Truncated`
    Error,
}

/// Sizes of the buffers the guest lends the host, and the overflow policy.
///
/// None of these are part of the wire protocol, the host writes at most the capacity it is told
/// about and reports the size it wanted. Deserializes from snake_case JSON with every field
/// optional, so it can sit inside a guest's own configuration document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// first attempt size for reading configuration, larger configuration costs a second call
    pub config_capacity: Len,
    /// upper bound on the second configuration read, a host reporting more fails `get_config`
    pub config_limit: Len,
    /// buffer for the JSON response envelope
    pub envelope_capacity: Len,
    /// buffer for the response body
    pub body_capacity: Len,
    pub truncation: Truncation,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            config_capacity: DEFAULT_BUFFER_CAPACITY,
            config_limit: DEFAULT_CONFIG_LIMIT,
            envelope_capacity: DEFAULT_BUFFER_CAPACITY,
            body_capacity: DEFAULT_BUFFER_CAPACITY,
            truncation: Truncation::default(),
        }
    }
}

impl BridgeConfig {
    pub fn with_config_capacity(mut self, capacity: Len) -> Self {
        self.config_capacity = capacity;
        self
    }

    pub fn with_config_limit(mut self, limit: Len) -> Self {
        self.config_limit = limit;
        self
    }

    pub fn with_envelope_capacity(mut self, capacity: Len) -> Self {
        self.envelope_capacity = capacity;
        self
    }

    pub fn with_body_capacity(mut self, capacity: Len) -> Self {
        self.body_capacity = capacity;
        self
    }

    pub fn with_truncation(mut self, truncation: Truncation) -> Self {
        self.truncation = truncation;
        self
    }
}

/// Read the guest configuration from the host and deserialize it from JSON.
///
/// The host hands over opaque bytes, JSON is only a convention between a guest and whoever
/// configures it. Guests with another format should call `Host::get_config` directly.
pub fn from_host<T, H>(host: &H) -> Result<T, WasmError>
where
    T: DeserializeOwned,
    H: Host + ?Sized,
{
    let bytes = host.get_config()?;
    serde_json::from_slice(&bytes).map_err(|e| wasm_error!(WasmErrorInner::Config(e.to_string())))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::fake::FakeImports;
    use crate::host::HostBridge;

    #[derive(Debug, PartialEq, Deserialize)]
    struct GuestConfig {
        greeting: String,
        #[serde(default)]
        bridge: BridgeConfig,
    }

    #[test]
    fn default_test() {
        let config = BridgeConfig::default();
        assert_eq!(2048, config.config_capacity);
        assert_eq!(1 << 20, config.config_limit);
        assert_eq!(2048, config.envelope_capacity);
        assert_eq!(2048, config.body_capacity);
        assert_eq!(Truncation::Clamp, config.truncation);
    }

    #[test]
    fn builder_test() {
        let config = BridgeConfig::default()
            .with_config_capacity(1)
            .with_config_limit(4)
            .with_envelope_capacity(2)
            .with_body_capacity(3)
            .with_truncation(Truncation::Error);
        assert_eq!(
            BridgeConfig {
                config_capacity: 1,
                config_limit: 4,
                envelope_capacity: 2,
                body_capacity: 3,
                truncation: Truncation::Error,
            },
            config
        );
    }

    #[test]
    fn partial_deserialize_test() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"body_capacity":65536,"truncation":"error"}"#).unwrap();
        assert_eq!(
            BridgeConfig::default()
                .with_body_capacity(65536)
                .with_truncation(Truncation::Error),
            config
        );
    }

    #[test]
    fn from_host_test() {
        let imports = FakeImports::default()
            .with_config(br#"{"greeting":"hi","bridge":{"envelope_capacity":512}}"#.to_vec());
        let host = HostBridge::new(&imports);
        let config: GuestConfig = from_host(&host).unwrap();
        assert_eq!("hi", config.greeting);
        assert_eq!(512, config.bridge.envelope_capacity);
        assert_eq!(2048, config.bridge.body_capacity);
    }

    #[test]
    fn from_host_invalid_test() {
        let imports = FakeImports::default().with_config(b"greeting = 'hi'".to_vec());
        let host = HostBridge::new(&imports);
        match from_host::<GuestConfig, _>(&host) {
            Err(WasmError {
                error: WasmErrorInner::Config(_),
                ..
            }) => {}
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
