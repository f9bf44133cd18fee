use crate::allocation::read_bytes_exact;
use crate::config::BridgeConfig;
use crate::import::Imports;
use bytes::Bytes;
use http_wasm_guest_common::*;

/// The capabilities a guest gets from its host.
///
/// Application code should depend on this rather than on the imports so it can run against a
/// fake outside of a wasm runtime.
pub trait Host {
    /// Ask the host to turn on `features` and get back what is actually on.
    /// Anything missing from the result is unavailable, whatever was asked for.
    fn enable_features(&self, features: Features) -> Features;

    /// The raw configuration bytes the host holds for this guest.
    ///
    /// Fails with `WasmErrorInner::Truncated` rather than return part of the configuration.
    fn get_config(&self) -> Result<Vec<u8>, WasmError>;

    fn log_enabled(&self, level: LogLevel) -> bool;

    /// Send a message to the host log, an empty message never reaches the host.
    fn log(&self, level: LogLevel, message: &str);

    /// Have the host make an outbound http request.
    ///
    /// A failure the host reports comes back as `WasmErrorInner::Host` with the host's message,
    /// anything else means the response could not be read back across the boundary.
    fn http_request(
        &self,
        method: &str,
        uri: &str,
        body: &[u8],
    ) -> Result<http::Response<Bytes>, WasmError>;
}

impl<H: Host + ?Sized> Host for &H {
    fn enable_features(&self, features: Features) -> Features {
        (**self).enable_features(features)
    }

    fn get_config(&self) -> Result<Vec<u8>, WasmError> {
        (**self).get_config()
    }

    fn log_enabled(&self, level: LogLevel) -> bool {
        (**self).log_enabled(level)
    }

    fn log(&self, level: LogLevel, message: &str) {
        (**self).log(level, message)
    }

    fn http_request(
        &self,
        method: &str,
        uri: &str,
        body: &[u8],
    ) -> Result<http::Response<Bytes>, WasmError> {
        (**self).http_request(method, uri, body)
    }
}

/// Host implemented on top of a set of imports.
#[derive(Clone, Debug, Default)]
pub struct HostBridge<I> {
    imports: I,
    config: BridgeConfig,
}

impl<I: Imports> HostBridge<I> {
    pub fn new(imports: I) -> Self {
        Self::with_config(imports, BridgeConfig::default())
    }

    pub fn with_config(imports: I, config: BridgeConfig) -> Self {
        Self { imports, config }
    }

    pub fn imports(&self) -> &I {
        &self.imports
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl<I: Imports> Host for HostBridge<I> {
    fn enable_features(&self, features: Features) -> Features {
        let enabled = Features::from_bits(self.imports.enable_features(features.bits()));
        tracing::debug!(requested = %features, %enabled, "enable features");
        enabled
    }

    fn get_config(&self) -> Result<Vec<u8>, WasmError> {
        read_bytes_exact(
            self.config.config_capacity,
            self.config.config_limit,
            |buf| self.imports.get_config(buf),
        )
        .require_complete()
    }

    fn log_enabled(&self, level: LogLevel) -> bool {
        self.imports.log_enabled(level.as_i32()) == 1
    }

    fn log(&self, level: LogLevel, message: &str) {
        if message.is_empty() {
            return;
        }
        self.imports.log(level.as_i32(), message.as_bytes());
    }

    fn http_request(
        &self,
        method: &str,
        uri: &str,
        body: &[u8],
    ) -> Result<http::Response<Bytes>, WasmError> {
        crate::outbound::round_trip(&self.imports, &self.config, method, uri, body)
    }
}

#[cfg(target_arch = "wasm32")]
pub type WasmHost = HostBridge<crate::import::WasmImports>;

/// the host this guest is running in
#[cfg(target_arch = "wasm32")]
pub fn host() -> WasmHost {
    HostBridge::new(crate::import::WasmImports)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::fake::Call;
    use crate::fake::FakeImports;

    #[test]
    fn log_empty_message_skips_host_test() {
        let imports = FakeImports::default();
        let host = HostBridge::new(&imports);
        host.log(LogLevel::Error, "");
        assert!(imports.calls().is_empty());
    }

    #[test]
    fn log_test() {
        let imports = FakeImports::default();
        let host = HostBridge::new(&imports);
        host.log(LogLevel::Warn, "disk ╰▐ ✖ full");
        host.log(LogLevel::Debug, "x");
        assert_eq!(
            vec![
                Call::Log(1, "disk ╰▐ ✖ full".as_bytes().to_vec()),
                Call::Log(-1, b"x".to_vec()),
            ],
            imports.calls()
        );
    }

    #[test]
    fn log_enabled_test() {
        let imports = FakeImports::default().with_min_level(LogLevel::Warn);
        let host = HostBridge::new(&imports);
        assert!(!host.log_enabled(LogLevel::Debug));
        assert!(!host.log_enabled(LogLevel::Info));
        assert!(host.log_enabled(LogLevel::Warn));
        assert!(host.log_enabled(LogLevel::Error));
        assert_eq!(
            vec![
                Call::LogEnabled(-1),
                Call::LogEnabled(0),
                Call::LogEnabled(1),
                Call::LogEnabled(2),
            ],
            imports.calls()
        );
    }

    #[test]
    fn enable_features_subset_test() {
        let imports =
            FakeImports::default().with_granted(Features::BUFFER_RESPONSE | Features::TRAILERS);
        let host = HostBridge::new(&imports);
        for bits in 0..16 {
            let requested = Features::from_bits(bits);
            let enabled = host.enable_features(requested);
            assert!(enabled.is_subset_of(requested));
        }
        assert_eq!(
            Features::BUFFER_RESPONSE,
            host.enable_features(Features::BUFFER_REQUEST | Features::BUFFER_RESPONSE)
        );
        assert_eq!(
            Features::empty(),
            host.enable_features(Features::BUFFER_REQUEST)
        );
    }

    #[test]
    fn get_config_test() {
        let imports = FakeImports::default().with_config(br#"{"a":1}"#.to_vec());
        let host = HostBridge::new(&imports);
        assert_eq!(br#"{"a":1}"#.to_vec(), host.get_config().unwrap());
        assert_eq!(vec![Call::GetConfig { capacity: 2048 }], imports.calls());
    }

    #[test]
    fn get_config_empty_test() {
        let imports = FakeImports::default();
        let host = HostBridge::new(&imports);
        assert!(host.get_config().unwrap().is_empty());
    }

    #[test]
    fn get_config_larger_than_buffer_test() {
        let config: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
        let imports = FakeImports::default().with_config(config.clone());
        let host = HostBridge::new(&imports);
        assert_eq!(config, host.get_config().unwrap());
        assert_eq!(
            vec![
                Call::GetConfig { capacity: 2048 },
                Call::GetConfig { capacity: 5000 },
            ],
            imports.calls()
        );
    }

    #[test]
    fn get_config_capacity_test() {
        let imports = FakeImports::default().with_config(vec![1; 100]);
        let host =
            HostBridge::with_config(&imports, BridgeConfig::default().with_config_capacity(128));
        assert_eq!(vec![1; 100], host.get_config().unwrap());
        assert_eq!(vec![Call::GetConfig { capacity: 128 }], imports.calls());
        assert_eq!(128, host.config().config_capacity);
    }

    #[test]
    fn get_config_over_limit_test() {
        let imports = FakeImports::default().with_config(vec![1; 300]);
        let host = HostBridge::with_config(
            &imports,
            BridgeConfig::default()
                .with_config_capacity(100)
                .with_config_limit(200),
        );
        match host.get_config() {
            Err(WasmError {
                error: WasmErrorInner::Truncated { reported: 300, capacity: 100 },
                ..
            }) => {}
            other => panic!("expected truncation, got {:?}", other),
        }
        assert_eq!(vec![Call::GetConfig { capacity: 100 }], imports.calls());
    }

    /// reports one byte more than every buffer it is handed
    struct GrowingConfig;

    impl Imports for GrowingConfig {
        fn enable_features(&self, features: u64) -> u64 {
            features
        }

        fn get_config(&self, buf: &mut [u8]) -> PackedSize {
            buf.fill(b'x');
            buf.len() as PackedSize + 1
        }

        fn log_enabled(&self, _level: i32) -> u32 {
            0
        }

        fn log(&self, _level: i32, _message: &[u8]) {}

        fn http_request(
            &self,
            _envelope_buf: &mut [u8],
            _method: &[u8],
            _uri: &[u8],
            _body: &[u8],
            _body_buf: &mut [u8],
        ) -> PackedSize {
            0
        }
    }

    #[test]
    fn get_config_truncated_after_retry_test() {
        let host = HostBridge::with_config(
            GrowingConfig,
            BridgeConfig::default().with_config_capacity(4),
        );
        match host.get_config() {
            Err(WasmError {
                error: WasmErrorInner::Truncated { reported: 6, capacity: 5 },
                ..
            }) => {}
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn host_through_reference_test() {
        fn warn_all<H: Host>(host: H, messages: &[&str]) {
            for message in messages {
                if host.log_enabled(LogLevel::Warn) {
                    host.log(LogLevel::Warn, message);
                }
            }
        }

        let imports = FakeImports::default().with_min_level(LogLevel::Error);
        let host = HostBridge::new(&imports);
        warn_all(&host, &["a", "b"]);
        assert_eq!(
            vec![Call::LogEnabled(1), Call::LogEnabled(1)],
            host.imports().calls()
        );
    }
}
