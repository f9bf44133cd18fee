pub use crate::config::BridgeConfig;
pub use crate::config::Truncation;
pub use crate::host::Host;
pub use crate::host::HostBridge;
#[cfg(target_arch = "wasm32")]
pub use crate::host::{host, WasmHost};
pub use crate::import::Imports;
#[cfg(target_arch = "wasm32")]
pub use crate::import::WasmImports;
pub use crate::outbound::send;
pub use crate::outbound::BodyTruncated;
pub use crate::outbound::Client;
pub use http_wasm_guest_common::wasm_error;
pub use http_wasm_guest_common::Features;
pub use http_wasm_guest_common::LogLevel;
pub use http_wasm_guest_common::WasmError;
pub use http_wasm_guest_common::WasmErrorInner;
