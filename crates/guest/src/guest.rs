//! Guest side of the http-wasm handler ABI.
//!
//! Code running inside the wasm sandbox reaches the host's configuration, log and outbound http
//! only through the `http_handler` imports. Everything crossing over is a (pointer, length) pair
//! into guest memory, `import` is the only module that deals in those.
//!
//! Application code should take a `Host` so it can be tested against a fake:
//!
//! ```ignore
//! use http_wasm_guest::prelude::*;
//!
//! fn handle<H: Host>(host: &H) -> Result<(), WasmError> {
//!     host.log(LogLevel::Info, "starting");
//!     let response = host.http_request("GET", "http://backend/health", b"")?;
//!     if !response.status().is_success() {
//!         host.log(LogLevel::Warn, "backend unhealthy");
//!     }
//!     Ok(())
//! }
//!
//! handle(&host())
//! ```

pub use http_wasm_guest_common::*;

pub mod allocation;
pub mod config;
pub mod host;
pub mod import;
pub mod outbound;
pub mod prelude;

#[cfg(test)]
pub(crate) mod fake;
