use http_wasm_guest_common::PackedSize;

/// The functions the host exports to the guest, one per capability.
///
/// Arguments and return values are passed through untouched, nothing here checks what the host
/// sends back. The wasm32 implementation is the only place that turns guest bytes into raw
/// offsets, everything above it works with byte slices.
pub trait Imports {
    /// ask for `features`, returns the features that are now enabled
    fn enable_features(&self, features: u64) -> u64;

    /// host writes configuration into `buf`, returns the full size of the configuration
    fn get_config(&self, buf: &mut [u8]) -> PackedSize;

    /// 1 if the host would keep a message at `level`, otherwise 0
    fn log_enabled(&self, level: i32) -> u32;

    fn log(&self, level: i32, message: &[u8]);

    /// host performs the request then writes a JSON envelope into `envelope_buf` and the raw
    /// response body into `body_buf`, returns the full size of the envelope
    fn http_request(
        &self,
        envelope_buf: &mut [u8],
        method: &[u8],
        uri: &[u8],
        body: &[u8],
        body_buf: &mut [u8],
    ) -> PackedSize;
}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use crate::allocation::pin;
    use crate::allocation::pin_mut;
    use http_wasm_guest_common::GuestPtr;
    use http_wasm_guest_common::Len;
    use http_wasm_guest_common::PackedSize;

    #[link(wasm_import_module = "http_handler")]
    extern "C" {
        #[link_name = "enable_features"]
        fn __enable_features(features: u64) -> u64;

        #[link_name = "get_config"]
        fn __get_config(buf: GuestPtr, buf_limit: Len) -> PackedSize;

        #[link_name = "log_enabled"]
        fn __log_enabled(level: i32) -> u32;

        #[link_name = "log"]
        fn __log(level: i32, message: GuestPtr, message_len: Len);

        #[link_name = "http_request"]
        #[allow(clippy::too_many_arguments)]
        fn __http_request(
            envelope_buf: GuestPtr,
            envelope_buf_limit: Len,
            method: GuestPtr,
            method_len: Len,
            uri: GuestPtr,
            uri_len: Len,
            body: GuestPtr,
            body_len: Len,
            body_buf: GuestPtr,
            body_buf_limit: Len,
        ) -> PackedSize;
    }

    /// The real host, reached through the `http_handler` import module.
    ///
    /// Every buffer is pinned for exactly the duration of its call so the host never sees a
    /// dangling or moved offset.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct WasmImports;

    impl super::Imports for WasmImports {
        fn enable_features(&self, features: u64) -> u64 {
            unsafe { __enable_features(features) }
        }

        fn get_config(&self, buf: &mut [u8]) -> PackedSize {
            let buf = pin_mut(buf);
            unsafe { __get_config(buf.ptr(), buf.len()) }
        }

        fn log_enabled(&self, level: i32) -> u32 {
            unsafe { __log_enabled(level) }
        }

        fn log(&self, level: i32, message: &[u8]) {
            let message = pin(message);
            unsafe { __log(level, message.ptr(), message.len()) }
        }

        fn http_request(
            &self,
            envelope_buf: &mut [u8],
            method: &[u8],
            uri: &[u8],
            body: &[u8],
            body_buf: &mut [u8],
        ) -> PackedSize {
            let envelope_buf = pin_mut(envelope_buf);
            let method = pin(method);
            let uri = pin(uri);
            let body = pin(body);
            let body_buf = pin_mut(body_buf);
            unsafe {
                __http_request(
                    envelope_buf.ptr(),
                    envelope_buf.len(),
                    method.ptr(),
                    method.len(),
                    uri.ptr(),
                    uri.len(),
                    body.ptr(),
                    body.len(),
                    body_buf.ptr(),
                    body_buf.len(),
                )
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::WasmImports;

/// lets a shared reference stand in wherever an owned Imports is expected
impl<I: Imports + ?Sized> Imports for &I {
    fn enable_features(&self, features: u64) -> u64 {
        (**self).enable_features(features)
    }

    fn get_config(&self, buf: &mut [u8]) -> PackedSize {
        (**self).get_config(buf)
    }

    fn log_enabled(&self, level: i32) -> u32 {
        (**self).log_enabled(level)
    }

    fn log(&self, level: i32, message: &[u8]) {
        (**self).log(level, message)
    }

    fn http_request(
        &self,
        envelope_buf: &mut [u8],
        method: &[u8],
        uri: &[u8],
        body: &[u8],
        body_buf: &mut [u8],
    ) -> PackedSize {
        (**self).http_request(envelope_buf, method, uri, body, body_buf)
    }
}
