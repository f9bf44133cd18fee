use http_wasm_guest_common::slice::clamp_len;
use http_wasm_guest_common::*;
use std::marker::PhantomData;

/// the guest address of some bytes as the host sees it
///
/// only meaningful inside wasm32 where every address fits in a WasmSize, off wasm the value is
/// truncated and must never be handed to anything that dereferences it
fn guest_ptr(ptr: *const u8) -> GuestPtr {
    ptr as usize as GuestPtr
}

/// A WasmSlice over borrowed bytes that keeps those bytes alive and unmoved for as long as the
/// guard exists.
///
/// Build one immediately before a host call and let it drop immediately after. The borrow checker
/// then guarantees the bytes the host reads cannot be freed, moved or written to while the host
/// might still be looking at them, whether the call succeeds or not.
pub struct Pinned<'a> {
    slice: WasmSlice,
    _bytes: PhantomData<&'a [u8]>,
}

impl Pinned<'_> {
    pub fn slice(&self) -> WasmSlice {
        self.slice
    }

    pub fn ptr(&self) -> GuestPtr {
        self.slice.ptr()
    }

    pub fn len(&self) -> Len {
        self.slice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }
}

/// Same as Pinned but the host may write into the bytes.
/// Holds the only mutable borrow so nothing else in the guest can touch the buffer mid call.
pub struct PinnedMut<'a> {
    slice: WasmSlice,
    _bytes: PhantomData<&'a mut [u8]>,
}

impl PinnedMut<'_> {
    pub fn slice(&self) -> WasmSlice {
        self.slice
    }

    pub fn ptr(&self) -> GuestPtr {
        self.slice.ptr()
    }

    pub fn len(&self) -> Len {
        self.slice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }
}

/// pin bytes the host will read
///
/// panics if the bytes are longer than wasm memory can be, which cannot happen inside a guest
pub fn pin(bytes: &[u8]) -> Pinned<'_> {
    Pinned {
        slice: WasmSlice::new(guest_ptr(bytes.as_ptr()), wasm_len(bytes.len())),
        _bytes: PhantomData,
    }
}

/// pin a buffer the host will write into
pub fn pin_mut(bytes: &mut [u8]) -> PinnedMut<'_> {
    PinnedMut {
        slice: WasmSlice::new(guest_ptr(bytes.as_mut_ptr()), wasm_len(bytes.len())),
        _bytes: PhantomData,
    }
}

fn wasm_len(len: usize) -> Len {
    match Len::try_from(len) {
        Ok(len) => len,
        // a wasm32 guest cannot hold more than Len::MAX bytes in one allocation
        Err(_) => panic!("{}", wasm_error!(WasmErrorInner::PointerMap)),
    }
}

/// A zeroed buffer owned by the guest that the host writes into.
///
/// Allocation failure aborts the guest, there is nothing sensible to recover to inside a sandbox.
/// The buffer is freed when it drops, so a receive buffer lives exactly as long as the scope of
/// the call that uses it.
#[derive(Debug)]
pub struct GuestBuffer(Vec<u8>);

impl GuestBuffer {
    pub fn zeroed(capacity: Len) -> Self {
        Self(vec![0; capacity as usize])
    }

    pub fn capacity(&self) -> Len {
        self.0.len() as Len
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// keep the bytes the host says it wrote, never more than the buffer holds
    pub fn into_host_bytes(mut self, reported: PackedSize) -> HostBytes {
        let capacity = self.capacity();
        self.0.truncate(clamp_len(reported, capacity) as usize);
        HostBytes {
            bytes: self.0,
            reported,
            capacity,
        }
    }
}

/// Bytes copied out of a GuestBuffer along with what the host claimed to have written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostBytes {
    bytes: Vec<u8>,
    reported: PackedSize,
    capacity: Len,
}

impl HostBytes {
    pub fn reported(&self) -> PackedSize {
        self.reported
    }

    pub fn capacity(&self) -> Len {
        self.capacity
    }

    /// the host had more to give than the buffer could take
    pub fn is_truncated(&self) -> bool {
        self.reported > self.capacity
    }

    /// fail rather than hand out clamped bytes
    pub fn require_complete(self) -> Result<Vec<u8>, WasmError> {
        if self.is_truncated() {
            Err(wasm_error!(WasmErrorInner::Truncated {
                reported: self.reported,
                capacity: self.capacity,
            }))
        } else {
            Ok(self.bytes)
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for HostBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<HostBytes> for Vec<u8> {
    fn from(host_bytes: HostBytes) -> Vec<u8> {
        host_bytes.bytes
    }
}

/// hand the host a fresh buffer of `capacity` bytes and copy out whatever it reports writing
///
/// there is no second attempt, anything past `capacity` is lost and `is_truncated` says so
pub fn read_bytes<F>(capacity: Len, host_fn: F) -> HostBytes
where
    F: FnOnce(&mut [u8]) -> PackedSize,
{
    let mut buffer = GuestBuffer::zeroed(capacity);
    let reported = host_fn(buffer.as_mut_slice());
    tracing::trace!(capacity, reported, "read bytes from host");
    buffer.into_host_bytes(reported)
}

/// like read_bytes but when the host reports more than `capacity` the call is repeated once with
/// a buffer of exactly the reported size
///
/// only for host calls that return the same bytes every time, e.g. configuration. The retry never
/// allocates more than `limit` bytes, a larger report is returned truncated without a second call.
/// The result can still be truncated if the host grew between the two calls, callers that need
/// the whole payload should finish with `require_complete`.
pub fn read_bytes_exact<F>(capacity: Len, limit: Len, mut host_fn: F) -> HostBytes
where
    F: FnMut(&mut [u8]) -> PackedSize,
{
    let probe = read_bytes(capacity, &mut host_fn);
    if !probe.is_truncated() {
        return probe;
    }
    if probe.reported() > limit {
        tracing::warn!(
            capacity,
            limit,
            reported = probe.reported(),
            "host bytes exceed the retry limit"
        );
        return probe;
    }
    tracing::debug!(
        capacity,
        reported = probe.reported(),
        "host bytes did not fit, retrying with exact size"
    );
    let exact = read_bytes(probe.reported(), host_fn);
    if exact.is_truncated() {
        tracing::warn!(
            capacity = exact.capacity(),
            reported = exact.reported(),
            "host bytes still did not fit after retry"
        );
    }
    exact
}
