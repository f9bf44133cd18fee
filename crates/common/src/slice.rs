use crate::GuestPtr;
use crate::Len;
use crate::WasmSize;

pub const WASM_SLICE_ITEMS: usize = 2;
pub const WASM_SLICE_BYTES: usize = std::mem::size_of::<WasmSize>() * WASM_SLICE_ITEMS;

/// WasmSlice is a 2 item WasmSize array of offset/length
///
/// this is the only shape in which a byte range crosses the host/guest boundary
///
/// the offset always represents a position in the guest's linear memory _never_ on the host
/// the length always represents u8 bytes _not_ items
///
/// the length is a promise about the buffer the slice was built from, nothing more, so anything
/// the host reports back about that buffer must be clamped to it before it is read
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WasmSlice([WasmSize; WASM_SLICE_ITEMS]);

impl WasmSlice {
    pub fn new(ptr: GuestPtr, len: Len) -> Self {
        Self([ptr, len])
    }

    pub fn ptr(&self) -> GuestPtr {
        (self.0)[0]
    }

    pub fn len(&self) -> Len {
        (self.0)[1]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// wraps a naked array in a WasmSlice newtype for type safety
impl From<[WasmSize; WASM_SLICE_ITEMS]> for WasmSlice {
    fn from(array: [WasmSize; WASM_SLICE_ITEMS]) -> Self {
        Self(array)
    }
}

impl From<WasmSlice> for [WasmSize; WASM_SLICE_ITEMS] {
    fn from(slice: WasmSlice) -> Self {
        slice.0
    }
}

/// the number of bytes that can actually be read given the size a host reported
pub fn clamp_len(reported: Len, capacity: Len) -> Len {
    std::cmp::min(reported, capacity)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn slice_round_trip_test() {
        let slice = WasmSlice::from([50, 100]);
        assert_eq!(50, slice.ptr());
        assert_eq!(100, slice.len());
        assert!(!slice.is_empty());

        let array: [WasmSize; WASM_SLICE_ITEMS] = slice.into();
        assert_eq!([50, 100], array);
        assert_eq!(8, WASM_SLICE_BYTES);
    }

    #[test]
    fn clamp_len_test() {
        assert_eq!(0, clamp_len(0, 2048));
        assert_eq!(5, clamp_len(5, 2048));
        assert_eq!(2048, clamp_len(2048, 2048));
        assert_eq!(2048, clamp_len(2049, 2048));
        assert_eq!(2048, clamp_len(Len::MAX, 2048));
        assert_eq!(0, clamp_len(100, 0));

        assert!(WasmSlice::new(10, 0).is_empty());
    }
}
