pub mod envelope;
pub mod features;
pub mod level;
pub mod result;
pub mod slice;

pub use envelope::ResponseEnvelope;
pub use features::Features;
pub use level::LogLevel;
pub use result::*;
pub use slice::WasmSlice;

/// something like usize for wasm
/// wasm has a memory limit of 4GB so offsets and lengths fit in u32
///
/// the host reads and writes guest memory directly so both sides need to agree on the number of
/// bytes used for offsets and lengths regardless of the host's own `usize`
pub type WasmSize = u32;

pub type Len = WasmSize;
pub type GuestPtr = WasmSize;

/// the number of bytes a host call reports having written (or wanting to write) into a buffer the
/// guest handed it
///
/// this can be larger than the buffer, in which case only the buffer's capacity was written
pub type PackedSize = Len;
