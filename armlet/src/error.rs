use thiserror::Error;

/// Reasons an engine operation can fail.
///
/// Failures are local: the engine is never poisoned and the call leaves
/// architectural state exactly as it was when the operation started.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionError {
    /// Execution or memory access requested before a successful `init`.
    #[error("engine memory is not initialized")]
    Uninitialized,

    /// The instruction word does not belong to any supported family.
    #[error("illegal instruction {0:#010X}")]
    IllegalInstruction(u32),

    /// A read or load/store access fell outside the logical memory size.
    #[error("out of range access of {length} bytes at {address:#010X} (memory size {size:#X})")]
    OutOfRange {
        address: u32,
        length: usize,
        size: usize,
    },

    /// The memory image could not be allocated or grown.
    #[error("failed to allocate {0} bytes of memory")]
    AllocationFailed(usize),
}
