use vigil_common::VigilError;

/// Default cap beyond which a file is rejected outright (spec.md §4.1).
pub const MAX_SCAN_BYTES: u64 = 5 * 1024 * 1024;

/// Files above this are rejected earlier by `MAX_SCAN_BYTES`; the constant
/// exists so a future streaming path can be wired in without a spec change.
pub const STREAMING_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Reject files larger than `max_bytes` (default `MAX_SCAN_BYTES`).
pub fn check_size(bytes: u64, max_bytes: u64) -> Result<(), VigilError> {
    if bytes > max_bytes {
        return Err(VigilError::FileTooLarge { bytes });
    }
    Ok(())
}
