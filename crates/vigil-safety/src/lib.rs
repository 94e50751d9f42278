//! Path and I/O safety primitives: sanitization, symlink/root-escape
//! checks, binary sniffing, encoding detection, and the file-size policy
//! (spec.md §4.1).

mod binary;
mod encoding;
mod path;
mod safe;
mod size;
mod visited;

pub use binary::is_binary;
pub use encoding::{detect_encoding, Encoding};
pub use path::sanitize_path;
pub use safe::is_safe_path;
pub use size::{check_size, MAX_SCAN_BYTES, STREAMING_THRESHOLD};
pub use visited::VisitedPaths;
