//! Coarse exit codes (spec.md §6): `0` success, `1` usage error or no
//! targets or MCP connection failure, `2` success but findings met or
//! exceeded `--fail-on`.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_USAGE_ERROR: i32 = 1;
pub const EXIT_FAIL_ON_THRESHOLD: i32 = 2;
