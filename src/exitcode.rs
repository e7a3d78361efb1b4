//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (invalid manifest, unresolved database fields)
pub const DATAERR: i32 = 65;

/// Cannot open input (no repositories, manifest not found)
pub const NOINPUT: i32 = 66;

/// Service unavailable (GitHub API failure)
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Permission denied (no GitHub token)
pub const NOPERM: i32 = 77;

/// Configuration error
pub const CONFIG: i32 = 78;
