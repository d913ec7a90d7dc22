//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of the
//! shell contract — scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (unspecified)                    |
//! | 2    | Usage or config error (bad args, bad TOML)     |
//! | 3    | Data error (unreadable input, engine rejected) |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, unparsable or invalid config.
pub const EXIT_USAGE: u8 = 2;

/// Data error - missing or malformed input, engine rejected the tables.
pub const EXIT_DATA: u8 = 3;
