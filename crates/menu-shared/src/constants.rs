//! Application-wide constants

pub const ROOT_ORDER: i32 = 1;
pub const ROOT_TITLE_SUFFIX: &str = "Root";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 10;
