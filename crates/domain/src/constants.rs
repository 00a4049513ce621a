//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Recurrence generation
pub const DEFAULT_HORIZON_MONTHS: u32 = 3;
pub const DEFAULT_MAX_HORIZON_MONTHS: u32 = 24;
pub const DEFAULT_MAX_OCCURRENCES: usize = 366;
/// Upper bound on candidate days the evaluator will inspect in one call,
/// independent of how many dates it emits.
pub const MAX_EVALUATION_STEPS: usize = 20_000;

// Alternative slot search
pub const DEFAULT_ALTERNATIVE_OFFSETS_MINUTES: [i64; 8] = [30, -30, 60, -60, 90, -90, 120, -120];
pub const DEFAULT_MAX_ALTERNATIVES: usize = 5;

// Business hours fallback
pub const DEFAULT_BUSINESS_OPEN: &str = "09:00";
pub const DEFAULT_BUSINESS_CLOSE: &str = "18:00";
pub const DEFAULT_TIMEZONE: &str = "UTC";

// Storage
pub const DEFAULT_DB_PATH: &str = "cadence.db";
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// Audit
pub const SYSTEM_ACTOR: &str = "system";
