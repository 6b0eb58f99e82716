//! Engine-wide constants
//!
//! Single source of truth for limits and editor defaults.

/// Structural limits for payload trees
pub mod limits {
    /// Maximum layout nesting depth followed by the validator and renderer
    pub const MAX_NESTING_DEPTH: usize = 32;
    /// Smallest allowed grid column count
    pub const MIN_COLUMNS: u64 = 1;
    /// Largest allowed grid column count
    pub const MAX_COLUMNS: u64 = 12;
    /// Largest value accepted by integer props, which decode as `u32`
    pub const MAX_INTEGER_PROP: i64 = u32::MAX as i64;
}

/// Edit history defaults
pub mod history {
    /// Maximum number of undo snapshots kept in `past`
    pub const MAX_PAST: usize = 50;
    /// Quiet period before a typed draft becomes an undo step
    pub const DEBOUNCE_MS: u64 = 300;
}

/// Default values used when a layout omits optional fields
pub mod defaults {
    /// Gap between layout children
    pub const GAP: f64 = 16.0;
    /// Grid column count
    pub const COLUMNS: u8 = 2;
}
