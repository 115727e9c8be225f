/// Default fuel level for each analysis request (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

/// Maximum analysis binary size (16 MB)
pub const DEFAULT_MAX_ARTIFACT_BYTES: usize = 16 * 1024 * 1024;
/// Maximum source text size uploaded per request (4 MB)
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 4 * 1024 * 1024;
/// Upper bound on spans decoded from one reference list
pub const DEFAULT_MAX_REFERENCES: usize = 65_536;

pub const DEFAULT_ARTIFACT_PATH: &str = "asl_lang.wasm";
pub const DEFAULT_MARKER_OWNER: &str = "asl";
pub const DEFAULT_DOCUMENT_URI: &str = "inmemory://model/1";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
