// Clock and timing
pub const FALL_PERIOD_MS: u64 = 2000;
pub const SPAWN_PERIOD_MS: u64 = 2000;
pub const FRAME_INTERVAL_MS: u64 = 33;
/// Longest accepted fall or spawn period (one hour)
pub const MAX_PERIOD_MS: u64 = 60 * 60 * 1000;

// Geometry (world units)
pub const ELEMENT_SIZE: f64 = 50.0;

// Termination thresholds
pub const MAX_MISSED: u32 = 3;
pub const MAX_TOUCHED_BOTTOM: u32 = 3;

// Terminal cell size in world units, used when the UI reports its viewport
pub const CELL_WIDTH_UNITS: f64 = 10.0;
pub const CELL_HEIGHT_UNITS: f64 = 20.0;

pub const APP_NAME: &str = "olympus";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "olympus.log";
