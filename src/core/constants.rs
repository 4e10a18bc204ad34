//! Core constants reverse-engineered from the game client and the viewer's
//! interaction tuning. Keeping them in a single place makes it easier to find
//! engine-wide magic numbers; the coordinate ones are protocol constants and
//! must be preserved exactly.

/// Side length of the reference map texture in texture units (pixels).
pub const TEXTURE_SIZE: f64 = 2048.0;

/// Half of [`TEXTURE_SIZE`]; the world origin sits at the texture centre.
pub const TEXTURE_CENTER: f64 = 1024.0;

/// Span of the in-game coordinate axis at `sizeFactor = 100`.
pub const GAME_COORD_SPAN: f64 = 41.0;

/// Offset of the in-game coordinate axis (the client shows `[1, 42]`).
pub const GAME_COORD_ORIGIN: f64 = 1.0;

/// Size factor substituted when a map reports zero or nothing.
pub const DEFAULT_SIZE_FACTOR: f64 = 100.0;

/// Upper bound of markers accepted from the structured source per map.
pub const MAX_MARKERS: usize = 100;

/// Wall-clock budget for one structured extraction pass.
pub const MAX_PROCESSING_TIME_MS: u64 = 2000;

/// Header lines preceding data rows in the flat marker file.
pub const FLAT_FILE_HEADER_LINES: usize = 2;

/// Minimum spacing between two immediate marker redisplays (~3 per second).
pub const MIN_APPLY_INTERVAL_MS: u64 = 333;

/// Delay of the single deferred redisplay armed by throttled requests.
pub const DEFERRED_APPLY_DELAY_MS: u64 = 200;

/// Minimum spacing between two hover hit-tests.
pub const HOVER_CHECK_INTERVAL_MS: u64 = 50;

/// Hit radius in screen pixels at scale 1 (divided by the current scale).
pub const BASE_HIT_RADIUS_PX: f64 = 15.0;

/// Hit radius never shrinks below this many screen pixels.
pub const MIN_HIT_RADIUS_PX: f64 = 10.0;

/// Default rendered marker icon edge in screen pixels at scale 1.
pub const MARKER_ICON_SIZE: f64 = 32.0;

/// Rendered marker icons are clamped to this range.
pub const MARKER_ICON_SIZE_RANGE: (f64, f64) = (16.0, 48.0);
