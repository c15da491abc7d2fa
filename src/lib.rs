/// nzwater_service: New Zealand council water restriction monitoring.
///
/// # Module structure
///
/// ```text
/// nzwater_service
/// ├── model       — shared data types (AlertLevel, WaterAlertError, sentinel codes)
/// ├── normalize   — free-text level word to AlertLevel table
/// ├── providers   — council registry and per-council page extraction
/// │   ├── watercare, napier, taupo — bold "Level <word>" text
/// │   ├── smartwater               — level read from an alert image filename
/// │   ├── matamata_piako           — <h5> "Level <word> water restrictions" heading
/// │   └── fixtures (test only)     — trimmed council pages
/// ├── client      — location parsing + one blocking fetch per poll
/// ├── handler     — poll result to thing status, retry schedule
/// ├── daemon      — fixed-delay polling threads, one per thing
/// ├── config      — thing list loader (things.toml)
/// ├── endpoint    — HTTP API exposing thing status and channel values
/// └── broadlink   — RM3 infrared remote learning-mode commands
/// ```

pub mod broadlink;
pub mod client;
pub mod config;
pub mod daemon;
pub mod endpoint;
pub mod handler;
pub mod model;
pub mod normalize;
pub mod providers;
