//! API-level constants.

/// Prefix shared by every authenticated route.
pub const API_PREFIX: &str = "/api";

/// Mount point for objects served by the local storage backend.
pub const ASSETS_PREFIX: &str = "/assets";

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "tubely_api=debug,tower_http=debug";

/// Environment variable that overrides the bundled migrations directory.
pub const MIGRATIONS_DIR_ENV: &str = "TUBELY_MIGRATIONS_DIR";
