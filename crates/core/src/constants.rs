use std::time::Duration;

/// Storage key of the persisted session identifier.
pub const SESSION_USER_ID_KEY: &str = "ownsphere.session.userId";

/// Storage key of the persisted poll configuration.
pub const MARKET_POLL_CONFIG_KEY: &str = "ownsphere.market.poll";

/// Storage key of the persisted display preferences.
pub const PREFERENCES_KEY: &str = "ownsphere.preferences";

/// Local replica used during development.
pub const DEFAULT_BACKEND_HOST: &str = "http://localhost:4943";

/// Canister id of the OwnSphere backend on the local replica.
pub const DEFAULT_CANISTER_ID: &str = "bkyz2-fmaaa-aaaaa-qaaaq-cai";

/// Textual principal of the anonymous identity.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Upper bound for a single backend round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const MIN_USER_ID_LENGTH: usize = 3;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 8;
