/// File name looked up under the installation root when `--env-file` is absent.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Keys that must be present and non-empty before any phase runs.
pub const REQUIRED_KEYS: &[&str] = &[
    // Primary domain; every service URL hangs off it
    "DOMAIN",
    // ACME registration / expiry notices
    "LETSENCRYPT_EMAIL",
    "OPENAI_API_KEY",
    "DEEPGRAM_API_KEY",
];

/// Optional keys and the defaults the phases fall back to.
///
/// The orchestrator never injects these into a phase environment; the
/// table exists so the summary can show what a phase actually used.
pub const OPTIONAL_DEFAULTS: &[(&str, &str)] = &[
    ("POSTGRES_PASSWORD", "changeme"),
    ("KEYCLOAK_ADMIN", "admin"),
    ("KEYCLOAK_ADMIN_PASSWORD", "admin"),
    ("TURN_USERNAME", "turn"),
    ("TURN_PASSWORD", "turnpass"),
    ("REPLICA_COUNT", "1"),
];

/// Documented default for an optional key.
#[must_use]
pub fn optional_default(key: &str) -> Option<&'static str> {
    OPTIONAL_DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}
