//! Token helpers for tests

use std::time::{Duration, SystemTime};

use vnf_broker::auth::mint_token;
use vnf_broker::state::security_config::SecurityConfig;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET)
}

/// A token valid for an hour, optionally scoped to one target.
pub fn mint_test_token(allowed_target: Option<&str>) -> String {
    mint_token(
        "cloudstack-mgmt",
        allowed_target,
        SystemTime::now(),
        Duration::from_secs(3600),
        &security(),
    )
    .expect("should mint token successfully")
}

/// Full Authorization header value including the "Bearer " prefix.
pub fn bearer_header(allowed_target: Option<&str>) -> String {
    format!("Bearer {}", mint_test_token(allowed_target))
}

/// A token that expired an hour ago.
pub fn mint_expired_token() -> String {
    let past = SystemTime::now()
        .checked_sub(Duration::from_secs(7200))
        .expect("clock should be past the epoch");
    mint_token("cloudstack-mgmt", None, past, Duration::from_secs(3600), &security())
        .expect("should mint expired token successfully")
}

/// A well-formed token signed with a different secret.
pub fn mint_foreign_token() -> String {
    mint_token(
        "intruder",
        None,
        SystemTime::now(),
        Duration::from_secs(3600),
        &SecurityConfig::new("some-other-secret"),
    )
    .expect("should mint foreign token successfully")
}
