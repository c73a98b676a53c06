pub mod allowlist;
pub mod broker;
pub mod tls;

pub use allowlist::AddressAllowlist;
pub use broker::BrokerConfig;
