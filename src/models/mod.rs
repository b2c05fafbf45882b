//! Data models for the vault daemon's command payloads

mod snapshot;

pub use snapshot::CredentialSnapshot;
