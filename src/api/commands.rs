//! Statically typed registry of vault daemon commands

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::CredentialSnapshot;

/// A command the vault daemon understands.
///
/// Each command binds its wire name to concrete request and response
/// payloads at compile time, so an unknown command name or a mismatched
/// payload is a build error rather than a runtime lookup failure.
pub trait VaultCommand {
    /// Wire name of the command, used as the endpoint path segment
    const NAME: &'static str;

    type Request: Serialize + Send + Sync;
    type Response: DeserializeOwned;
}

/// Fetch the full credential snapshot.
///
/// Takes no parameters; the UI's query text is not part of this contract.
pub struct GetPasswords;

impl VaultCommand for GetPasswords {
    const NAME: &'static str = "get_passwords";

    type Request = ();
    type Response = CredentialSnapshot;
}
