//! API module for vault daemon interactions

mod client;
mod commands;

pub use client::{CommandError, VaultClient};
pub use commands::{GetPasswords, VaultCommand};
