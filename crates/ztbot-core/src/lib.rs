//! Core logic for ztbot: role-gated administration of a ZeroTier network.
//!
//! The transport (Telegram long-polling, replies) and process bootstrap
//! live in the `ztbot` binary crate; this crate holds the parts with real
//! invariants:
//!
//! - [`access`]: the ordered [`access::Role`] hierarchy and the file-backed
//!   [`access::FileRoleStore`] with its immutable admin
//! - [`zerotier`]: identifier validation and idempotent member
//!   authorize/deauthorize/list calls against the ZeroTier Central API
//! - [`commands`]: the [`commands::Router`] mapping command names to
//!   handlers, with per-handler minimum-role checks

pub mod access;
pub mod commands;
pub mod zerotier;

pub use access::{AccessStore, FileRoleStore, Role, RoleError};
pub use commands::{CommandRequest, DispatchError, Router};
pub use zerotier::{ZeroTierApi, ZeroTierError};
