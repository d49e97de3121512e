//! Command routing for inbound chat commands.
//!
//! The [`Router`] owns an immutable table of command handlers built once
//! at construction; there is no runtime registration. Dispatch enforces a
//! Banned floor and special-cases `/help`, but the per-command minimum
//! role is checked inside each handler, not by a table-driven gate: a
//! future handler may need a non-monotonic check, so the gating stays
//! where the decision is made.

mod auth;
mod basic;
mod list;
mod op;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::access::{AccessStore, Role, RoleError};
use crate::zerotier::{ZeroTierApi, ZeroTierError};

/// Reply when the caller's role is below a command's minimum or the
/// caller tried to touch the admin.
pub const ACCESS_DENIED: &str =
    "Access denied. If you think that's a mistake, contact you administrator.";
/// Reply to plain text without a command token.
pub const UNDERSTAND_COMMANDS_ONLY: &str = "I understand commands only. Try /help.";
/// Reply to a command name with no registered handler.
pub const UNKNOWN_COMMAND: &str = "Unknown command. Try /help.";
pub const NO_ARGUMENTS: &str = "No arguments given. Try /help.";
pub const TOO_MANY_ARGUMENTS: &str = "Too many arguments given. Try /help.";
pub const INVALID_ARGUMENT: &str = "Invalid argument. Try /help.";
pub const SUCCESS: &str = "Success.";
pub const INVALID_NODE_ID: &str = "Invalid NodeID";

/// Faults a handler cannot turn into a user-facing reply.
///
/// Everything here is a transport-level failure (remote API or role
/// file); the caller of [`Router::dispatch`] logs it and answers with a
/// generic failure message.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Network(#[from] ZeroTierError),

    #[error(transparent)]
    Store(#[from] RoleError),
}

/// An inbound command, already split out of the transport's message text.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    /// Caller identity (the Telegram chat id in the shipped transport).
    pub chat_id: i64,
    /// Command name without the leading slash; empty when the input had
    /// no command token at all.
    pub command: String,
    /// Raw argument string following the command token.
    pub args: String,
}

/// Shared dependencies passed to every handler.
pub struct RouterContext {
    pub api: ZeroTierApi,
    pub store: Arc<dyn AccessStore>,
}

/// A single command: its behavior and its help line.
///
/// Each handler re-checks the caller's role against its own minimum
/// before acting and replies [`ACCESS_DENIED`] itself when unmet.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError>;

    /// One-line description used to synthesize the `/help` reply.
    fn description(&self) -> &'static str;
}

/// Maps command names to handlers and gates access.
pub struct Router {
    commands: HashMap<&'static str, Box<dyn CommandHandler>>,
    ctx: RouterContext,
}

impl Router {
    /// Build the router with the full command table. The table is fixed
    /// for the lifetime of the router.
    pub fn new(api: ZeroTierApi, store: Arc<dyn AccessStore>) -> Self {
        let mut commands: HashMap<&'static str, Box<dyn CommandHandler>> = HashMap::new();
        commands.insert("start", Box::new(basic::StartHandler));
        commands.insert("auth", Box::new(auth::AuthHandler));
        commands.insert("unauth", Box::new(auth::UnauthHandler));
        commands.insert("list", Box::new(list::ListMembersHandler));
        commands.insert("op", Box::new(op::OpHandler));
        commands.insert("deop", Box::new(op::DeopHandler));

        Self {
            commands,
            ctx: RouterContext { api, store },
        }
    }

    /// Route one inbound command to its reply text.
    ///
    /// `Err` means a transport-level fault; every validation or permission
    /// problem comes back as `Ok` with the user-facing reply.
    pub async fn dispatch(&self, req: &CommandRequest) -> Result<String, DispatchError> {
        if req.command.is_empty() {
            return Ok(UNDERSTAND_COMMANDS_ONLY.to_string());
        }

        // Banned callers get nothing, not even /help or the
        // unknown-command reply.
        if self.ctx.store.get_role(req.chat_id) < Role::Guest {
            return Ok(ACCESS_DENIED.to_string());
        }

        if req.command == "help" {
            if self.ctx.store.get_role(req.chat_id) < Role::Operator {
                return Ok(ACCESS_DENIED.to_string());
            }
            return Ok(self.help_text());
        }

        match self.commands.get(req.command.as_str()) {
            None => Ok(UNKNOWN_COMMAND.to_string()),
            Some(handler) => handler.handle(req, &self.ctx).await,
        }
    }

    /// Synthesized from the registered handlers; iteration order over the
    /// table is not guaranteed.
    fn help_text(&self) -> String {
        let mut s = String::from(
            "Help:\nThis bot is used to manage a ZeroTier network via ZeroTier-Central API.\n\
             Available commands:\n/help : provides help.\n",
        );
        for (name, handler) in &self.commands {
            s.push('/');
            s.push_str(name);
            s.push_str(" : ");
            s.push_str(handler.description());
            s.push('\n');
        }
        s
    }
}

/// Split an argument string on single spaces. An empty string yields zero
/// tokens, never a single empty one.
fn split_args(args: &str) -> Vec<&str> {
    if args.is_empty() {
        Vec::new()
    } else {
        args.split(' ').collect()
    }
}
