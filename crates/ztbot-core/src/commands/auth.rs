//! `/auth` and `/unauth`: member authorization commands.
//!
//! Both require Operator. A malformed node id maps to the "Invalid
//! NodeID" reply; a remote refusal (non-success status) maps to a
//! user-facing failure line; only transport faults propagate.

use async_trait::async_trait;

use crate::access::Role;
use crate::zerotier::ZeroTierError;

use super::{
    split_args, CommandHandler, CommandRequest, DispatchError, RouterContext, ACCESS_DENIED,
    INVALID_NODE_ID, NO_ARGUMENTS, SUCCESS, TOO_MANY_ARGUMENTS,
};

pub(super) struct AuthHandler;

#[async_trait]
impl CommandHandler for AuthHandler {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError> {
        if ctx.store.get_role(req.chat_id) < Role::Operator {
            return Ok(ACCESS_DENIED.to_string());
        }

        let args = split_args(&req.args);
        if args.is_empty() {
            return Ok(NO_ARGUMENTS.to_string());
        }
        if args.len() > 2 {
            return Ok(TOO_MANY_ARGUMENTS.to_string());
        }

        let node_id = args[0];
        let short_name = if args.len() == 2 { args[1] } else { "" };
        let description = format!("added by via telegram bot by {}", req.chat_id);

        let network = ctx.api.default_network().to_string();
        match ctx
            .api
            .auth_member(&network, node_id, short_name, &description)
            .await
        {
            Ok(true) => Ok(SUCCESS.to_string()),
            Ok(false) => Ok(format!("Failed to authorize {network} in {node_id}!")),
            Err(ZeroTierError::InvalidNodeId) => Ok(INVALID_NODE_ID.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    fn description(&self) -> &'static str {
        "Authorizes given NodeID in network. Usage:`/auth NodeID short_name`."
    }
}

pub(super) struct UnauthHandler;

#[async_trait]
impl CommandHandler for UnauthHandler {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError> {
        if ctx.store.get_role(req.chat_id) < Role::Operator {
            return Ok(ACCESS_DENIED.to_string());
        }

        let args = split_args(&req.args);
        if args.is_empty() {
            return Ok(NO_ARGUMENTS.to_string());
        }
        if args.len() > 1 {
            return Ok(TOO_MANY_ARGUMENTS.to_string());
        }

        let node_id = args[0];
        let network = ctx.api.default_network().to_string();
        match ctx.api.unauth_member(&network, node_id).await {
            Ok(true) => Ok(SUCCESS.to_string()),
            Ok(false) => Ok(format!("Failed to unauthorize {network} in {node_id}!")),
            Err(ZeroTierError::InvalidNodeId) => Ok(INVALID_NODE_ID.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    fn description(&self) -> &'static str {
        "Unauthorizes given NodeID in network. Usage:`/unauth NodeID`."
    }
}
