//! `/op` and `/deop`: role administration, admin only.
//!
//! An `AdminImmutable` error from the store deliberately reads as the
//! standard access-denied reply: to the caller, trying to (de)op the
//! admin looks like a permission failure, not a system fault.

use async_trait::async_trait;

use crate::access::{Role, RoleError};

use super::{
    split_args, CommandHandler, CommandRequest, DispatchError, RouterContext, ACCESS_DENIED,
    INVALID_ARGUMENT, NO_ARGUMENTS, TOO_MANY_ARGUMENTS,
};

/// Parse the single user-id argument shared by `/op` and `/deop`.
fn parse_user_id_arg(args: &str) -> Result<i64, &'static str> {
    let args = split_args(args);
    if args.is_empty() {
        return Err(NO_ARGUMENTS);
    }
    if args.len() > 1 {
        return Err(TOO_MANY_ARGUMENTS);
    }
    args[0].parse().map_err(|_| INVALID_ARGUMENT)
}

pub(super) struct OpHandler;

#[async_trait]
impl CommandHandler for OpHandler {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError> {
        if ctx.store.get_role(req.chat_id) < Role::Admin {
            return Ok(ACCESS_DENIED.to_string());
        }

        let user_id = match parse_user_id_arg(&req.args) {
            Ok(id) => id,
            Err(reply) => return Ok(reply.to_string()),
        };

        match ctx.store.set_role(user_id, Role::Operator) {
            Ok(()) => Ok(format!("Success. {user_id} is an operator now.")),
            Err(RoleError::AdminImmutable) => Ok(ACCESS_DENIED.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    fn description(&self) -> &'static str {
        "Makes user with given user_id (number) an operator in app. Usage:`/op user_id`."
    }
}

pub(super) struct DeopHandler;

#[async_trait]
impl CommandHandler for DeopHandler {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError> {
        if ctx.store.get_role(req.chat_id) < Role::Admin {
            return Ok(ACCESS_DENIED.to_string());
        }

        let user_id = match parse_user_id_arg(&req.args) {
            Ok(id) => id,
            Err(reply) => return Ok(reply.to_string()),
        };

        match ctx.store.set_role(user_id, Role::Guest) {
            Ok(()) => Ok(format!("Success. {user_id} is a guest now.")),
            Err(RoleError::AdminImmutable) => Ok(ACCESS_DENIED.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    fn description(&self) -> &'static str {
        "Makes user with given user_id (number) a guest in app. Usage:`/deop user_id`."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_id_accepts_signed_integers() {
        assert_eq!(parse_user_id_arg("555"), Ok(555));
        assert_eq!(parse_user_id_arg("-42"), Ok(-42));
    }

    #[test]
    fn parse_user_id_rejects_bad_arity_and_garbage() {
        assert_eq!(parse_user_id_arg(""), Err(NO_ARGUMENTS));
        assert_eq!(parse_user_id_arg("1 2"), Err(TOO_MANY_ARGUMENTS));
        assert_eq!(parse_user_id_arg("bob"), Err(INVALID_ARGUMENT));
        assert_eq!(parse_user_id_arg("1.5"), Err(INVALID_ARGUMENT));
    }
}
