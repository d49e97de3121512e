//! `/start`: the greeting command.

use async_trait::async_trait;

use crate::access::Role;

use super::{CommandHandler, CommandRequest, DispatchError, RouterContext, ACCESS_DENIED};

pub(super) struct StartHandler;

#[async_trait]
impl CommandHandler for StartHandler {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError> {
        if ctx.store.get_role(req.chat_id) < Role::Guest {
            return Ok(ACCESS_DENIED.to_string());
        }
        Ok(format!("Hello, {}!", req.chat_id))
    }

    fn description(&self) -> &'static str {
        "begins interaction with me"
    }
}
