//! `/list [-v]`: render the network's member roster.

use std::fmt::Write;

use async_trait::async_trait;

use crate::access::Role;
use crate::zerotier::Member;

use super::{
    split_args, CommandHandler, CommandRequest, DispatchError, RouterContext, ACCESS_DENIED,
    INVALID_ARGUMENT, TOO_MANY_ARGUMENTS,
};

pub(super) struct ListMembersHandler;

#[async_trait]
impl CommandHandler for ListMembersHandler {
    async fn handle(
        &self,
        req: &CommandRequest,
        ctx: &RouterContext,
    ) -> Result<String, DispatchError> {
        if ctx.store.get_role(req.chat_id) < Role::Guest {
            return Ok(ACCESS_DENIED.to_string());
        }

        let args = split_args(&req.args);
        if args.len() > 1 {
            return Ok(TOO_MANY_ARGUMENTS.to_string());
        }
        let verbose = match args.first() {
            None => false,
            Some(&"-v") => true,
            Some(_) => return Ok(INVALID_ARGUMENT.to_string()),
        };

        let members = ctx
            .api
            .list_members(ctx.api.default_network())
            .await?;

        Ok(render_members(&members, verbose))
    }

    fn description(&self) -> &'static str {
        "Lists all nodes in network. Use -v if you want more details. Usage:`/list [-v]`."
    }
}

/// A remote failure and a genuinely empty network both land here with an
/// empty slice, so both read "No members." -- only the client's log tells
/// them apart.
fn render_members(members: &[Member], verbose: bool) -> String {
    if members.is_empty() {
        return "No members.".to_string();
    }

    let mut out = String::new();
    for (i, m) in members.iter().enumerate() {
        let _ = write!(
            out,
            "{i}.\nNodeID: {}\nAuthorized: {}\nLocal Addresses:\n",
            m.node_id, m.config.authorized
        );
        if m.config.ip_assignments.is_empty() {
            out.push_str("Not assigned\n");
        } else {
            for ip in &m.config.ip_assignments {
                let _ = writeln!(out, "> {ip}");
            }
        }
        if verbose {
            let _ = write!(
                out,
                "Name: {}\nDescription: {}\nHidden: {}\nOnline: {}\n\
                 PhysicalAddress: {}\nClientVersion: {}\n",
                m.name.as_deref().unwrap_or(""),
                m.description.as_deref().unwrap_or(""),
                m.hidden,
                m.online,
                m.physical_address.as_deref().unwrap_or(""),
                m.client_version.as_deref().unwrap_or(""),
            );
        }
    }
    out
}
