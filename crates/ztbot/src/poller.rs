//! Long-polling loop bridging Telegram updates to the command router.
//!
//! Each update is handled on its own task; commands from different chats
//! have no ordering guarantee beyond what Telegram's update stream
//! provides. A transport fault in one command is logged and answered with
//! a generic failure reply; it never takes the process down.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use ztbot_core::commands::{CommandRequest, Router};

use crate::telegram::{parse_command, TelegramApi};

/// Reply when a handler hits a transport-level fault.
const GENERIC_FAILURE: &str = "Something went wrong. Try again later.";

/// Run the poll loop until the process is terminated.
pub async fn run(api: Arc<TelegramApi>, router: Arc<Router>, poll_timeout_secs: u64) {
    let mut offset: Option<i64> = None;
    let mut backoff_secs = 1u64;

    info!("poller started");

    loop {
        match api.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => {
                backoff_secs = 1;
                for update in updates {
                    offset = Some(update.update_id + 1);

                    let Some(msg) = update.message else { continue };
                    let Some(text) = msg.text else { continue };

                    let api = Arc::clone(&api);
                    let router = Arc::clone(&router);
                    let chat_id = msg.chat.id;
                    tokio::spawn(async move {
                        handle_message(&api, &router, chat_id, &text).await;
                    });
                }
            }
            Err(e) => {
                warn!(error = %e, backoff_secs, "getUpdates failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            }
        }
    }
}

async fn handle_message(api: &TelegramApi, router: &Router, chat_id: i64, text: &str) {
    let (command, args) = parse_command(text);
    debug!(chat_id, command = %command, "dispatching command");

    let req = CommandRequest {
        chat_id,
        command,
        args,
    };
    let reply = match router.dispatch(&req).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(chat_id, command = %req.command, error = %e, "command failed");
            GENERIC_FAILURE.to_string()
        }
    };

    if let Err(e) = api.send_message(chat_id, &reply).await {
        warn!(chat_id, error = %e, "failed to send reply");
    }
}
