//! Long-polling update loop.

use crate::handlers::ScheduleHandler;
use crate::telegram::TelegramMessageWrapper;
use postbot_core::ToCoreMessage;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatJoinRequest;
use tracing::{error, info};

/// Run the teloxide dispatcher until the process is stopped.
///
/// Messages go to the [`ScheduleHandler`]; join requests for any chat the
/// bot administers are approved automatically.
pub async fn run_polling(bot: teloxide::Bot, handler: Arc<ScheduleHandler>) -> anyhow::Result<()> {
    let me = bot.get_me().await?;
    info!(username = me.username(), "Starting long polling");

    let tree = dptree::entry()
        .branch(Update::filter_message().endpoint(
            move |_bot: teloxide::Bot, msg: teloxide::types::Message| {
                let handler = handler.clone();
                async move {
                    let message = TelegramMessageWrapper(&msg).to_core();
                    info!(
                        user_id = message.user.id,
                        chat_id = message.chat.id,
                        chat_type = %message.chat.chat_type,
                        media = message.media.len(),
                        "Received message"
                    );
                    if let Err(e) = handler.handle_message(&message).await {
                        error!(error = %e, "Failed to handle message");
                    }
                    respond(())
                }
            },
        ))
        .branch(Update::filter_chat_join_request().endpoint(
            |bot: teloxide::Bot, request: ChatJoinRequest| async move {
                info!(
                    chat_id = request.chat.id.0,
                    user_id = request.from.id.0,
                    "Approving chat join request"
                );
                if let Err(e) = bot
                    .approve_chat_join_request(request.chat.id, request.from.id)
                    .await
                {
                    error!(error = %e, "Failed to approve chat join request");
                }
                respond(())
            },
        ));

    Dispatcher::builder(bot, tree)
        .default_handler(|_| async {})
        .build()
        .dispatch()
        .await;

    Ok(())
}
