use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use tradepost_core::ItemRoster;

use crate::commands::{CommandPayload, CommandRouteError, TradeCommandService};
use crate::embeds::{self, Reply};
use crate::gateway::{PlatformClient, PlatformError};

/// Platform-side inactivity TTL for trade threads, in minutes.
pub const AUTO_ARCHIVE_MINUTES: u32 = 1_440;

pub fn thread_name(item: &str, requestor_display_name: &str) -> String {
    format!("{item}-{requestor_display_name}")
}

fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Drives the trade-thread lifecycle: open a public thread under the trade
/// channel, close it (archive, then delete) from inside the thread, and
/// reload the item roster on demand.
///
/// Thread ownership is encoded in the thread name itself
/// (`{item}-{requestor}`); the access gate checks the invoking display name
/// against that name before any of these entrypoints run. Platform failures
/// never escalate past this service: each one becomes a private reply.
pub struct TradeThreadService {
    platform: Arc<dyn PlatformClient>,
    roster: Arc<ItemRoster>,
    roster_path: PathBuf,
}

impl TradeThreadService {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        roster: Arc<ItemRoster>,
        roster_path: PathBuf,
    ) -> Self {
        Self { platform, roster, roster_path }
    }
}

fn creation_failure_reply(error: PlatformError) -> Reply {
    match error {
        PlatformError::Forbidden => Reply::private(embeds::create_forbidden_message()),
        PlatformError::Failure(detail) => {
            Reply::private(embeds::thread_create_failed_message(&detail))
        }
    }
}

fn closure_failure_reply(error: PlatformError) -> Reply {
    match error {
        PlatformError::Forbidden => Reply::private(embeds::delete_forbidden_message()),
        PlatformError::Failure(detail) => {
            Reply::private(embeds::thread_close_failed_message(&detail))
        }
    }
}

#[async_trait]
impl TradeCommandService for TradeThreadService {
    async fn open_trade(
        &self,
        item: String,
        features: String,
        payload: &CommandPayload,
    ) -> Result<Reply, CommandRouteError> {
        // TODO: reject items missing from the roster once the roster file
        // covers alternate spellings (regional forms, costumes).
        let name = thread_name(&item, &payload.caller.display_name);

        let thread = match self
            .platform
            .create_thread(&payload.channel.id, &name, AUTO_ARCHIVE_MINUTES)
            .await
        {
            Ok(thread) => thread,
            Err(error) => {
                warn!(
                    event_name = "trade.thread.create_failed",
                    thread_name = %name,
                    requestor = %payload.caller.display_name,
                    correlation_id = %payload.request_id,
                    error = %error,
                    "trade thread creation failed"
                );
                return Ok(creation_failure_reply(error));
            }
        };
        info!(
            event_name = "trade.thread.created",
            thread_id = %thread.id,
            thread_name = %thread.name,
            requestor = %payload.caller.display_name,
            correlation_id = %payload.request_id,
            "trade thread created"
        );

        let summary = embeds::trade_summary_message(
            &mention(&payload.caller.id),
            &item,
            &features,
            &payload.caller.id,
        );
        if let Err(error) = self.platform.send_message(&thread.id, &summary).await {
            warn!(
                event_name = "trade.thread.summary_failed",
                thread_id = %thread.id,
                correlation_id = %payload.request_id,
                error = %error,
                "trade summary send failed; removing the empty thread"
            );
            if let Err(cleanup) = self.platform.delete_thread(&thread.id).await {
                warn!(
                    event_name = "trade.thread.cleanup_failed",
                    thread_id = %thread.id,
                    correlation_id = %payload.request_id,
                    error = %cleanup,
                    "orphaned trade thread could not be removed"
                );
            }
            return Ok(creation_failure_reply(error));
        }

        Ok(Reply::private(embeds::post_prompt_message(&thread.mention())))
    }

    async fn close_trade(&self, payload: &CommandPayload) -> Result<Reply, CommandRouteError> {
        let thread_id = &payload.channel.id;

        if let Err(error) = self.platform.archive_thread(thread_id).await {
            warn!(
                event_name = "trade.thread.archive_failed",
                thread_id = %thread_id,
                correlation_id = %payload.request_id,
                error = %error,
                "trade thread archive failed"
            );
            return Ok(closure_failure_reply(error));
        }

        if let Err(error) = self.platform.delete_thread(thread_id).await {
            warn!(
                event_name = "trade.thread.delete_failed",
                thread_id = %thread_id,
                correlation_id = %payload.request_id,
                error = %error,
                "trade thread delete failed"
            );
            return Ok(closure_failure_reply(error));
        }

        info!(
            event_name = "trade.thread.closed",
            thread_id = %thread_id,
            requestor = %payload.caller.display_name,
            correlation_id = %payload.request_id,
            "trade thread archived and deleted"
        );

        Ok(Reply::private(embeds::close_notice_message(&payload.caller.display_name)))
    }

    async fn reload_roster(&self, payload: &CommandPayload) -> Result<Reply, CommandRouteError> {
        match self.roster.load_from(&self.roster_path) {
            Ok(count) => {
                info!(
                    event_name = "roster.reloaded",
                    count,
                    path = %self.roster_path.display(),
                    requestor = %payload.caller.display_name,
                    correlation_id = %payload.request_id,
                    "item roster reloaded"
                );
                Ok(Reply::private(embeds::roster_loaded_message(count)))
            }
            Err(error) => {
                warn!(
                    event_name = "roster.reload_failed",
                    path = %self.roster_path.display(),
                    correlation_id = %payload.request_id,
                    error = %error,
                    "item roster reload failed; previous roster kept"
                );
                Ok(Reply::private(embeds::roster_reload_failed_message(&error.to_string())))
            }
        }
    }
}
