use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Mutex;

use tradepost_chat::commands::{Caller, ChannelRef, CommandPayload, GatePolicy};
use tradepost_chat::events::{
    CommandInvocationHandler, EventContext, EventDispatcher, GatewayEnvelope, GatewayEvent,
    HandlerResult,
};
use tradepost_chat::embeds::{Embed, Visibility};
use tradepost_chat::gateway::{PlatformClient, PlatformError, ThreadRef};
use tradepost_chat::threads::TradeThreadService;
use tradepost_core::ItemRoster;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    CreateThread { name: String },
    SendMessage { channel_id: String },
    ArchiveThread { thread_id: String },
    DeleteThread { thread_id: String },
}

#[derive(Default)]
struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
}

#[async_trait]
impl PlatformClient for RecordingPlatform {
    async fn create_thread(
        &self,
        _parent_channel_id: &str,
        name: &str,
        _auto_archive_minutes: u32,
    ) -> Result<ThreadRef, PlatformError> {
        self.calls.lock().await.push(Call::CreateThread { name: name.to_owned() });
        Ok(ThreadRef { id: format!("T-{name}"), name: name.to_owned() })
    }

    async fn send_message(&self, channel_id: &str, _embed: &Embed) -> Result<(), PlatformError> {
        self.calls.lock().await.push(Call::SendMessage { channel_id: channel_id.to_owned() });
        Ok(())
    }

    async fn archive_thread(&self, thread_id: &str) -> Result<(), PlatformError> {
        self.calls.lock().await.push(Call::ArchiveThread { thread_id: thread_id.to_owned() });
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<(), PlatformError> {
        self.calls.lock().await.push(Call::DeleteThread { thread_id: thread_id.to_owned() });
        Ok(())
    }
}

struct Harness {
    dispatcher: EventDispatcher,
    platform: Arc<RecordingPlatform>,
    roster: Arc<ItemRoster>,
    _dir: TempDir,
}

fn harness(roster_contents: &str) -> Harness {
    let dir = TempDir::new().expect("temp dir");
    let roster_path = dir.path().join("items.list");
    fs::write(&roster_path, roster_contents).expect("write roster");

    let platform = Arc::new(RecordingPlatform::default());
    let roster = Arc::new(ItemRoster::new());
    let service = TradeThreadService::new(platform.clone(), Arc::clone(&roster), roster_path);

    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(CommandInvocationHandler::new(service, GatePolicy::default()));

    Harness { dispatcher, platform, roster, _dir: dir }
}

fn envelope(payload: CommandPayload) -> GatewayEnvelope {
    GatewayEnvelope {
        envelope_id: format!("env-{}", payload.request_id),
        event: GatewayEvent::CommandInvocation(payload),
    }
}

fn payload(command: &str, caller: Caller, channel: ChannelRef) -> CommandPayload {
    CommandPayload {
        command: command.to_owned(),
        item: None,
        features: None,
        caller,
        channel,
        request_id: format!("req-{command}"),
    }
}

fn member(display_name: &str) -> Caller {
    Caller { id: "1001".to_owned(), display_name: display_name.to_owned(), is_admin: false }
}

fn admin(display_name: &str) -> Caller {
    Caller { id: "9001".to_owned(), display_name: display_name.to_owned(), is_admin: true }
}

fn channel(name: &str) -> ChannelRef {
    ChannelRef { id: format!("C-{name}"), name: name.to_owned(), is_thread: false }
}

fn thread(id: &str, name: &str) -> ChannelRef {
    ChannelRef { id: id.to_owned(), name: name.to_owned(), is_thread: true }
}

async fn reply_of(harness: &Harness, payload: CommandPayload) -> tradepost_chat::embeds::Reply {
    let result = harness
        .dispatcher
        .dispatch(&envelope(payload), &EventContext::default())
        .await
        .expect("dispatch");
    match result {
        HandlerResult::Responded(reply) => reply,
        other => panic!("expected a reply, got {other:?}"),
    }
}

#[tokio::test]
async fn full_trade_lifecycle_opens_and_closes_a_thread() {
    let harness = harness("Pikachu\nEevee\n");

    let mut open = payload("trade", member("Ash"), channel("trades"));
    open.item = Some("Pikachu".to_owned());
    open.features = Some(String::new());

    let reply = reply_of(&harness, open).await;
    assert_eq!(reply.visibility, Visibility::Private);
    assert_eq!(reply.embed.title.as_deref(), Some("Please Post Message In Thread"));

    let close = payload("close", member("Ash"), thread("T-Pikachu-Ash", "Pikachu-Ash"));
    let reply = reply_of(&harness, close).await;
    assert_eq!(reply.embed.title.as_deref(), Some("Close Trade Request"));

    let calls = harness.platform.calls.lock().await.clone();
    assert_eq!(
        calls,
        vec![
            Call::CreateThread { name: "Pikachu-Ash".to_owned() },
            Call::SendMessage { channel_id: "T-Pikachu-Ash".to_owned() },
            Call::ArchiveThread { thread_id: "T-Pikachu-Ash".to_owned() },
            Call::DeleteThread { thread_id: "T-Pikachu-Ash".to_owned() },
        ]
    );
}

#[tokio::test]
async fn gated_commands_never_reach_the_platform() {
    let harness = harness("Pikachu\n");

    let mut open = payload("trade", member("Ash"), channel("general"));
    open.item = Some("Pikachu".to_owned());
    let reply = reply_of(&harness, open).await;
    assert_eq!(
        reply.embed.description.as_deref(),
        Some("This command can only be used in the 'trades' channel.")
    );

    let close = payload("close", member("Misty"), thread("T-Pikachu-Ash", "Pikachu-Ash"));
    let reply = reply_of(&harness, close).await;
    assert_eq!(reply.embed.title.as_deref(), Some("Not Permitted"));

    assert!(
        harness.platform.calls.lock().await.is_empty(),
        "denied interactions must not touch the platform"
    );
}

#[tokio::test]
async fn reload_is_admin_and_audit_channel_only() {
    let harness = harness("Pikachu\nEevee\nSnorlax\n");

    let reply = reply_of(&harness, payload("reload", member("Ash"), channel("change-log"))).await;
    assert_eq!(
        reply.embed.description.as_deref(),
        Some("Ash, you do not have permission to run this command.")
    );
    assert!(harness.roster.is_empty(), "a denied reload must not load the roster");

    let reply = reply_of(&harness, payload("reload", admin("Brock"), channel("trades"))).await;
    assert_eq!(
        reply.embed.description.as_deref(),
        Some("This command can only be used in the 'change-log' channel.")
    );
    assert!(harness.roster.is_empty(), "a denied reload must not load the roster");

    let reply = reply_of(&harness, payload("reload", admin("Brock"), channel("change-log"))).await;
    assert_eq!(reply.embed.description.as_deref(), Some("Loaded 3 entries"));
    assert_eq!(*harness.roster.snapshot(), vec!["Pikachu", "Eevee", "Snorlax"]);
}

#[tokio::test]
async fn help_is_private_and_lists_commands() {
    let harness = harness("Pikachu\n");

    let reply = reply_of(&harness, payload("help", member("Ash"), channel("trades"))).await;
    assert_eq!(reply.visibility, Visibility::Private);
    assert_eq!(reply.embed.title.as_deref(), Some("Bot Commands"));
    assert_eq!(reply.embed.fields.len(), 4);

    let reply = reply_of(&harness, payload("help", member("Ash"), channel("off-topic"))).await;
    assert_eq!(
        reply.embed.description.as_deref(),
        Some("This command can only be used in the 'trades' channel.")
    );
}
