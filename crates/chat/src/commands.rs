use async_trait::async_trait;
use thiserror::Error;

use crate::embeds::{self, Reply};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub display_name: String,
    pub is_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
    pub is_thread: bool,
}

/// One inbound command interaction, as delivered by the platform substrate.
/// Argument values arrive already split out by the substrate's command
/// registration; nothing here is retained past the reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPayload {
    pub command: String,
    pub item: Option<String>,
    pub features: Option<String>,
    pub caller: Caller,
    pub channel: ChannelRef,
    pub request_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TradeCommand {
    Help,
    Trade { item: String, features: String },
    Close,
    Reload,
    Unknown { name: String },
}

pub fn classify_command(payload: &CommandPayload) -> TradeCommand {
    match payload.command.trim().to_ascii_lowercase().as_str() {
        "help" => TradeCommand::Help,
        "trade" => TradeCommand::Trade {
            item: payload.item.clone().unwrap_or_default().trim().to_owned(),
            features: payload.features.clone().unwrap_or_default(),
        },
        "close" => TradeCommand::Close,
        "reload" => TradeCommand::Reload,
        other => TradeCommand::Unknown { name: other.to_owned() },
    }
}

/// Channel names each operation is pinned to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatePolicy {
    pub trade_channel: String,
    pub audit_channel: String,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self { trade_channel: "trades".to_owned(), audit_channel: "change-log".to_owned() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GateDenial {
    #[error("command restricted to the `{channel}` channel")]
    WrongChannel { channel: String },
    #[error("command restricted to trade threads")]
    OutsideThread,
    #[error("`{display_name}` is not the requestor of this thread")]
    NotRequestor { display_name: String },
    #[error("`{display_name}` lacks administrator permission")]
    NotAdministrator { display_name: String },
}

impl GateDenial {
    /// Every denial maps to exactly one private reply and no state change.
    pub fn reply(&self) -> Reply {
        let embed = match self {
            Self::WrongChannel { channel } => embeds::wrong_channel_message(channel),
            Self::OutsideThread => embeds::thread_only_message(),
            Self::NotRequestor { display_name } => embeds::not_permitted_message(display_name),
            Self::NotAdministrator { display_name } => {
                embeds::no_run_permission_message(display_name)
            }
        };
        Reply::private(embed)
    }
}

/// Location and permission checks, evaluated before any state change.
///
/// `help` and `trade` must come from the trade channel. `close` must come
/// from inside a thread whose name contains the caller's display name (the
/// thread name is `{item}-{requestor}`, so the requestor's name is embedded
/// at creation). `reload` requires administrator permission first, then the
/// audit channel. Channel names compare case-insensitively.
pub fn authorize(
    command: &TradeCommand,
    caller: &Caller,
    channel: &ChannelRef,
    policy: &GatePolicy,
) -> Result<(), GateDenial> {
    match command {
        TradeCommand::Help | TradeCommand::Trade { .. } => {
            require_channel(channel, &policy.trade_channel)
        }
        TradeCommand::Close => {
            if !channel.is_thread {
                return Err(GateDenial::OutsideThread);
            }
            if !channel.name.contains(&caller.display_name) {
                return Err(GateDenial::NotRequestor {
                    display_name: caller.display_name.clone(),
                });
            }
            Ok(())
        }
        TradeCommand::Reload => {
            if !caller.is_admin {
                return Err(GateDenial::NotAdministrator {
                    display_name: caller.display_name.clone(),
                });
            }
            require_channel(channel, &policy.audit_channel)
        }
        TradeCommand::Unknown { .. } => Ok(()),
    }
}

fn require_channel(channel: &ChannelRef, expected: &str) -> Result<(), GateDenial> {
    if channel.name.to_lowercase() == expected.to_lowercase() {
        Ok(())
    } else {
        Err(GateDenial::WrongChannel { channel: expected.to_owned() })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

pub struct CommandRouter<S> {
    service: S,
    policy: GatePolicy,
}

impl<S> CommandRouter<S>
where
    S: TradeCommandService,
{
    pub fn new(service: S, policy: GatePolicy) -> Self {
        Self { service, policy }
    }

    pub async fn route(&self, payload: CommandPayload) -> Result<Reply, CommandRouteError> {
        let command = classify_command(&payload);
        if let Err(denial) = authorize(&command, &payload.caller, &payload.channel, &self.policy) {
            return Ok(denial.reply());
        }

        match command {
            TradeCommand::Help => Ok(Reply::private(embeds::help_message(
                &self.policy.trade_channel,
                &self.policy.audit_channel,
            ))),
            TradeCommand::Trade { item, .. } if item.is_empty() => {
                Ok(Reply::private(embeds::missing_item_message()))
            }
            TradeCommand::Trade { item, features } => {
                self.service.open_trade(item, features, &payload).await
            }
            TradeCommand::Close => self.service.close_trade(&payload).await,
            TradeCommand::Reload => self.service.reload_roster(&payload).await,
            TradeCommand::Unknown { name } => {
                Ok(Reply::private(embeds::unknown_command_message(&name)))
            }
        }
    }
}

#[async_trait]
pub trait TradeCommandService: Send + Sync {
    async fn open_trade(
        &self,
        item: String,
        features: String,
        payload: &CommandPayload,
    ) -> Result<Reply, CommandRouteError>;

    async fn close_trade(&self, payload: &CommandPayload) -> Result<Reply, CommandRouteError>;

    async fn reload_roster(&self, payload: &CommandPayload) -> Result<Reply, CommandRouteError>;
}

/// Stand-in service used by the default dispatcher and tests; produces the
/// right reply shapes without touching any platform.
#[derive(Default)]
pub struct NoopTradeCommandService;

#[async_trait]
impl TradeCommandService for NoopTradeCommandService {
    async fn open_trade(
        &self,
        item: String,
        _features: String,
        payload: &CommandPayload,
    ) -> Result<Reply, CommandRouteError> {
        let thread_name = format!("{item}-{}", payload.caller.display_name);
        Ok(Reply::private(embeds::post_prompt_message(&format!("#{thread_name}"))))
    }

    async fn close_trade(&self, payload: &CommandPayload) -> Result<Reply, CommandRouteError> {
        Ok(Reply::private(embeds::close_notice_message(&payload.caller.display_name)))
    }

    async fn reload_roster(&self, _payload: &CommandPayload) -> Result<Reply, CommandRouteError> {
        Ok(Reply::private(embeds::roster_loaded_message(0)))
    }
}
