use std::sync::Arc;

use tracing::{info, warn};

use tradepost_chat::commands::GatePolicy;
use tradepost_chat::events::{CommandInvocationHandler, EventDispatcher};
use tradepost_chat::gateway::{GatewayRunner, NoopPlatformClient, PlatformClient};
use tradepost_chat::threads::TradeThreadService;
use tradepost_core::config::AppConfig;
use tradepost_core::ItemRoster;

pub struct Application {
    pub config: AppConfig,
    pub roster: Arc<ItemRoster>,
    pub gateway: GatewayRunner,
}

/// Assembles the running application from a validated config. A missing
/// roster file is tolerated here; everything fatal has already been caught
/// by config validation.
pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let roster = Arc::new(ItemRoster::new());
    match roster.load_from(&config.roster.path) {
        Ok(count) => {
            info!(
                event_name = "system.bootstrap.roster_loaded",
                count,
                path = %config.roster.path.display(),
                correlation_id = "bootstrap",
                "item roster loaded"
            );
        }
        Err(error) => {
            // Not fatal: /reload can pick the file up once it exists.
            warn!(
                event_name = "system.bootstrap.roster_load_failed",
                path = %config.roster.path.display(),
                correlation_id = "bootstrap",
                error = %error,
                "item roster load failed; starting with an empty roster"
            );
        }
    }

    let platform: Arc<dyn PlatformClient> = Arc::new(NoopPlatformClient);
    let service = TradeThreadService::new(
        Arc::clone(&platform),
        Arc::clone(&roster),
        config.roster.path.clone(),
    );
    let policy = GatePolicy {
        trade_channel: config.chat.trade_channel.clone(),
        audit_channel: config.chat.audit_channel.clone(),
    };

    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(CommandInvocationHandler::new(service, policy));

    let gateway = GatewayRunner::with_dispatcher(dispatcher);

    Application { config, roster, gateway }
}
