//! # Bot Controller
//!
//! Composition root: owns the command registry, button router and message
//! pipeline, wires them to the gateway callbacks and tracks the connection
//! lifecycle.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Panicking command handlers are logged and cleaned up
//! - 1.1.0: Handler timeout for inline command execution
//! - 1.0.0: Initial gateway wiring

use anyhow::{anyhow, Result};
use futures::FutureExt;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::application::component::ComponentType;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use uuid::Uuid;

use crate::commands::handlers::map_all_buttons;
use crate::commands::{
    default_registry, log_command_result, register_global_commands, register_guild_commands,
    CommandFailure, CommandInvocation, CommandRegistry,
};
use crate::core::tasks::panic_message;
use crate::core::{BotMode, BotSettings};
use crate::discord;
use crate::message_components::{ButtonClick, ButtonRouter};
use crate::message_gate::{IncomingMessage, MessageGate, MessagePipeline};
use crate::notifications::{build_event_bus, EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Disconnected = 0,
    Connecting = 1,
    Ready = 2,
    Running = 3,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => LifecycleState::Connecting,
            2 => LifecycleState::Ready,
            3 => LifecycleState::Running,
            _ => LifecycleState::Disconnected,
        }
    }

    fn can_advance_to(self, next: LifecycleState) -> bool {
        matches!(
            (self, next),
            (LifecycleState::Disconnected, LifecycleState::Connecting)
                | (LifecycleState::Connecting, LifecycleState::Ready)
                | (LifecycleState::Ready, LifecycleState::Running)
                | (
                    LifecycleState::Connecting | LifecycleState::Ready | LifecycleState::Running,
                    LifecycleState::Disconnected
                )
        )
    }
}

/// Connection state shared between the controller and the gateway callbacks
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Disconnected as u8),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `next` if the transition is legal; false (and logged) otherwise
    pub fn advance(&self, next: LifecycleState) -> bool {
        let result = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                LifecycleState::from_u8(raw)
                    .can_advance_to(next)
                    .then_some(next as u8)
            });

        match result {
            Ok(prev) => {
                info!(
                    "Lifecycle: {:?} -> {next:?}",
                    LifecycleState::from_u8(prev)
                );
                true
            }
            Err(current) => {
                warn!(
                    "Lifecycle: rejected {:?} -> {next:?}",
                    LifecycleState::from_u8(current)
                );
                false
            }
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BotController {
    settings: BotSettings,
    commands: CommandRegistry,
    buttons: Arc<ButtonRouter>,
    pipeline: MessagePipeline,
    lifecycle: Arc<Lifecycle>,
}

impl BotController {
    pub fn new(
        settings: BotSettings,
        bus: EventBus,
        commands: CommandRegistry,
        buttons: ButtonRouter,
    ) -> Self {
        let pipeline = MessagePipeline::new(MessageGate::new(settings.guild_id), Arc::new(bus));
        Self {
            settings,
            commands,
            buttons: Arc::new(buttons),
            pipeline,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    /// Controller with every built-in handler, command and button
    pub fn from_settings(settings: BotSettings) -> Result<Self> {
        let bus = build_event_bus();
        let mut buttons = ButtonRouter::new();
        map_all_buttons(&mut buttons)?;
        Ok(Self::new(settings, bus, default_registry(), buttons))
    }

    pub fn lifecycle(&self) -> Arc<Lifecycle> {
        self.lifecycle.clone()
    }

    /// Run a slash command inline under the handler timeout
    ///
    /// A handler panic is treated as an exception. Execution faults delete
    /// the original response on a best-effort basis;
    /// every failure is logged with its reason code.
    pub async fn handle_command(
        &self,
        invocation: &CommandInvocation,
    ) -> Result<(), CommandFailure> {
        let budget = self.settings.handler_timeout;
        let guarded = AssertUnwindSafe(self.commands.execute(invocation)).catch_unwind();
        let result = match timeout(budget, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(CommandFailure::Exception(anyhow!(
                "handler panicked: {}",
                panic_message(payload.as_ref())
            ))),
            Err(_) => Err(CommandFailure::TimedOut(budget)),
        };

        log_command_result(invocation, &result);

        if let Err(failure) = &result {
            if failure.is_execution_fault() {
                if let Err(e) = invocation.responder.delete_original_response().await {
                    warn!(
                        "[{}] Could not delete original response: {e}",
                        invocation.request_id
                    );
                }
            }
        }

        result
    }

    /// Route a button click on a detached task
    pub fn handle_button(&self, click: ButtonClick) -> JoinHandle<()> {
        self.buttons.dispatch(click)
    }

    /// Gate a message and publish it on a detached task if admitted
    pub fn handle_message(&self, message: IncomingMessage) -> Option<JoinHandle<()>> {
        self.pipeline.ingest(message)
    }

    /// Connect to the gateway and block until the client stops
    pub async fn run(self) -> Result<()> {
        let lifecycle = self.lifecycle.clone();
        let token = self.settings.token.clone();

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        lifecycle.advance(LifecycleState::Connecting);

        let mut client = match Client::builder(&token, intents).event_handler(self).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to create Discord client: {e}");
                lifecycle.advance(LifecycleState::Disconnected);
                return Err(anyhow::anyhow!("Client creation failed: {}", e));
            }
        };

        info!("Establishing WebSocket connection to Discord gateway...");
        info!("Gateway intents: {intents:?}");

        if let Err(why) = client.start().await {
            error!("Gateway connection failed: {why:?}");
            lifecycle.advance(LifecycleState::Disconnected);
            return Err(anyhow::anyhow!(
                "Failed to establish gateway connection: {}",
                why
            ));
        }

        lifecycle.advance(LifecycleState::Disconnected);
        Ok(())
    }
}

#[async_trait]
impl EventHandler for BotController {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        if self.lifecycle.state() == LifecycleState::Running {
            info!("🔁 Gateway session re-identified, commands already registered");
            return;
        }
        self.lifecycle.advance(LifecycleState::Ready);

        match self.settings.mode {
            BotMode::Development => {
                let guild_id = GuildId(self.settings.guild_id);
                info!("🔧 Development mode: Registering commands for guild {guild_id}");
                if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                    error!("❌ Failed to register guild slash commands: {e}");
                }
            }
            BotMode::Production => {
                info!("🌍 Production mode: Registering commands globally");
                if let Err(e) = register_global_commands(&ctx).await {
                    error!("❌ Failed to register global slash commands: {e}");
                }
            }
        }

        self.lifecycle.advance(LifecycleState::Running);
        info!("Connected as -> [{}] :)", ready.user.name);
    }

    async fn resume(&self, _ctx: Context, _resumed: ResumedEvent) {
        info!("🔄 Gateway session resumed");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let _detached = self.handle_message(IncomingMessage::from(&msg));
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let invocation = discord::command_invocation(&ctx, command, Uuid::new_v4());
                info!(
                    "[{}] /{} invoked by user {}",
                    invocation.request_id, invocation.name, invocation.user_id
                );
                if let Err(failure) = self.handle_command(&invocation).await {
                    debug!(
                        "[{}] /{} ended with {}",
                        invocation.request_id,
                        invocation.name,
                        failure.reason_code()
                    );
                }
            }
            Interaction::MessageComponent(component) => {
                if component.data.component_type == ComponentType::Button {
                    let click = discord::button_click(&ctx, component, Uuid::new_v4());
                    let _detached = self.handle_button(click);
                } else {
                    debug!(
                        "Ignoring non-button component {}",
                        component.data.custom_id
                    );
                }
            }
            _ => debug!("Ignoring unsupported interaction kind"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SlashCommandHandler;
    use crate::core::response::testing::RecordingResponder;
    use crate::features::message_log::MessageLogHandler;
    use crate::message_components::PROCESSING_ERROR_REPLY;
    use crate::notifications::MessageReceivedEvent;
    use std::time::Duration;

    const GUILD: u64 = 555;

    fn settings(handler_timeout: Duration) -> BotSettings {
        BotSettings {
            token: "token".to_string(),
            guild_id: GUILD,
            mode: BotMode::Development,
            handler_timeout,
            log_level: "debug".to_string(),
        }
    }

    struct SlowHandler;

    #[async_trait]
    impl SlashCommandHandler for SlowHandler {
        fn command_names(&self) -> &'static [&'static str] {
            &["slow"]
        }

        async fn handle(&self, _invocation: &CommandInvocation) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl SlashCommandHandler for FailingHandler {
        fn command_names(&self) -> &'static [&'static str] {
            &["broken"]
        }

        async fn handle(&self, _invocation: &CommandInvocation) -> Result<()> {
            anyhow::bail!("something broke")
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl SlashCommandHandler for PanickingHandler {
        fn command_names(&self) -> &'static [&'static str] {
            &["crash"]
        }

        async fn handle(&self, _invocation: &CommandInvocation) -> Result<()> {
            panic!("command bug");
        }
    }

    fn controller_with(handlers: Vec<Arc<dyn SlashCommandHandler>>) -> BotController {
        let mut registry = default_registry();
        for handler in handlers {
            registry.register(handler);
        }
        let mut buttons = ButtonRouter::new();
        map_all_buttons(&mut buttons).unwrap();
        BotController::new(
            settings(Duration::from_millis(50)),
            EventBus::new(),
            registry,
            buttons,
        )
    }

    fn invocation(name: &str, responder: &Arc<RecordingResponder>) -> CommandInvocation {
        CommandInvocation {
            name: name.to_string(),
            user_id: 1,
            request_id: Uuid::new_v4(),
            responder: responder.clone(),
        }
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Disconnected);

        assert!(lifecycle.advance(LifecycleState::Connecting));
        assert!(lifecycle.advance(LifecycleState::Ready));
        assert!(lifecycle.advance(LifecycleState::Running));
        assert_eq!(lifecycle.state(), LifecycleState::Running);

        assert!(lifecycle.advance(LifecycleState::Disconnected));
        assert_eq!(lifecycle.state(), LifecycleState::Disconnected);
    }

    #[test]
    fn test_lifecycle_rejects_skips() {
        let lifecycle = Lifecycle::new();
        assert!(!lifecycle.advance(LifecycleState::Ready));
        assert!(!lifecycle.advance(LifecycleState::Running));
        assert!(!lifecycle.advance(LifecycleState::Disconnected));
        assert_eq!(lifecycle.state(), LifecycleState::Disconnected);

        assert!(lifecycle.advance(LifecycleState::Connecting));
        assert!(!lifecycle.advance(LifecycleState::Running));
        assert!(!lifecycle.advance(LifecycleState::Connecting));
        assert_eq!(lifecycle.state(), LifecycleState::Connecting);
    }

    #[test]
    fn test_connecting_failure_returns_to_disconnected() {
        let lifecycle = Lifecycle::new();
        lifecycle.advance(LifecycleState::Connecting);
        assert!(lifecycle.advance(LifecycleState::Disconnected));
    }

    #[test]
    fn test_from_settings_wires_builtins() {
        let controller = BotController::from_settings(settings(Duration::from_secs(15))).unwrap();
        assert!(controller.commands.contains("random"));
        assert_eq!(controller.buttons.len(), 1);
        assert_eq!(
            controller.pipeline.bus().handler_count::<MessageReceivedEvent>(),
            1
        );
        assert_eq!(controller.lifecycle().state(), LifecycleState::Disconnected);
    }

    #[tokio::test]
    async fn test_random_command_succeeds() {
        let controller = controller_with(vec![]);
        let responder = Arc::new(RecordingResponder::default());

        let result = controller
            .handle_command(&invocation("random", &responder))
            .await;

        assert!(result.is_ok());
        assert_eq!(responder.replies().len(), 1);
        assert_eq!(responder.deletions(), 0);
    }

    #[tokio::test]
    async fn test_exception_deletes_original_response() {
        let controller = controller_with(vec![Arc::new(FailingHandler)]);
        let responder = Arc::new(RecordingResponder::default());

        let failure = controller
            .handle_command(&invocation("broken", &responder))
            .await
            .unwrap_err();

        assert_eq!(failure.reason_code(), "exception");
        assert_eq!(responder.deletions(), 1);
    }

    #[tokio::test]
    async fn test_panicking_command_deletes_original_response() {
        let controller = controller_with(vec![Arc::new(PanickingHandler)]);
        let responder = Arc::new(RecordingResponder::default());

        let failure = controller
            .handle_command(&invocation("crash", &responder))
            .await
            .unwrap_err();

        assert_eq!(failure.reason_code(), "exception");
        assert!(failure.to_string().contains("command bug"));
        assert_eq!(responder.deletions(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_execution_fault() {
        let controller = controller_with(vec![Arc::new(SlowHandler)]);
        let responder = Arc::new(RecordingResponder::default());

        let failure = controller
            .handle_command(&invocation("slow", &responder))
            .await
            .unwrap_err();

        assert!(matches!(failure, CommandFailure::TimedOut(_)));
        assert_eq!(responder.deletions(), 1);
    }

    #[tokio::test]
    async fn test_unknown_command_only_logged() {
        let controller = controller_with(vec![]);
        let responder = Arc::new(RecordingResponder::default());

        let failure = controller
            .handle_command(&invocation("missing", &responder))
            .await
            .unwrap_err();

        assert_eq!(failure.reason_code(), "unknown_command");
        assert_eq!(responder.deletions(), 0);
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_unmapped_button_gets_error_reply() {
        let controller = controller_with(vec![]);
        let responder = Arc::new(RecordingResponder::default());
        let click = ButtonClick {
            custom_id: "stale_button".to_string(),
            user_id: 2,
            request_id: Uuid::new_v4(),
            responder: responder.clone(),
        };

        controller.handle_button(click).await.unwrap();

        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].ephemeral);
        assert_eq!(replies[0].content, PROCESSING_ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_message_end_to_end() {
        let log_handler = Arc::new(MessageLogHandler::new());
        let mut bus = EventBus::new();
        bus.subscribe::<MessageReceivedEvent>(log_handler.clone());
        let controller = BotController::new(
            settings(Duration::from_secs(1)),
            bus,
            CommandRegistry::new(),
            ButtonRouter::new(),
        );

        let from_bot = IncomingMessage {
            author_is_bot: true,
            ..IncomingMessage::sample(8, false, Some(GUILD))
        };
        assert!(controller.handle_message(from_bot).is_none());

        controller
            .handle_message(IncomingMessage::sample(8, false, Some(GUILD)))
            .expect("human message in guild is admitted")
            .await
            .unwrap();

        assert_eq!(controller.pipeline.bus().events_published(), 1);
        assert_eq!(log_handler.received(), 1);
    }
}
