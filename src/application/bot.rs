//! The bot: one platform account with its session, queue and event surface.
//!
//! `Bot` is always held in an `Arc`. Gated operations capture a clone of it
//! when they run, so a replayed operation sees the session and platform
//! clients as they are at replay time, not as they were when it was queued.

use secrecy::SecretString;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::event_bridge::{ChattingWith, EventBridge};
use super::BotError;
use crate::adapters::events::EventEmitter;
use crate::config::{BotSettings, PlatformConfig, ValidationError as SettingsError};
use crate::domain::deferred::DeferredQueue;
use crate::domain::foundation::{AccountId, Listener, ListenerId, SessionStatus};
use crate::domain::session::{ApiAccess, LoginCredentials, SessionCredentials, SessionState};
use crate::ports::{Authenticator, ClientFactory, CommunityActions, PlatformHandle};

/// External collaborators a bot is built from.
#[derive(Clone)]
pub struct BotDeps {
    pub authenticator: Arc<dyn Authenticator>,
    pub client_factory: Arc<dyn ClientFactory>,
    pub community_actions: Arc<dyn CommunityActions>,
    pub platform: PlatformConfig,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A platform account under management.
pub struct Bot {
    pub(super) credentials: LoginCredentials,
    pub(super) display_name: RwLock<Option<String>>,
    pub(super) settings: RwLock<BotSettings>,
    pub(super) deps: BotDeps,
    pub(super) session: RwLock<SessionState>,
    pub(super) platform: RwLock<Arc<PlatformHandle>>,
    pub(super) queue: DeferredQueue<Arc<Bot>>,
    pub(super) bridge: EventBridge,
    pub(super) events: Arc<EventEmitter>,
    pub(super) chatting: Arc<RwLock<Option<ChattingWith>>>,
    pub(super) rate_limited: AtomicBool,
    /// Serializes session start, end and login.
    pub(super) lifecycle: tokio::sync::Mutex<()>,
}

impl Bot {
    /// Builds an unauthenticated bot with its first generation of clients.
    pub fn new(credentials: LoginCredentials, settings: BotSettings, deps: BotDeps) -> Arc<Self> {
        let platform = deps
            .client_factory
            .build(0, &settings.trade_manager_options());
        let events = Arc::new(EventEmitter::new());

        tracing::debug!(account = credentials.account_name(), "Bot created");

        Arc::new(Self {
            display_name: RwLock::new(credentials.display_name().map(str::to_string)),
            credentials,
            settings: RwLock::new(settings),
            deps,
            session: RwLock::new(SessionState::new()),
            platform: RwLock::new(Arc::new(platform)),
            queue: DeferredQueue::new(),
            bridge: EventBridge::new(events.clone()),
            events,
            chatting: Arc::new(RwLock::new(None)),
            rate_limited: AtomicBool::new(false),
            lifecycle: tokio::sync::Mutex::new(()),
        })
    }

    // ─── Events ───────────────────────────────────────────────────────────

    /// Subscribes to an outward event.
    pub fn on(&self, event_name: &str, listener: Listener) -> ListenerId {
        self.events.on(event_name, listener)
    }

    pub fn off(&self, listener: ListenerId) -> bool {
        self.events.off(listener)
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.events.listener_count(event_name)
    }

    // ─── Identity ─────────────────────────────────────────────────────────

    pub fn account_name(&self) -> &str {
        self.credentials.account_name()
    }

    /// Profile name last set through `change_name`, or the configured one.
    pub fn display_name(&self) -> Option<String> {
        read(&self.display_name).clone()
    }

    pub fn rate_limited(&self) -> bool {
        self.rate_limited.load(Ordering::Acquire)
    }

    pub fn set_rate_limited(&self, rate_limited: bool) {
        self.rate_limited.store(rate_limited, Ordering::Release);
    }

    /// Parses an account id in any of its textual forms.
    pub fn get_user(&self, id: &str) -> Result<AccountId, BotError> {
        Ok(id.parse()?)
    }

    // ─── Chat ─────────────────────────────────────────────────────────────

    /// Sets the account whose chat messages are logged as they arrive.
    pub fn set_chatting(&self, partner: Option<ChattingWith>) {
        if let Some(ref partner) = partner {
            tracing::info!(username = %partner.username, account = %partner.account, "Chatting with");
        }
        *write(&self.chatting) = partner;
    }

    pub fn chatting(&self) -> Option<ChattingWith> {
        read(&self.chatting).clone()
    }

    // ─── Settings ─────────────────────────────────────────────────────────

    pub fn settings(&self) -> BotSettings {
        read(&self.settings).clone()
    }

    pub fn get_setting(&self, name: &str) -> Option<JsonValue> {
        read(&self.settings).get_setting(name)
    }

    pub fn set_setting(
        &self,
        name: impl Into<String>,
        value: JsonValue,
    ) -> Result<Option<JsonValue>, SettingsError> {
        write(&self.settings).set_setting(name, value)
    }

    pub fn delete_setting(&self, name: &str) -> Option<JsonValue> {
        write(&self.settings).delete_setting(name)
    }

    // ─── Session ──────────────────────────────────────────────────────────

    pub fn session_status(&self) -> SessionStatus {
        read(&self.session).status()
    }

    pub fn api_access(&self) -> ApiAccess {
        read(&self.session).api_access()
    }

    /// Generation of the current platform clients.
    pub fn generation(&self) -> u64 {
        read(&self.platform).generation
    }

    /// Operations waiting for login.
    pub fn pending_operations(&self) -> usize {
        self.queue.pending_total()
    }

    pub(super) fn session_state(&self) -> RwLockReadGuard<'_, SessionState> {
        read(&self.session)
    }

    pub(super) fn session_state_mut(&self) -> RwLockWriteGuard<'_, SessionState> {
        write(&self.session)
    }

    /// Current platform clients.
    pub(super) fn platform(&self) -> Arc<PlatformHandle> {
        read(&self.platform).clone()
    }

    pub(super) fn replace_platform(&self, handle: PlatformHandle) {
        *write(&self.platform) = Arc::new(handle);
    }

    pub(super) fn set_display_name(&self, name: String) {
        *write(&self.display_name) = Some(name);
    }

    pub(super) fn store_api_key(&self, key: SecretString) {
        write(&self.settings).api_key = Some(key);
    }

    /// Cookies and session id of the live session.
    pub(super) fn session_credentials(&self) -> Result<SessionCredentials, BotError> {
        self.session_state()
            .credentials()
            .cloned()
            .ok_or(BotError::NotAuthenticated)
    }
}
