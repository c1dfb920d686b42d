//! Mock platform clients for testing.
//!
//! Every mock records the calls it receives, in order, so tests can assert
//! on what the bot did. Each mock community and trade client owns its own
//! `EventEmitter`; tests drive platform notifications through
//! `emit(...)`.
//!
//! # Example
//!
//! ```ignore
//! let factory = Arc::new(MockClientFactory::new());
//! let bot = Bot::new(credentials, settings, deps_with(factory.clone()));
//!
//! let platform = factory.latest().unwrap();
//! platform.trade.emit("newOffer", json!({"id": 42}));
//! assert_eq!(platform.community.profile_edits(), vec![...]);
//! ```

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::adapters::events::EventEmitter;
use crate::domain::foundation::{
    AccountId, AppId, CommentId, ContextId, GroupId, ResultCode, SharedFileId,
};
use crate::domain::session::SessionCredentials;
use crate::ports::{
    ChatClient, ClientFactory, CommunityActions, CommunityClient, EventSource, GroupInfo,
    Inventory, PhoneStatus, PlatformError, PlatformHandle, ProfileEdit, ProfileTarget,
    StoreClient, TradeClient, TradeManagerOptions, Vote,
};

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A call received by a mock, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    SetCookies(SessionCredentials),
    EditProfile(ProfileEdit),
    SetupProfile,
    GetWebApiKey(String),
    GetGroup(GroupId),
    JoinGroup(GroupId),
    LeaveGroup(GroupId),
    KickFromGroup(GroupId, AccountId),
    SetApiAccess(bool),
    LoadInventory(AppId, ContextId, bool),
    LoadUserInventory(AccountId, AppId, ContextId, bool),
    AddPhoneNumber(String),
    VerifyPhoneNumber(String),
    HasPhone,
    ChatLogIn(Duration),
    ChatLogOut,
    VoteSharedFile(SharedFileId, Vote),
    SetFavourite(SharedFileId, AppId, bool),
    SetSubscribed(SharedFileId, AppId, bool),
    PreviewSharedFile(SharedFileId),
    CommentSharedFile(AccountId, SharedFileId, String),
    DeleteSharedFileComment(AccountId, SharedFileId, CommentId),
    SetFollowing(ProfileTarget, bool),
    InviteToGroup(GroupId, Vec<AccountId>),
}

#[derive(Debug, Default)]
struct CallLog {
    calls: Mutex<Vec<RecordedCall>>,
    /// Errors returned by the next call of a given kind, keyed by method name.
    failures: Mutex<HashMap<&'static str, PlatformError>>,
}

impl CallLog {
    fn record(&self, call: RecordedCall) {
        guard(&self.calls).push(call);
    }

    fn outcome(&self, method: &'static str) -> Result<(), PlatformError> {
        match guard(&self.failures).remove(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail_next(&self, method: &'static str, error: PlatformError) {
        guard(&self.failures).insert(method, error);
    }

    fn calls(&self) -> Vec<RecordedCall> {
        guard(&self.calls).clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Community
// ════════════════════════════════════════════════════════════════════════════

/// Mock community client.
#[derive(Default)]
pub struct MockCommunityClient {
    events: Arc<EventEmitter>,
    log: CallLog,
    api_key: Mutex<Option<String>>,
}

impl MockCommunityClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a platform notification from this client.
    pub fn emit(&self, event_name: &str, payload: JsonValue) -> usize {
        self.events.emit(event_name, payload)
    }

    /// Number of listeners currently attached to this client.
    pub fn listener_count(&self) -> usize {
        self.events.total_listeners()
    }

    /// Makes the next call to `method` fail with `error`.
    pub fn fail_next(&self, method: &'static str, error: PlatformError) {
        self.log.fail_next(method, error);
    }

    pub fn set_api_key(&self, key: impl Into<String>) {
        *guard(&self.api_key) = Some(key.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.log.calls()
    }

    /// Profile edits received, in order.
    pub fn profile_edits(&self) -> Vec<ProfileEdit> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCall::EditProfile(edit) => Some(edit),
                _ => None,
            })
            .collect()
    }

    pub fn cookies_set(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RecordedCall::SetCookies(_)))
            .count()
    }
}

#[async_trait]
impl CommunityClient for MockCommunityClient {
    fn event_source(&self) -> Arc<dyn EventSource> {
        self.events.clone()
    }

    fn set_cookies(&self, credentials: &SessionCredentials) {
        self.log.record(RecordedCall::SetCookies(credentials.clone()));
    }

    async fn edit_profile(&self, edit: ProfileEdit) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::EditProfile(edit));
        self.log.outcome("edit_profile")
    }

    async fn setup_profile(&self) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::SetupProfile);
        self.log.outcome("setup_profile")
    }

    async fn get_web_api_key(&self, domain: &str) -> Result<SecretString, PlatformError> {
        self.log.record(RecordedCall::GetWebApiKey(domain.to_string()));
        self.log.outcome("get_web_api_key")?;
        guard(&self.api_key)
            .clone()
            .map(SecretString::new)
            .ok_or(PlatformError::AccessDenied)
    }

    async fn get_group(&self, group: &GroupId) -> Result<GroupInfo, PlatformError> {
        self.log.record(RecordedCall::GetGroup(group.clone()));
        self.log.outcome("get_group")?;
        Ok(GroupInfo {
            id: group.clone(),
            name: format!("group {}", group),
            member_count: 1,
        })
    }

    async fn join_group(&self, group: &GroupId) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::JoinGroup(group.clone()));
        self.log.outcome("join_group")
    }

    async fn leave_group(&self, group: &GroupId) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::LeaveGroup(group.clone()));
        self.log.outcome("leave_group")
    }

    async fn kick_from_group(
        &self,
        group: &GroupId,
        member: AccountId,
    ) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::KickFromGroup(group.clone(), member));
        self.log.outcome("kick_from_group")
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Trade
// ════════════════════════════════════════════════════════════════════════════

/// Mock trade client.
///
/// The API key probe made by `set_cookies` succeeds unless a probe error is
/// configured with `with_probe_error`.
#[derive(Default)]
pub struct MockTradeClient {
    events: Arc<EventEmitter>,
    log: CallLog,
    probe_error: Mutex<Option<PlatformError>>,
    inventories: Mutex<HashMap<(Option<AccountId>, AppId, ContextId), Inventory>>,
}

impl MockTradeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe_error(self, error: PlatformError) -> Self {
        *guard(&self.probe_error) = Some(error);
        self
    }

    /// Stores the inventory returned for `owner` (`None` for the bot itself).
    pub fn put_inventory(
        &self,
        owner: Option<AccountId>,
        app: AppId,
        context: ContextId,
        inventory: Inventory,
    ) {
        guard(&self.inventories).insert((owner, app, context), inventory);
    }

    pub fn emit(&self, event_name: &str, payload: JsonValue) -> usize {
        self.events.emit(event_name, payload)
    }

    pub fn listener_count(&self) -> usize {
        self.events.total_listeners()
    }

    pub fn fail_next(&self, method: &'static str, error: PlatformError) {
        self.log.fail_next(method, error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.log.calls()
    }

    /// Last value passed to `set_api_access`, if any.
    pub fn api_access(&self) -> Option<bool> {
        self.calls().into_iter().rev().find_map(|c| match c {
            RecordedCall::SetApiAccess(available) => Some(available),
            _ => None,
        })
    }

    fn inventory(&self, owner: Option<AccountId>, app: AppId, context: ContextId) -> Inventory {
        guard(&self.inventories)
            .get(&(owner, app, context))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TradeClient for MockTradeClient {
    fn event_source(&self) -> Arc<dyn EventSource> {
        self.events.clone()
    }

    async fn set_cookies(&self, credentials: &SessionCredentials) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::SetCookies(credentials.clone()));
        match guard(&self.probe_error).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_api_access(&self, available: bool) {
        self.log.record(RecordedCall::SetApiAccess(available));
    }

    async fn load_inventory(
        &self,
        app: AppId,
        context: ContextId,
        tradable_only: bool,
    ) -> Result<Inventory, PlatformError> {
        self.log
            .record(RecordedCall::LoadInventory(app, context, tradable_only));
        self.log.outcome("load_inventory")?;
        Ok(self.inventory(None, app, context))
    }

    async fn load_user_inventory(
        &self,
        owner: AccountId,
        app: AppId,
        context: ContextId,
        tradable_only: bool,
    ) -> Result<Inventory, PlatformError> {
        self.log.record(RecordedCall::LoadUserInventory(
            owner,
            app,
            context,
            tradable_only,
        ));
        self.log.outcome("load_user_inventory")?;
        Ok(self.inventory(Some(owner), app, context))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Store and chat
// ════════════════════════════════════════════════════════════════════════════

/// Mock store client.
#[derive(Default)]
pub struct MockStoreClient {
    log: CallLog,
    phone: Mutex<PhoneStatus>,
}

impl MockStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, method: &'static str, error: PlatformError) {
        self.log.fail_next(method, error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.log.calls()
    }
}

#[async_trait]
impl StoreClient for MockStoreClient {
    fn set_cookies(&self, credentials: &SessionCredentials) {
        self.log.record(RecordedCall::SetCookies(credentials.clone()));
    }

    async fn add_phone_number(&self, number: &str) -> Result<(), PlatformError> {
        self.log
            .record(RecordedCall::AddPhoneNumber(number.to_string()));
        self.log.outcome("add_phone_number")?;
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        let last = digits.len().saturating_sub(4);
        *guard(&self.phone) = PhoneStatus {
            has_phone: false,
            last_digits: Some(digits[last..].to_string()),
        };
        Ok(())
    }

    async fn verify_phone_number(&self, code: &str) -> Result<(), PlatformError> {
        self.log
            .record(RecordedCall::VerifyPhoneNumber(code.to_string()));
        self.log.outcome("verify_phone_number")?;
        let mut phone = guard(&self.phone);
        if phone.last_digits.is_none() {
            return Err(PlatformError::Rejected(ResultCode::InvalidState));
        }
        phone.has_phone = true;
        Ok(())
    }

    async fn has_phone(&self) -> Result<PhoneStatus, PlatformError> {
        self.log.record(RecordedCall::HasPhone);
        self.log.outcome("has_phone")?;
        Ok(guard(&self.phone).clone())
    }
}

/// Mock chat client.
#[derive(Default)]
pub struct MockChatClient {
    log: CallLog,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, method: &'static str, error: PlatformError) {
        self.log.fail_next(method, error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.log.calls()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn log_in(&self, poll_interval: Duration) -> Result<(), PlatformError> {
        self.log.record(RecordedCall::ChatLogIn(poll_interval));
        self.log.outcome("log_in")
    }

    async fn log_out(&self) {
        self.log.record(RecordedCall::ChatLogOut);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Community form actions
// ════════════════════════════════════════════════════════════════════════════

/// Mock community form actions.
#[derive(Default)]
pub struct MockCommunityActions {
    log: CallLog,
    sessions: Mutex<Vec<SessionCredentials>>,
    holds: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

impl MockCommunityActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, method: &'static str, error: PlatformError) {
        self.log.fail_next(method, error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.log.calls()
    }

    /// Sessions each action was performed with, in order.
    pub fn sessions(&self) -> Vec<SessionCredentials> {
        guard(&self.sessions).clone()
    }

    /// The next call to `method` is recorded, then waits until the returned
    /// handle is notified.
    pub fn hold_next(&self, method: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        guard(&self.holds).insert(method, gate.clone());
        gate
    }

    async fn act(
        &self,
        session: &SessionCredentials,
        method: &'static str,
        call: RecordedCall,
    ) -> Result<(), PlatformError> {
        guard(&self.sessions).push(session.clone());
        self.log.record(call);
        let held = guard(&self.holds).remove(method);
        if let Some(gate) = held {
            gate.notified().await;
        }
        self.log.outcome(method)
    }
}

#[async_trait]
impl CommunityActions for MockCommunityActions {
    async fn vote_shared_file(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        vote: Vote,
    ) -> Result<(), PlatformError> {
        self.act(session, "vote_shared_file", RecordedCall::VoteSharedFile(file, vote)).await
    }

    async fn set_favourite(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        app: AppId,
        favourite: bool,
    ) -> Result<(), PlatformError> {
        self.act(
            session,
            "set_favourite",
            RecordedCall::SetFavourite(file, app, favourite),
        )
        .await
    }

    async fn set_subscribed(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        app: AppId,
        subscribed: bool,
    ) -> Result<(), PlatformError> {
        self.act(
            session,
            "set_subscribed",
            RecordedCall::SetSubscribed(file, app, subscribed),
        )
        .await
    }

    async fn preview_shared_file(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
    ) -> Result<(), PlatformError> {
        self.act(session, "preview_shared_file", RecordedCall::PreviewSharedFile(file)).await
    }

    async fn comment_shared_file(
        &self,
        session: &SessionCredentials,
        owner: AccountId,
        file: SharedFileId,
        comment: &str,
    ) -> Result<(), PlatformError> {
        self.act(
            session,
            "comment_shared_file",
            RecordedCall::CommentSharedFile(owner, file, comment.to_string()),
        )
        .await
    }

    async fn delete_shared_file_comment(
        &self,
        session: &SessionCredentials,
        owner: AccountId,
        file: SharedFileId,
        comment: &CommentId,
    ) -> Result<(), PlatformError> {
        self.act(
            session,
            "delete_shared_file_comment",
            RecordedCall::DeleteSharedFileComment(owner, file, comment.clone()),
        )
        .await
    }

    async fn set_following(
        &self,
        session: &SessionCredentials,
        target: &ProfileTarget,
        follow: bool,
    ) -> Result<(), PlatformError> {
        self.act(
            session,
            "set_following",
            RecordedCall::SetFollowing(target.clone(), follow),
        )
        .await
    }

    async fn invite_to_group(
        &self,
        session: &SessionCredentials,
        _inviter: &str,
        group: &GroupId,
        invitees: &[AccountId],
    ) -> Result<(), PlatformError> {
        self.act(
            session,
            "invite_to_group",
            RecordedCall::InviteToGroup(group.clone(), invitees.to_vec()),
        )
        .await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Factory
// ════════════════════════════════════════════════════════════════════════════

/// The concrete mocks behind one `PlatformHandle`.
#[derive(Clone)]
pub struct MockPlatform {
    pub generation: u64,
    pub community: Arc<MockCommunityClient>,
    pub trade: Arc<MockTradeClient>,
    pub store: Arc<MockStoreClient>,
    pub chat: Arc<MockChatClient>,
}

/// Builds mock clients and keeps every generation for inspection.
#[derive(Default)]
pub struct MockClientFactory {
    built: Mutex<Vec<MockPlatform>>,
    options: Mutex<Vec<TradeManagerOptions>>,
    probe_error: Mutex<Option<PlatformError>>,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trade clients built from now on fail their API key probe with `error`.
    pub fn with_probe_error(self, error: PlatformError) -> Self {
        *guard(&self.probe_error) = Some(error);
        self
    }

    /// Every generation built so far, oldest first.
    pub fn built(&self) -> Vec<MockPlatform> {
        guard(&self.built).clone()
    }

    /// Options passed to each build, oldest first.
    pub fn options(&self) -> Vec<TradeManagerOptions> {
        guard(&self.options).clone()
    }

    /// Most recently built generation.
    pub fn latest(&self) -> Option<MockPlatform> {
        guard(&self.built).last().cloned()
    }
}

impl ClientFactory for MockClientFactory {
    fn build(&self, generation: u64, options: &TradeManagerOptions) -> PlatformHandle {
        let trade = match guard(&self.probe_error).clone() {
            Some(err) => MockTradeClient::new().with_probe_error(err),
            None => MockTradeClient::new(),
        };
        let platform = MockPlatform {
            generation,
            community: Arc::new(MockCommunityClient::new()),
            trade: Arc::new(trade),
            store: Arc::new(MockStoreClient::new()),
            chat: Arc::new(MockChatClient::new()),
        };
        guard(&self.built).push(platform.clone());
        guard(&self.options).push(options.clone());

        PlatformHandle {
            generation,
            community: platform.community,
            trade: platform.trade,
            store: platform.store,
            chat: platform.chat,
        }
    }
}
