//! Session lifecycle: login, session start and session end.
//!
//! # Session Start
//!
//! ```text
//! begin_session(cookies, session_id)
//!   1. state: Unauthenticated/Authenticating → Authenticated
//!   2. cookies → community, store
//!   3. cookies → trade (API key probe decides api_access)
//!   4. chat log in (new sessions only)
//!   5. bridge attaches community + trade sources
//!   6. "login" queue drained in order
//!   7. "loggedIn" emitted
//! ```
//!
//! Every transition holds the lifecycle mutex, so a session can never be
//! started and ended at the same time.

use serde_json::json;
use std::sync::Arc;

use super::event_bridge::{community_events, trade_events};
use super::{Bot, BotError};
use crate::domain::deferred::QueueName;
use crate::domain::foundation::{names, SessionId};
use crate::domain::session::{
    ApiAccess, AuthError, Establishment, LoginCredentials, SessionCookies, SessionCredentials,
};

impl Bot {
    pub fn is_authenticated(&self) -> bool {
        self.session_state().is_authenticated()
    }

    /// Starts (or refreshes) a session from cookies and a session id.
    ///
    /// Identical values on an authenticated bot change nothing and emit
    /// nothing. `loggedIn` fires only on the transition into an
    /// authenticated session, after queued operations have been replayed.
    ///
    /// # Errors
    ///
    /// `BotError::Validation` if the session cannot move to authenticated.
    /// A failed API key probe is not an error; it degrades `api_access`.
    ///
    /// # Blocking
    ///
    /// Resolves only after every queued operation has been replayed, each
    /// awaited in turn under the lifecycle mutex. `end_session` and `log_in`
    /// wait behind the whole replay, including any platform request
    /// timeouts it runs into.
    pub async fn begin_session(
        self: &Arc<Self>,
        cookies: SessionCookies,
        session_id: SessionId,
    ) -> Result<Establishment, BotError> {
        let _lifecycle = self.lifecycle.lock().await;
        self.establish(SessionCredentials::new(cookies, session_id))
            .await
    }

    /// Must be called with the lifecycle mutex held.
    async fn establish(
        self: &Arc<Self>,
        credentials: SessionCredentials,
    ) -> Result<Establishment, BotError> {
        // 1. Store credentials and flip state
        let establishment = self.session_state_mut().establish(credentials.clone())?;
        if establishment == Establishment::Unchanged {
            tracing::debug!(account = self.account_name(), "Session unchanged");
            return Ok(establishment);
        }

        let platform = self.platform();

        // 2. Propagate cookies
        platform.community.set_cookies(&credentials);
        platform.store.set_cookies(&credentials);

        // 3. Trade client probes for a web API key
        let api_access = match platform.trade.set_cookies(&credentials).await {
            Ok(()) => ApiAccess::Available,
            Err(err) => {
                tracing::warn!(
                    account = self.account_name(),
                    error = %err,
                    "API key unavailable, offer overflow cancellation disabled"
                );
                if err.is_access_denied() {
                    ApiAccess::Unavailable
                } else {
                    ApiAccess::Unknown
                }
            }
        };
        platform.trade.set_api_access(api_access.is_available());
        self.session_state_mut().set_api_access(api_access);

        // 4. Web chat; a refreshed session keeps its chat login
        if establishment == Establishment::Established {
            if let Err(err) = platform
                .chat
                .log_in(self.deps.platform.chat_poll_interval())
                .await
            {
                tracing::warn!(account = self.account_name(), error = %err, "Chat log in failed");
            }
        }

        // 5. Bridge platform events
        self.bridge.attach(
            platform.community.event_source(),
            &community_events(self.chatting.clone()),
        );
        self.bridge
            .attach(platform.trade.event_source(), &trade_events());

        // 6. Replay operations issued before login
        let summary = self.queue.drain(&QueueName::LOGIN, self.clone()).await;

        tracing::info!(
            account = self.account_name(),
            generation = platform.generation,
            ?api_access,
            replayed = summary.replayed,
            refreshed = (establishment == Establishment::Refreshed),
            "Session established"
        );

        // 7. Announce
        if establishment == Establishment::Established {
            self.events.emit(
                names::LOGGED_IN,
                json!({ "account_name": self.account_name() }),
            );
        }

        Ok(establishment)
    }

    /// Ends the session and replaces every platform client.
    ///
    /// Operations still waiting for login are discarded; their handles
    /// resolve to `BotError::Cancelled`. Safe to call when never logged in.
    /// Returns true if a session was authenticated.
    pub async fn end_session(&self) -> bool {
        let _lifecycle = self.lifecycle.lock().await;
        let platform = self.platform();
        let was_authenticated = self.is_authenticated();

        if was_authenticated {
            platform.chat.log_out().await;
        }
        let detached = self.bridge.detach_all();
        let cancelled = self.queue.clear_all();
        self.session_state_mut().end();

        let generation = platform.generation + 1;
        let options = self.settings().trade_manager_options();
        self.replace_platform(self.deps.client_factory.build(generation, &options));

        tracing::info!(
            account = self.account_name(),
            was_authenticated,
            detached,
            cancelled,
            generation,
            "Session ended"
        );
        was_authenticated
    }

    /// Logs in with the bot's own credentials.
    ///
    /// Returns `Establishment::Unchanged` without contacting the
    /// authenticator if already logged in.
    ///
    /// # Errors
    ///
    /// `BotError::Auth` if the authenticator rejects the login. A two-factor
    /// challenge surfaces as `AuthError::TwoFactorRequired`; retry with
    /// `log_in_with_guard_code`.
    pub async fn log_in(self: &Arc<Self>) -> Result<Establishment, BotError> {
        self.authenticate(self.credentials.clone()).await
    }

    /// Logs in, answering a two-factor challenge with `code`.
    pub async fn log_in_with_guard_code(
        self: &Arc<Self>,
        code: impl Into<String>,
    ) -> Result<Establishment, BotError> {
        self.authenticate(self.credentials.clone().with_guard_code(code))
            .await
    }

    async fn authenticate(
        self: &Arc<Self>,
        credentials: LoginCredentials,
    ) -> Result<Establishment, BotError> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_authenticated() {
            return Ok(Establishment::Unchanged);
        }

        self.session_state_mut().begin_authenticating()?;
        tracing::info!(account = self.account_name(), "Logging in");

        match self.deps.authenticator.log_in(&credentials).await {
            Ok(session) => {
                self.set_rate_limited(false);
                self.establish(session).await
            }
            Err(err) => {
                if let Err(state_err) = self.session_state_mut().authentication_failed() {
                    tracing::error!(error = %state_err, "Session state out of step with login");
                }
                if err == AuthError::RateLimited {
                    self.set_rate_limited(true);
                }
                tracing::warn!(account = self.account_name(), error = %err, "Login failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockAuthenticator;
    use crate::adapters::platform::{MockClientFactory, MockCommunityActions, RecordedCall};
    use crate::application::BotDeps;
    use crate::config::{BotSettings, PlatformConfig};
    use crate::domain::foundation::{PlatformEvent, SessionStatus};
    use crate::domain::session::{ChallengeDelivery, TwoFactorMaterial};
    use crate::ports::PlatformError;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session(id: &str) -> (SessionCookies, SessionId) {
        (
            SessionCookies::new([format!("steamLoginSecure={}", id)]).unwrap(),
            SessionId::new(id).unwrap(),
        )
    }

    fn bot_with(factory: Arc<MockClientFactory>, authenticator: MockAuthenticator) -> Arc<Bot> {
        let credentials = LoginCredentials::new(
            "tradebot01",
            Some(SecretString::new("hunter2".to_string())),
            TwoFactorMaterial::default(),
        )
        .unwrap();
        Bot::new(
            credentials,
            BotSettings::default(),
            BotDeps {
                authenticator: Arc::new(authenticator),
                client_factory: factory,
                community_actions: Arc::new(MockCommunityActions::new()),
                platform: PlatformConfig::default(),
            },
        )
    }

    fn count(bot: &Bot, event: &str) -> Arc<AtomicUsize> {
        let counter = Arc::new(AtomicUsize::new(0));
        let sink = counter.clone();
        bot.on(
            event,
            Arc::new(move |_: &PlatformEvent| {
                sink.fetch_add(1, Ordering::SeqCst);
            }),
        );
        counter
    }

    #[tokio::test]
    async fn begin_session_propagates_and_announces() {
        let factory = Arc::new(MockClientFactory::new());
        let bot = bot_with(factory.clone(), MockAuthenticator::new());
        let logged_in = count(&bot, "loggedIn");
        let (cookies, id) = session("s1");

        let outcome = bot.begin_session(cookies, id).await.unwrap();

        assert_eq!(outcome, Establishment::Established);
        assert!(bot.is_authenticated());
        assert_eq!(bot.api_access(), ApiAccess::Available);
        assert_eq!(logged_in.load(Ordering::SeqCst), 1);

        let platform = factory.latest().unwrap();
        assert_eq!(platform.community.cookies_set(), 1);
        assert_eq!(platform.trade.api_access(), Some(true));
        assert!(platform
            .chat
            .calls()
            .contains(&RecordedCall::ChatLogIn(PlatformConfig::default().chat_poll_interval())));
        assert!(platform.community.listener_count() > 0);
        assert!(platform.trade.listener_count() > 0);
    }

    #[tokio::test]
    async fn identical_session_is_a_no_op() {
        let factory = Arc::new(MockClientFactory::new());
        let bot = bot_with(factory.clone(), MockAuthenticator::new());
        let logged_in = count(&bot, "loggedIn");

        let (cookies, id) = session("s1");
        bot.begin_session(cookies.clone(), id.clone()).await.unwrap();
        let listeners = factory.latest().unwrap().trade.listener_count();
        let outcome = bot.begin_session(cookies, id).await.unwrap();

        assert_eq!(outcome, Establishment::Unchanged);
        assert_eq!(logged_in.load(Ordering::SeqCst), 1);
        assert_eq!(factory.latest().unwrap().trade.listener_count(), listeners);
        assert_eq!(factory.latest().unwrap().community.cookies_set(), 1);
    }

    #[tokio::test]
    async fn refreshed_session_propagates_without_announcing() {
        let factory = Arc::new(MockClientFactory::new());
        let bot = bot_with(factory.clone(), MockAuthenticator::new());
        let logged_in = count(&bot, "loggedIn");

        let (cookies, id) = session("s1");
        bot.begin_session(cookies, id).await.unwrap();
        let (cookies, id) = session("s2");
        let outcome = bot.begin_session(cookies, id).await.unwrap();

        assert_eq!(outcome, Establishment::Refreshed);
        assert_eq!(logged_in.load(Ordering::SeqCst), 1);
        assert_eq!(factory.latest().unwrap().community.cookies_set(), 2);
        let chat_log_ins = factory
            .latest()
            .unwrap()
            .chat
            .calls()
            .into_iter()
            .filter(|call| matches!(call, RecordedCall::ChatLogIn(_)))
            .count();
        assert_eq!(chat_log_ins, 1);
    }

    #[tokio::test]
    async fn access_denied_probe_degrades_api_access() {
        let factory = Arc::new(MockClientFactory::new().with_probe_error(PlatformError::AccessDenied));
        let bot = bot_with(factory.clone(), MockAuthenticator::new());
        let (cookies, id) = session("s1");

        bot.begin_session(cookies, id).await.unwrap();

        assert!(bot.is_authenticated());
        assert_eq!(bot.api_access(), ApiAccess::Unavailable);
        assert_eq!(factory.latest().unwrap().trade.api_access(), Some(false));
    }

    #[tokio::test]
    async fn other_probe_failures_leave_access_unknown() {
        let factory = Arc::new(
            MockClientFactory::new().with_probe_error(PlatformError::Transport("reset".into())),
        );
        let bot = bot_with(factory.clone(), MockAuthenticator::new());
        let (cookies, id) = session("s1");

        bot.begin_session(cookies, id).await.unwrap();

        assert_eq!(bot.api_access(), ApiAccess::Unknown);
        assert_eq!(factory.latest().unwrap().trade.api_access(), Some(false));
    }

    #[tokio::test]
    async fn end_session_rebuilds_clients() {
        let factory = Arc::new(MockClientFactory::new());
        let bot = bot_with(factory.clone(), MockAuthenticator::new());
        let (cookies, id) = session("s1");
        bot.begin_session(cookies, id).await.unwrap();
        let old = factory.latest().unwrap();

        assert!(bot.end_session().await);

        assert_eq!(bot.session_status(), SessionStatus::Unauthenticated);
        assert_eq!(bot.api_access(), ApiAccess::Unknown);
        assert_eq!(bot.generation(), 1);
        assert_eq!(factory.built().len(), 2);
        assert_eq!(old.trade.listener_count(), 0);
        assert_eq!(old.community.listener_count(), 0);
        assert!(old.chat.calls().contains(&RecordedCall::ChatLogOut));
    }

    #[tokio::test]
    async fn end_session_when_never_authenticated() {
        let factory = Arc::new(MockClientFactory::new());
        let bot = bot_with(factory.clone(), MockAuthenticator::new());

        assert!(!bot.end_session().await);
        assert_eq!(bot.generation(), 1);
        assert!(factory.built()[0].chat.calls().is_empty());
    }

    #[tokio::test]
    async fn log_in_runs_authenticator_then_starts_session() {
        let (cookies, id) = session("s1");
        let authenticator = MockAuthenticator::new()
            .with_session("tradebot01", SessionCredentials::new(cookies, id));
        let bot = bot_with(Arc::new(MockClientFactory::new()), authenticator);
        let logged_in = count(&bot, "loggedIn");

        assert_eq!(bot.log_in().await, Ok(Establishment::Established));
        assert_eq!(logged_in.load(Ordering::SeqCst), 1);
        assert_eq!(bot.log_in().await, Ok(Establishment::Unchanged));
    }

    #[tokio::test]
    async fn failed_log_in_returns_to_unauthenticated() {
        let authenticator = MockAuthenticator::new().with_error(AuthError::RateLimited);
        let bot = bot_with(Arc::new(MockClientFactory::new()), authenticator);

        assert_eq!(bot.log_in().await, Err(BotError::Auth(AuthError::RateLimited)));
        assert_eq!(bot.session_status(), SessionStatus::Unauthenticated);
        assert!(bot.rate_limited());
    }

    #[tokio::test]
    async fn guard_code_answers_two_factor_challenge() {
        let (cookies, id) = session("s1");
        let authenticator = MockAuthenticator::new()
            .with_session("tradebot01", SessionCredentials::new(cookies, id))
            .with_guard_code("tradebot01", "F4K3C");
        let bot = bot_with(Arc::new(MockClientFactory::new()), authenticator);

        assert_eq!(
            bot.log_in().await,
            Err(BotError::Auth(AuthError::TwoFactorRequired {
                delivery: ChallengeDelivery::MobileAuthenticator
            }))
        );
        assert_eq!(
            bot.log_in_with_guard_code("F4K3C").await,
            Ok(Establishment::Established)
        );
    }
}
