//! Integration tests for operations issued before login.
//!
//! Operations requested while unauthenticated are captured with their
//! arguments and replayed after the session starts:
//! 1. In issue order
//! 2. Exactly once
//! 3. Each reporting only through its own handle

use proptest::prelude::*;
use std::sync::Arc;

use tradebot::adapters::auth::MockAuthenticator;
use tradebot::adapters::platform::{MockClientFactory, MockCommunityActions, RecordedCall};
use tradebot::application::{Bot, BotDeps, BotError, Pending};
use tradebot::config::{BotSettings, PlatformConfig};
use tradebot::domain::foundation::{AccountId, AppId, SessionId, SharedFileId};
use tradebot::domain::session::{LoginCredentials, SessionCookies, TwoFactorMaterial};
use tradebot::ports::{PlatformError, ProfileEdit, ProfileTarget, Vote};

use secrecy::SecretString;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn bot() -> (Arc<Bot>, Arc<MockClientFactory>, Arc<MockCommunityActions>) {
    let factory = Arc::new(MockClientFactory::new());
    let actions = Arc::new(MockCommunityActions::new());
    let credentials = LoginCredentials::new(
        "tradebot01",
        Some(SecretString::new("correct horse".to_string())),
        TwoFactorMaterial::default(),
    )
    .unwrap();
    let bot = Bot::new(
        credentials,
        BotSettings::default(),
        BotDeps {
            authenticator: Arc::new(MockAuthenticator::new()),
            client_factory: factory.clone(),
            community_actions: actions.clone(),
            platform: PlatformConfig::default(),
        },
    );
    (bot, factory, actions)
}

async fn begin(bot: &Arc<Bot>) {
    bot.begin_session(
        SessionCookies::new(["steamLoginSecure=abc"]).unwrap(),
        SessionId::new("sess-1").unwrap(),
    )
    .await
    .unwrap();
}

/// A community action the property test can issue.
#[derive(Debug, Clone)]
enum Action {
    Vote(u64, bool),
    Favourite(u64, u32, bool),
    Follow(u32, bool),
}

impl Action {
    fn issue(&self, bot: &Arc<Bot>) -> Pending<()> {
        match *self {
            Action::Vote(file, true) => bot.upvote_shared_file(SharedFileId(file)),
            Action::Vote(file, false) => bot.downvote_shared_file(SharedFileId(file)),
            Action::Favourite(file, app, true) => {
                bot.favourite_shared_file(SharedFileId(file), AppId(app))
            }
            Action::Favourite(file, app, false) => {
                bot.unfavourite_shared_file(SharedFileId(file), AppId(app))
            }
            Action::Follow(account, true) => {
                bot.follow_publisher(AccountId::from_account_number(account).into())
            }
            Action::Follow(account, false) => {
                bot.unfollow_publisher(AccountId::from_account_number(account).into())
            }
        }
    }

    fn expected(&self) -> RecordedCall {
        match *self {
            Action::Vote(file, up) => RecordedCall::VoteSharedFile(
                SharedFileId(file),
                if up { Vote::Up } else { Vote::Down },
            ),
            Action::Favourite(file, app, on) => {
                RecordedCall::SetFavourite(SharedFileId(file), AppId(app), on)
            }
            Action::Follow(account, on) => RecordedCall::SetFollowing(
                ProfileTarget::Account(AccountId::from_account_number(account)),
                on,
            ),
        }
    }
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (any::<u64>(), any::<bool>()).prop_map(|(f, up)| Action::Vote(f, up)),
        (any::<u64>(), any::<u32>(), any::<bool>()).prop_map(|(f, a, on)| Action::Favourite(f, a, on)),
        (any::<u32>(), any::<bool>()).prop_map(|(acc, on)| Action::Follow(acc, on)),
    ]
}

// =============================================================================
// Replay order
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn replayed_in_issue_order_with_original_arguments(
        actions in prop::collection::vec(action_strategy(), 0..24)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (calls, results) = runtime.block_on(async {
            let (bot, _factory, recorder) = bot();
            let pending: Vec<_> = actions.iter().map(|a| a.issue(&bot)).collect();
            assert_eq!(bot.pending_operations(), actions.len());
            assert!(recorder.calls().is_empty());

            begin(&bot).await;

            let mut results = Vec::new();
            for p in pending {
                results.push(p.await);
            }
            (recorder.calls(), results)
        });

        let expected: Vec<_> = actions.iter().map(Action::expected).collect();
        prop_assert_eq!(calls, expected);
        prop_assert!(results.iter().all(Result::is_ok));
    }
}

#[tokio::test]
async fn call_made_during_replay_runs_after_queued_calls() {
    let (bot, _, actions) = bot();
    let gate = actions.hold_next("vote_shared_file");

    let first = bot.upvote_shared_file(SharedFileId(1));
    let second = bot.upvote_shared_file(SharedFileId(2));
    let login = tokio::spawn({
        let bot = bot.clone();
        async move { begin(&bot).await }
    });
    while actions.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    assert!(bot.is_authenticated());
    let third = bot.upvote_shared_file(SharedFileId(3));
    assert_eq!(bot.pending_operations(), 2);

    gate.notify_one();
    login.await.unwrap();

    for pending in [first, second, third] {
        assert_eq!(pending.await, Ok(()));
    }
    assert_eq!(
        actions.calls(),
        [1, 2, 3]
            .map(|file| RecordedCall::VoteSharedFile(SharedFileId(file), Vote::Up))
            .to_vec()
    );
}

#[tokio::test]
async fn name_changes_apply_in_issue_order() {
    let (bot, factory, _) = bot();

    let alice = bot.change_name("Alice", None);
    let bob = bot.change_name("Bob", Some("[TAG]".to_string()));
    begin(&bot).await;

    assert_eq!(alice.await, Ok(()));
    assert_eq!(bob.await, Ok(()));
    assert_eq!(
        factory.latest().unwrap().community.profile_edits(),
        vec![ProfileEdit::name("Alice"), ProfileEdit::name("[TAG]Bob")]
    );
    assert_eq!(bot.display_name().as_deref(), Some("Bob"));
}

#[tokio::test]
async fn each_operation_replayed_exactly_once() {
    let (bot, _, actions) = bot();

    let pending = bot.preview_shared_file(SharedFileId(99));
    begin(&bot).await;
    pending.await.unwrap();

    bot.end_session().await;
    begin(&bot).await;

    assert_eq!(
        actions.calls(),
        vec![RecordedCall::PreviewSharedFile(SharedFileId(99))]
    );
}

#[tokio::test]
async fn failing_replay_does_not_stop_the_rest() {
    let (bot, _, actions) = bot();
    actions.fail_next("vote_shared_file", PlatformError::AccessDenied);

    let first = bot.upvote_shared_file(SharedFileId(1));
    let second = bot.subscribe_shared_file(SharedFileId(2), AppId(440));
    begin(&bot).await;

    assert_eq!(first.await, Err(BotError::Platform(PlatformError::AccessDenied)));
    assert_eq!(second.await, Ok(()));
    assert_eq!(actions.calls().len(), 2);
}

#[tokio::test]
async fn empty_queue_replays_nothing() {
    let (bot, factory, actions) = bot();

    begin(&bot).await;

    assert_eq!(bot.pending_operations(), 0);
    assert!(actions.calls().is_empty());
    assert!(factory.latest().unwrap().community.profile_edits().is_empty());
}

#[tokio::test]
async fn dropped_handle_still_runs_operation() {
    let (bot, _, actions) = bot();

    drop(bot.comment_shared_file(
        AccountId::from_account_number(22202),
        SharedFileId(5),
        "nice",
    ));
    begin(&bot).await;

    assert_eq!(
        actions.calls(),
        vec![RecordedCall::CommentSharedFile(
            AccountId::from_account_number(22202),
            SharedFileId(5),
            "nice".to_string()
        )]
    );
}
