//! Gated platform operations.
//!
//! Every operation here returns a `Pending` immediately. With a live
//! session the operation is spawned on the runtime; without one it is
//! queued on the `login` queue, arguments and all, and replayed in issue
//! order once the session starts.
//!
//! Callers must be inside a Tokio runtime.

use secrecy::SecretString;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

use super::pending::{channel, Pending};
use super::{Bot, BotError};
use crate::domain::deferred::{DeferredOperation, QueueName};
use crate::domain::foundation::{
    names, AccountId, AppId, CommentId, ContextId, GroupId, SharedFileId, ValidationError,
};
use crate::domain::session::SessionCredentials;
use crate::ports::{
    CommunityActions, GroupInfo, Inventory, PhoneStatus, PlatformError, ProfileEdit,
    ProfileTarget, Vote,
};

impl Bot {
    /// Runs `call` now if authenticated, otherwise after the next login.
    ///
    /// While login is still replaying earlier operations, `call` joins the
    /// back of that replay instead of overtaking it.
    fn gated<T, F, Fut>(self: &Arc<Self>, operation: &'static str, call: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Bot>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BotError>> + Send + 'static,
    {
        let (completion, pending) = channel(operation);
        let deferred = DeferredOperation::new(operation, move |bot: Arc<Bot>| async move {
            completion.complete(call(bot).await)
        });

        // Checked and enqueued under one read lock, so the session cannot
        // start between the check and the enqueue.
        let session = self.session_state();
        if !session.is_authenticated() {
            let depth = self.queue.enqueue(QueueName::LOGIN, deferred);
            drop(session);
            tracing::debug!(operation, depth, "Deferred until login");
            return pending;
        }

        match self.queue.enqueue_if_pending(&QueueName::LOGIN, deferred) {
            Ok(depth) => {
                drop(session);
                tracing::debug!(operation, depth, "Queued behind login replay");
            }
            Err(deferred) => {
                drop(session);
                tokio::spawn(deferred.run(self.clone()));
            }
        }
        pending
    }

    /// A community form action, run with the live session's credentials.
    fn community_action<F, Fut>(self: &Arc<Self>, operation: &'static str, call: F) -> Pending<()>
    where
        F: FnOnce(Arc<dyn CommunityActions>, SessionCredentials) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), PlatformError>> + Send + 'static,
    {
        self.gated(operation, move |bot| async move {
            let session = bot.session_credentials()?;
            call(bot.deps.community_actions.clone(), session).await?;
            Ok(())
        })
    }

    // ─── Profile ──────────────────────────────────────────────────────────

    /// Sets the profile name to `prefix` followed by `name`.
    ///
    /// The prefix only reaches the platform; `display_name()` keeps the bare
    /// `name`. Emits `updatedAccountDetails` once the platform accepts the
    /// change.
    pub fn change_name(
        self: &Arc<Self>,
        name: impl Into<String>,
        prefix: Option<String>,
    ) -> Pending<()> {
        let name = name.into();
        let profile_name = format!("{}{}", prefix.unwrap_or_default(), name);
        self.gated("change_name", move |bot| async move {
            let community = bot.platform().community.clone();
            community.edit_profile(ProfileEdit::name(profile_name)).await?;
            bot.set_display_name(name.clone());
            bot.events.emit(
                names::UPDATED_ACCOUNT_DETAILS,
                json!({ "display_name": name }),
            );
            Ok(())
        })
    }

    pub fn setup_profile(self: &Arc<Self>) -> Pending<()> {
        self.gated("setup_profile", |bot| async move {
            let community = bot.platform().community.clone();
            Ok(community.setup_profile().await?)
        })
    }

    /// Registers (or fetches) the account's web API key.
    ///
    /// `domain` defaults to the configured web API key domain. The key is
    /// kept in the bot's settings.
    pub fn get_web_api_key(self: &Arc<Self>, domain: Option<String>) -> Pending<SecretString> {
        self.gated("get_web_api_key", move |bot| async move {
            let domain = domain.unwrap_or_else(|| bot.deps.platform.web_api_key_domain.clone());
            let community = bot.platform().community.clone();
            let key = community.get_web_api_key(&domain).await?;
            bot.store_api_key(key.clone());
            Ok(key)
        })
    }

    // ─── Trade ────────────────────────────────────────────────────────────

    pub fn get_inventory(
        self: &Arc<Self>,
        app: AppId,
        context: ContextId,
        tradable_only: bool,
    ) -> Pending<Inventory> {
        self.gated("get_inventory", move |bot| async move {
            let trade = bot.platform().trade.clone();
            Ok(trade.load_inventory(app, context, tradable_only).await?)
        })
    }

    pub fn get_user_inventory(
        self: &Arc<Self>,
        owner: AccountId,
        app: AppId,
        context: ContextId,
        tradable_only: bool,
    ) -> Pending<Inventory> {
        self.gated("get_user_inventory", move |bot| async move {
            let trade = bot.platform().trade.clone();
            Ok(trade
                .load_user_inventory(owner, app, context, tradable_only)
                .await?)
        })
    }

    // ─── Store ────────────────────────────────────────────────────────────

    pub fn add_phone_number(self: &Arc<Self>, number: impl Into<String>) -> Pending<()> {
        let number = number.into();
        self.gated("add_phone_number", move |bot| async move {
            let store = bot.platform().store.clone();
            Ok(store.add_phone_number(&number).await?)
        })
    }

    pub fn verify_phone_number(self: &Arc<Self>, code: impl Into<String>) -> Pending<()> {
        let code = code.into();
        self.gated("verify_phone_number", move |bot| async move {
            let store = bot.platform().store.clone();
            Ok(store.verify_phone_number(&code).await?)
        })
    }

    pub fn has_phone(self: &Arc<Self>) -> Pending<PhoneStatus> {
        self.gated("has_phone", |bot| async move {
            let store = bot.platform().store.clone();
            Ok(store.has_phone().await?)
        })
    }

    // ─── Groups ───────────────────────────────────────────────────────────

    pub fn get_group(self: &Arc<Self>, group: GroupId) -> Pending<GroupInfo> {
        self.gated("get_group", move |bot| async move {
            let community = bot.platform().community.clone();
            Ok(community.get_group(&group).await?)
        })
    }

    pub fn join_group(self: &Arc<Self>, group: GroupId) -> Pending<()> {
        self.gated("join_group", move |bot| async move {
            let community = bot.platform().community.clone();
            Ok(community.join_group(&group).await?)
        })
    }

    pub fn leave_group(self: &Arc<Self>, group: GroupId) -> Pending<()> {
        self.gated("leave_group", move |bot| async move {
            let community = bot.platform().community.clone();
            Ok(community.leave_group(&group).await?)
        })
    }

    pub fn kick_from_group(self: &Arc<Self>, group: GroupId, member: AccountId) -> Pending<()> {
        self.gated("kick_from_group", move |bot| async move {
            let community = bot.platform().community.clone();
            Ok(community.kick_from_group(&group, member).await?)
        })
    }

    /// Invites one or more accounts to `group`.
    ///
    /// An empty invitee list is rejected without waiting for login.
    pub fn invite_to_group(self: &Arc<Self>, group: GroupId, invitees: Vec<AccountId>) -> Pending<()> {
        if invitees.is_empty() {
            let (completion, pending) = channel("invite_to_group");
            completion.complete(Err(ValidationError::empty_field("invitees").into()));
            return pending;
        }
        let inviter = self.account_name().to_string();
        self.community_action("invite_to_group", move |actions, session| async move {
            actions
                .invite_to_group(&session, &inviter, &group, &invitees)
                .await
        })
    }

    // ─── Shared files ─────────────────────────────────────────────────────

    pub fn upvote_shared_file(self: &Arc<Self>, file: SharedFileId) -> Pending<()> {
        self.community_action("upvote_shared_file", move |actions, session| async move {
            actions.vote_shared_file(&session, file, Vote::Up).await
        })
    }

    pub fn downvote_shared_file(self: &Arc<Self>, file: SharedFileId) -> Pending<()> {
        self.community_action("downvote_shared_file", move |actions, session| async move {
            actions.vote_shared_file(&session, file, Vote::Down).await
        })
    }

    pub fn favourite_shared_file(self: &Arc<Self>, file: SharedFileId, app: AppId) -> Pending<()> {
        self.community_action("favourite_shared_file", move |actions, session| async move {
            actions.set_favourite(&session, file, app, true).await
        })
    }

    pub fn unfavourite_shared_file(self: &Arc<Self>, file: SharedFileId, app: AppId) -> Pending<()> {
        self.community_action("unfavourite_shared_file", move |actions, session| async move {
            actions.set_favourite(&session, file, app, false).await
        })
    }

    pub fn subscribe_shared_file(self: &Arc<Self>, file: SharedFileId, app: AppId) -> Pending<()> {
        self.community_action("subscribe_shared_file", move |actions, session| async move {
            actions.set_subscribed(&session, file, app, true).await
        })
    }

    pub fn unsubscribe_shared_file(self: &Arc<Self>, file: SharedFileId, app: AppId) -> Pending<()> {
        self.community_action("unsubscribe_shared_file", move |actions, session| async move {
            actions.set_subscribed(&session, file, app, false).await
        })
    }

    /// Opens a shared file's page, which counts as a view.
    pub fn preview_shared_file(self: &Arc<Self>, file: SharedFileId) -> Pending<()> {
        self.community_action("preview_shared_file", move |actions, session| async move {
            actions.preview_shared_file(&session, file).await
        })
    }

    pub fn comment_shared_file(
        self: &Arc<Self>,
        owner: AccountId,
        file: SharedFileId,
        comment: impl Into<String>,
    ) -> Pending<()> {
        let comment = comment.into();
        self.community_action("comment_shared_file", move |actions, session| async move {
            actions
                .comment_shared_file(&session, owner, file, &comment)
                .await
        })
    }

    pub fn delete_shared_file_comment(
        self: &Arc<Self>,
        owner: AccountId,
        file: SharedFileId,
        comment: CommentId,
    ) -> Pending<()> {
        self.community_action(
            "delete_shared_file_comment",
            move |actions, session| async move {
                actions
                    .delete_shared_file_comment(&session, owner, file, &comment)
                    .await
            },
        )
    }

    // ─── Publishers ───────────────────────────────────────────────────────

    pub fn follow_publisher(self: &Arc<Self>, target: ProfileTarget) -> Pending<()> {
        self.community_action("follow_publisher", move |actions, session| async move {
            actions.set_following(&session, &target, true).await
        })
    }

    pub fn unfollow_publisher(self: &Arc<Self>, target: ProfileTarget) -> Pending<()> {
        self.community_action("unfollow_publisher", move |actions, session| async move {
            actions.set_following(&session, &target, false).await
        })
    }
}
