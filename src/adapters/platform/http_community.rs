//! Community form actions over HTTP.
//!
//! Each action is a form-encoded POST carrying the session id, sent with
//! the session cookies. The community site answers with a small JSON body
//! `{"success": <result code>}`; group invites may add `"duplicate": true`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::config::PlatformConfig;
use crate::domain::foundation::{AccountId, AppId, CommentId, GroupId, ResultCode, SharedFileId};
use crate::domain::session::SessionCredentials;
use crate::ports::{CommunityActions, PlatformError, ProfileTarget, Vote};

/// Configuration for the community actions adapter.
#[derive(Debug, Clone)]
pub struct HttpCommunityConfig {
    /// Base URL of the community site, without trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpCommunityConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&PlatformConfig> for HttpCommunityConfig {
    fn from(config: &PlatformConfig) -> Self {
        Self::new(config.community_base_url.as_str()).with_timeout(config.request_timeout())
    }
}

impl Default for HttpCommunityConfig {
    fn default() -> Self {
        Self::new("https://steamcommunity.com")
    }
}

/// `CommunityActions` backed by the community website.
pub struct HttpCommunityActions {
    config: HttpCommunityConfig,
    client: Client,
}

impl HttpCommunityActions {
    pub fn new(config: HttpCommunityConfig) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlatformError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn post_form(
        &self,
        session: &SessionCredentials,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<(u16, Option<JsonValue>), PlatformError> {
        let response = self
            .client
            .post(self.url(path))
            .header(reqwest::header::COOKIE, session.cookies().header_value())
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        read_body(response).await
    }

    /// Posts a form whose only outcome is the result code.
    async fn simple_action(
        &self,
        session: &SessionCredentials,
        path: &str,
        extra: Vec<(&'static str, String)>,
    ) -> Result<(), PlatformError> {
        let mut form = vec![("sessionid", session.session_id().as_str().to_string())];
        form.extend(extra);

        let (status, body) = self.post_form(session, path, &form).await?;
        let outcome = interpret(status, body.as_ref());
        if let Err(ref err) = outcome {
            tracing::debug!(path, status, error = %err, "Community action rejected");
        }
        outcome
    }
}

fn transport_error(e: reqwest::Error) -> PlatformError {
    if e.is_timeout() {
        PlatformError::Transport("Request timed out".to_string())
    } else if e.is_connect() {
        PlatformError::Transport(format!("Connection failed: {}", e))
    } else {
        PlatformError::Transport(e.to_string())
    }
}

/// Status plus the body parsed as JSON, if it is JSON.
async fn read_body(response: Response) -> Result<(u16, Option<JsonValue>), PlatformError> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(transport_error)?;
    Ok((status, serde_json::from_str(&text).ok()))
}

fn result_code(body: Option<&JsonValue>) -> Option<ResultCode> {
    body?
        .get("success")?
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .map(ResultCode::from_code)
}

/// Maps a community action response to its outcome.
///
/// Success requires both a 200 status and result code 1.
pub fn interpret(status: u16, body: Option<&JsonValue>) -> Result<(), PlatformError> {
    match result_code(body) {
        Some(ResultCode::Ok) if status == 200 => Ok(()),
        Some(ResultCode::Ok) => Err(PlatformError::Http { status }),
        Some(code) => Err(PlatformError::Rejected(code)),
        None if status == 200 => Err(PlatformError::UnexpectedResponse(
            "response carried no result code".to_string(),
        )),
        None => Err(PlatformError::Http { status }),
    }
}

/// Maps a group invite response, which has two extra failure modes.
pub fn interpret_invite(
    status: u16,
    body: Option<&JsonValue>,
    inviter: &str,
) -> Result<(), PlatformError> {
    let duplicate = body
        .and_then(|b| b.get("duplicate"))
        .is_some_and(|d| d.as_bool().unwrap_or(!d.is_null()));

    match (status, result_code(body)) {
        (200, Some(ResultCode::Ok)) => Ok(()),
        (200, _) if duplicate => Err(PlatformError::DuplicateInvite),
        (403, _) => Err(PlatformError::NotGroupMember {
            account: inviter.to_string(),
        }),
        _ => interpret(status, body),
    }
}

#[async_trait]
impl CommunityActions for HttpCommunityActions {
    async fn vote_shared_file(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        vote: Vote,
    ) -> Result<(), PlatformError> {
        let path = match vote {
            Vote::Up => "sharedfiles/voteup",
            Vote::Down => "sharedfiles/votedown",
        };
        self.simple_action(session, path, vec![("id", file.to_string())])
            .await
    }

    async fn set_favourite(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
        app: AppId,
        favourite: bool,
    ) -> Result<(), PlatformError> {
        let path = if favourite {
            "sharedfiles/favorite"
        } else {
            "sharedfiles/unfavorite"
        };
        self.simple_action(
            session,
            path,
            vec![("id", file.to_string()), ("appid", app.0.to_string())],
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
        let path = if subscribed {
            "sharedfiles/subscribe"
        } else {
            "sharedfiles/unsubscribe"
        };
        self.simple_action(
            session,
            path,
            vec![("id", file.to_string()), ("appid", app.0.to_string())],
        )
        .await
    }

    async fn preview_shared_file(
        &self,
        session: &SessionCredentials,
        file: SharedFileId,
    ) -> Result<(), PlatformError> {
        let response = self
            .client
            .get(self.url("sharedfiles/filedetails/"))
            .query(&[("id", file.0)])
            .header(reqwest::header::COOKIE, session.cookies().header_value())
            .send()
            .await
            .map_err(transport_error)?;

        match response.status().as_u16() {
            200 => Ok(()),
            status => Err(PlatformError::Http { status }),
        }
    }

    async fn comment_shared_file(
        &self,
        session: &SessionCredentials,
        owner: AccountId,
        file: SharedFileId,
        comment: &str,
    ) -> Result<(), PlatformError> {
        let path = format!("comment/PublishedFile_Public/post/{}/{}/", owner, file);
        self.simple_action(session, &path, vec![("comment", comment.to_string())])
            .await
    }

    async fn delete_shared_file_comment(
        &self,
        session: &SessionCredentials,
        owner: AccountId,
        file: SharedFileId,
        comment: &CommentId,
    ) -> Result<(), PlatformError> {
        let path = format!("comment/PublishedFile_Public/delete/{}/{}/", owner, file);
        self.simple_action(session, &path, vec![("gidcomment", comment.to_string())])
            .await
    }

    async fn set_following(
        &self,
        session: &SessionCredentials,
        target: &ProfileTarget,
        follow: bool,
    ) -> Result<(), PlatformError> {
        let action = if follow { "followuser" } else { "unfollowuser" };
        let path = format!("{}/{}/", target.path(), action);
        self.simple_action(session, &path, Vec::new()).await
    }

    async fn invite_to_group(
        &self,
        session: &SessionCredentials,
        inviter: &str,
        group: &GroupId,
        invitees: &[AccountId],
    ) -> Result<(), PlatformError> {
        let mut form = vec![
            ("json", "1".to_string()),
            ("type", "groupInvite".to_string()),
            ("group", group.to_string()),
            ("sessionID", session.session_id().as_str().to_string()),
        ];
        match invitees {
            [single] => form.push(("invitee", single.to_string())),
            many => {
                let ids: Vec<String> = many.iter().map(AccountId::to_string).collect();
                let list = serde_json::to_string(&ids)
                    .map_err(|e| PlatformError::UnexpectedResponse(e.to_string()))?;
                form.push(("invitee_list", list));
            }
        }

        let (status, body) = self
            .post_form(session, "actions/GroupInvite", &form)
            .await?;
        let outcome = interpret_invite(status, body.as_ref(), inviter);
        if let Err(ref err) = outcome {
            tracing::warn!(group = %group, invitees = invitees.len(), error = %err, "Group invite failed");
        }
        outcome
    }
}
