//! laurel-testkit
//!
//! Test doubles and fixture builders for the award-bot core: an in-memory
//! [`PlatformClient`] with scripted content and recorded actions, a canned
//! deterministic renderer, and compact builders for comments, submissions
//! and award rows.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use laurel_platform::{PlatformClient, PlatformError, ReplyRenderer};
use laurel_schemas::{Award, Comment, Disposition, Submission};

// ---------------------------------------------------------------------------
// FakePlatform
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PlatformState {
    comments: HashMap<String, Comment>,
    submissions: HashMap<String, Submission>,
    /// Ids whose fetch fails with a transient error.
    flaky_ids: HashSet<String>,
    moderators: HashSet<String>,
    replies: Vec<Comment>,
    edits: Vec<(String, String)>,
    deletions: Vec<String>,
    messages: Vec<(String, String, String)>,
    reply_seq: u64,
}

/// In-memory platform: scripted comments/submissions in, recorded
/// reply/edit/delete actions out. Replies it creates are visible to later
/// fetches, so multi-pass scenarios see their own effects.
pub struct FakePlatform {
    bot_username: String,
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self {
            bot_username: bot_username.into(),
            state: Mutex::new(PlatformState::default()),
        }
    }

    pub fn insert_comment(&self, comment: Comment) {
        self.state
            .lock()
            .unwrap()
            .comments
            .insert(comment.id.clone(), comment);
    }

    pub fn insert_submission(&self, submission: Submission) {
        self.state
            .lock()
            .unwrap()
            .submissions
            .insert(submission.id.clone(), submission);
    }

    /// Remove a comment, simulating external deletion.
    pub fn remove_comment(&self, id: &str) {
        self.state.lock().unwrap().comments.remove(id);
    }

    /// Rewrite a comment body, simulating an external author edit. Not
    /// recorded as a bot action.
    pub fn update_body(&self, id: &str, body: &str) {
        let mut state = self.state.lock().unwrap();
        let c = state
            .comments
            .get_mut(id)
            .unwrap_or_else(|| panic!("comment {id} not scripted"));
        c.body = body.to_string();
    }

    /// Make fetches of `id` fail with a transient error.
    pub fn mark_flaky(&self, id: &str) {
        self.state.lock().unwrap().flaky_ids.insert(id.to_string());
    }

    pub fn add_moderator(&self, username: &str) {
        self.state
            .lock()
            .unwrap()
            .moderators
            .insert(username.to_string());
    }

    pub fn replies(&self) -> Vec<Comment> {
        self.state.lock().unwrap().replies.clone()
    }

    pub fn edits(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().edits.clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.state.lock().unwrap().deletions.clone()
    }

    pub fn messages(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Scripted comment by id; panics when absent. Test convenience.
    pub fn get_comment(&self, id: &str) -> Comment {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("comment {id} not scripted"))
    }

    /// The live body of a comment, if it still exists.
    pub fn body_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(id)
            .map(|c| c.body.clone())
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn fetch_comment(&self, id: &str) -> Result<Option<Comment>, PlatformError> {
        let state = self.state.lock().unwrap();
        if state.flaky_ids.contains(id) {
            return Err(PlatformError::Transient {
                message: format!("scripted failure fetching {id}"),
            });
        }
        Ok(state.comments.get(id).cloned())
    }

    async fn fetch_submission(&self, id: &str) -> Result<Option<Submission>, PlatformError> {
        let state = self.state.lock().unwrap();
        if state.flaky_ids.contains(id) {
            return Err(PlatformError::Transient {
                message: format!("scripted failure fetching {id}"),
            });
        }
        Ok(state.submissions.get(id).cloned())
    }

    async fn reply(&self, comment: &Comment, body: &str) -> Result<Comment, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.reply_seq += 1;
        let id = format!("botreply-{}", state.reply_seq);
        let reply = Comment {
            id: id.clone(),
            body: body.to_string(),
            author: self.bot_username.clone(),
            parent_id: comment.id.clone(),
            submission_id: comment.submission_id.clone(),
            is_root: false,
            permalink: format!("{}/{}", comment.permalink, id),
            created_utc: 1_000_000.0 + state.reply_seq as f64,
        };
        state.comments.insert(id, reply.clone());
        state.replies.push(reply.clone());
        Ok(reply)
    }

    async fn edit(&self, comment_id: &str, body: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        match state.comments.get_mut(comment_id) {
            Some(c) => c.body = body.to_string(),
            None => {
                return Err(PlatformError::NotFound {
                    id: comment_id.to_string(),
                })
            }
        }
        state.edits.push((comment_id.to_string(), body.to_string()));
        Ok(())
    }

    async fn delete(&self, comment_id: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.comments.remove(comment_id).is_none() {
            return Err(PlatformError::NotFound {
                id: comment_id.to_string(),
            });
        }
        state.deletions.push(comment_id.to_string());
        Ok(())
    }

    async fn send_message(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), PlatformError> {
        self.state.lock().unwrap().messages.push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }

    async fn is_moderator(&self, username: &str) -> Result<bool, PlatformError> {
        Ok(self.state.lock().unwrap().moderators.contains(username))
    }
}

// ---------------------------------------------------------------------------
// CannedRenderer
// ---------------------------------------------------------------------------

/// Deterministic renderer: the produced text encodes the disposition so
/// scenario tests can assert which template a reply/edit carried.
pub struct CannedRenderer;

impl ReplyRenderer for CannedRenderer {
    fn render(&self, dispo: Disposition, comment: &Comment, parent: Option<&Comment>) -> String {
        match parent {
            Some(p) => format!("[{dispo:?}] re {} -> {}", comment.id, p.author),
            None => format!("[{dispo:?}] re {}", comment.id),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

/// Comment fixture. Defaults: author `user`, empty body, submission `sub`,
/// root-level, creation time 0.
pub fn comment(id: &str) -> CommentBuilder {
    CommentBuilder {
        inner: Comment {
            id: id.to_string(),
            body: String::new(),
            author: "user".to_string(),
            parent_id: "sub".to_string(),
            submission_id: "sub".to_string(),
            is_root: true,
            permalink: format!("/c/{id}"),
            created_utc: 0.0,
        },
    }
}

pub struct CommentBuilder {
    inner: Comment,
}

impl CommentBuilder {
    pub fn author(mut self, author: &str) -> Self {
        self.inner.author = author.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.inner.body = body.to_string();
        self
    }

    pub fn in_submission(mut self, submission_id: &str) -> Self {
        self.inner.submission_id = submission_id.to_string();
        if self.inner.is_root {
            self.inner.parent_id = submission_id.to_string();
        }
        self
    }

    /// Make this a reply to another comment (non-root).
    pub fn reply_to(mut self, parent_id: &str) -> Self {
        self.inner.parent_id = parent_id.to_string();
        self.inner.is_root = false;
        self
    }

    pub fn at(mut self, created_utc: f64) -> Self {
        self.inner.created_utc = created_utc;
        self
    }

    pub fn build(self) -> Comment {
        self.inner
    }
}

/// Submission fixture. Defaults: author `op`, creation time 0.
pub fn submission(id: &str) -> SubmissionBuilder {
    SubmissionBuilder {
        inner: Submission {
            id: id.to_string(),
            title: format!("submission {id}"),
            self_text: String::new(),
            author: "op".to_string(),
            permalink: format!("/s/{id}"),
            url: format!("https://example.test/s/{id}"),
            created_utc: 0.0,
        },
    }
}

pub struct SubmissionBuilder {
    inner: Submission,
}

impl SubmissionBuilder {
    pub fn author(mut self, author: &str) -> Self {
        self.inner.author = author.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.inner.title = title.to_string();
        self
    }

    pub fn at(mut self, created_utc: f64) -> Self {
        self.inner.created_utc = created_utc;
        self
    }

    pub fn build(self) -> Submission {
        self.inner
    }
}

/// Award row fixture for ledger tests; `awarding_time` is epoch seconds.
pub fn award_row(
    submission_id: &str,
    awarding_comment_id: &str,
    awarding_author: &str,
    awarded_author: &str,
    awarding_time: f64,
) -> Award {
    Award {
        submission_id: submission_id.to_string(),
        submission_title: format!("submission {submission_id}"),
        submission_self_text: String::new(),
        submission_author: "op".to_string(),
        submission_url: format!("/s/{submission_id}"),
        submission_time: 0.0,

        awarded_comment_id: format!("{awarding_comment_id}-parent"),
        awarded_comment_text: "an insightful comment".to_string(),
        awarded_comment_author: awarded_author.to_string(),
        awarded_comment_url: format!("/c/{awarding_comment_id}-parent"),
        awarded_comment_time: awarding_time - 60.0,

        awarding_comment_id: awarding_comment_id.to_string(),
        awarding_comment_text: "!award".to_string(),
        awarding_comment_author: awarding_author.to_string(),
        awarding_comment_url: format!("/c/{awarding_comment_id}"),
        awarding_comment_time: awarding_time,
    }
}
