//! Scripted in-memory forum API shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use fesnuk::api::{
    CommentRecord, CommentReplyRequest, CommentRequest, CreatePostRequest, ForumApi, NookRecord,
    PostRecord, ReactionRequest,
};
use fesnuk::domain::{CommentId, PostId};
use fesnuk::storage::MemoryReactionStore;
use fesnuk::{App, Config, FesnukError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Names of the fake's operations, as recorded in the call log.
pub mod op {
    pub const LIST_NOOKS: &str = "list_nooks";
    pub const GET_NOOK: &str = "get_nook";
    pub const LIST_POSTS: &str = "list_posts";
    pub const LIST_POSTS_BY_NOOK: &str = "list_posts_by_nook";
    pub const GET_POST: &str = "get_post";
    pub const CREATE_POST: &str = "create_post";
    pub const REACT: &str = "react";
    pub const POST_COMMENT: &str = "post_comment";
    pub const REPLY: &str = "reply_to_comment";
    pub const LIST_COMMENTS: &str = "list_comments";
    pub const LIST_REPLIES: &str = "list_replies";
    pub const UPLOAD: &str = "upload_file";
}

#[derive(Default)]
struct Script {
    nooks: Vec<NookRecord>,
    posts: Vec<PostRecord>,
    comments: HashMap<PostId, Vec<CommentRecord>>,
    replies: HashMap<CommentId, Vec<CommentRecord>>,
    failing: HashSet<&'static str>,
    hanging: HashSet<&'static str>,
    calls: Vec<&'static str>,
    reactions: Vec<ReactionRequest>,
    created: Vec<CreatePostRequest>,
    uploads: Vec<String>,
    next_post_id: PostId,
}

/// A [`ForumApi`] answering from canned data and recording every call.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_nooks(&self, nooks: Vec<NookRecord>) {
        self.script.lock().unwrap().nooks = nooks;
    }

    pub fn with_posts(&self, posts: Vec<PostRecord>) {
        self.script.lock().unwrap().posts = posts;
    }

    pub fn with_comments(&self, post_id: PostId, comments: Vec<CommentRecord>) {
        self.script.lock().unwrap().comments.insert(post_id, comments);
    }

    pub fn with_replies(&self, comment_id: CommentId, replies: Vec<CommentRecord>) {
        self.script.lock().unwrap().replies.insert(comment_id, replies);
    }

    /// Makes every later call to `operation` fail with a 500.
    pub fn fail(&self, operation: &'static str) {
        self.script.lock().unwrap().failing.insert(operation);
    }

    /// Makes every later call to `operation` wait forever after it is recorded.
    pub fn hang(&self, operation: &'static str) {
        self.script.lock().unwrap().hanging.insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        let mut script = self.script.lock().unwrap();
        script.failing.remove(operation);
        script.hanging.remove(operation);
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.script.lock().unwrap().calls.iter().filter(|c| **c == operation).count()
    }

    pub fn total_calls(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    pub fn reactions_sent(&self) -> Vec<ReactionRequest> {
        self.script.lock().unwrap().reactions.clone()
    }

    pub fn created_posts(&self) -> Vec<CreatePostRequest> {
        self.script.lock().unwrap().created.clone()
    }

    pub fn uploaded_urls(&self) -> Vec<String> {
        self.script.lock().unwrap().uploads.clone()
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(operation);
        if script.failing.contains(operation) {
            return Err(FesnukError::Status { code: 500 });
        }
        Ok(())
    }
}

#[async_trait]
impl ForumApi for ScriptedApi {
    async fn list_nooks(&self) -> Result<Vec<NookRecord>> {
        self.record(op::LIST_NOOKS)?;
        Ok(self.script.lock().unwrap().nooks.clone())
    }

    async fn get_nook(&self, nook_id: &str) -> Result<NookRecord> {
        self.record(op::GET_NOOK)?;
        let script = self.script.lock().unwrap();
        script.nooks.iter().find(|n| n.id == nook_id).cloned().ok_or(FesnukError::Status { code: 404 })
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>> {
        self.record(op::LIST_POSTS)?;
        Ok(self.script.lock().unwrap().posts.clone())
    }

    async fn list_posts_by_nook(&self, nook_id: &str) -> Result<Vec<PostRecord>> {
        self.record(op::LIST_POSTS_BY_NOOK)?;
        let script = self.script.lock().unwrap();
        Ok(script.posts.iter().filter(|p| p.nook_id == nook_id).cloned().collect())
    }

    async fn get_post(&self, post_id: PostId) -> Result<PostRecord> {
        self.record(op::GET_POST)?;
        let script = self.script.lock().unwrap();
        script.posts.iter().find(|p| p.id == post_id).cloned().ok_or(FesnukError::Status { code: 404 })
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<PostRecord> {
        self.record(op::CREATE_POST)?;
        let mut script = self.script.lock().unwrap();
        script.next_post_id += 1;
        let record = post(100 + script.next_post_id, &request.nook_id, &[]);
        script.created.push(request.clone());
        Ok(PostRecord {
            title: request.title.clone(),
            content: request.content.clone(),
            attachments: request.attachments.clone(),
            ..record
        })
    }

    async fn react(&self, request: &ReactionRequest) -> Result<()> {
        self.record(op::REACT)?;
        let hangs = self.script.lock().unwrap().hanging.contains(op::REACT);
        if hangs {
            std::future::pending::<()>().await;
        }
        self.script.lock().unwrap().reactions.push(request.clone());
        Ok(())
    }

    async fn post_comment(&self, _request: &CommentRequest) -> Result<()> {
        self.record(op::POST_COMMENT)
    }

    async fn reply_to_comment(&self, _request: &CommentReplyRequest) -> Result<()> {
        self.record(op::REPLY)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentRecord>> {
        self.record(op::LIST_COMMENTS)?;
        Ok(self.script.lock().unwrap().comments.get(&post_id).cloned().unwrap_or_default())
    }

    async fn list_replies(&self, comment_id: CommentId) -> Result<Vec<CommentRecord>> {
        self.record(op::LIST_REPLIES)?;
        Ok(self.script.lock().unwrap().replies.get(&comment_id).cloned().unwrap_or_default())
    }

    async fn upload_file(&self, url: &str, _bytes: Vec<u8>) -> Result<()> {
        self.record(op::UPLOAD)?;
        self.script.lock().unwrap().uploads.push(url.to_string());
        Ok(())
    }
}

pub fn nook(id: &str, name: &str) -> NookRecord {
    NookRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        created_at: "2024-05-01T10:00:00.000000".to_string(),
        updated_at: String::new(),
    }
}

pub fn post(id: PostId, nook_id: &str, reactions: &[(&str, u32)]) -> PostRecord {
    PostRecord {
        id,
        title: format!("Post {id}"),
        content: "body".to_string(),
        nook_id: nook_id.to_string(),
        nook_name: nook_id.to_uppercase(),
        attachments: Vec::new(),
        comment_count: 0,
        reactions: reactions.iter().map(|(s, n)| ((*s).to_string(), *n)).collect::<BTreeMap<_, _>>(),
        created_at: "2024-05-01T10:00:00.000000".to_string(),
        updated_at: String::new(),
    }
}

pub fn comment(id: CommentId, post_id: PostId, parent_id: Option<CommentId>, reply_count: u32) -> CommentRecord {
    CommentRecord {
        id,
        post_id,
        parent_id,
        content: format!("comment {id}"),
        attachments: Vec::new(),
        reactions: BTreeMap::new(),
        reply_count,
        created_at: "2024-05-01T10:00:00.000000".to_string(),
        updated_at: String::new(),
    }
}

pub fn test_config() -> Config {
    Config {
        upload_url_template: "https://blobs.test/attachments/{name}?sig=abc".to_string(),
        data_dir: std::env::temp_dir().join("fesnuk-tests"),
        ..Config::default()
    }
}

/// App over the scripted API and an in-memory store.
pub fn app(api: &Arc<ScriptedApi>, store: &Arc<MemoryReactionStore>) -> App {
    App::new(api.clone(), store.clone(), test_config())
}
