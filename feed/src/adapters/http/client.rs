//! Blog backend HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use super::envelope::normalize_posts;
use crate::domain::entities::{
    Comment, CommentId, NewComment, Post, PostId, PostPage, ReactionType, Reactions,
};
use crate::domain::ports::{PostQuery, PostRepository};
use crate::error::RepositoryError;

/// [`PostRepository`] backed by the blog REST API
#[derive(Clone)]
pub struct HttpPostRepository {
    http: Client,
    base_url: String,
    posts_path: String,
}

/// Collection path used unless [`HttpPostRepository::with_posts_path`] says otherwise
pub const DEFAULT_POSTS_PATH: &str = "posts";

impl HttpPostRepository {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepositoryError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            posts_path: DEFAULT_POSTS_PATH.to_string(),
        })
    }

    /// Serve posts from `{base}/{path}` instead of `{base}/posts`
    pub fn with_posts_path(mut self, path: &str) -> Self {
        let path = path.trim_matches('/');
        if !path.is_empty() {
            self.posts_path = path.to_string();
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn posts_path(&self) -> &str {
        &self.posts_path
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn list_url(&self, query: &PostQuery) -> String {
        let mut url = format!(
            "{}?page={}&limit={}&sortBy={}",
            self.api_url(&format!("/{}", self.posts_path)),
            query.page,
            query.limit,
            query.sort.as_query()
        );
        if let Some(search) = &query.search {
            url.push_str(&format!("&search={}", encode(search)));
        }
        if let Some(category) = &query.category {
            url.push_str(&format!("&category={}", encode(category)));
        }
        url
    }

    fn post_url(&self, id: &PostId, count_view: bool) -> String {
        let mut url = self.api_url(&format!("/{}/{}", self.posts_path, encode(id.as_str())));
        if count_view {
            url.push_str("?incrementView=true");
        }
        url
    }

    fn comments_url(&self, id: &PostId) -> String {
        self.api_url(&format!(
            "/{}/{}/comments",
            self.posts_path,
            encode(id.as_str())
        ))
    }

    fn delete_comment_url(&self, id: &PostId, comment_id: &CommentId, delete_key: &str) -> String {
        format!(
            "{}/{}?deleteKey={}",
            self.comments_url(id),
            encode(comment_id.as_str()),
            encode(delete_key)
        )
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RepositoryError> {
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| RepositoryError::Deserialization(e.to_string()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RepositoryError> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Err(RepositoryError::RateLimited)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(RepositoryError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReactionRequest<'a> {
    user_id: &'a str,
    reaction_type: ReactionType,
}

#[derive(Deserialize)]
struct ReactionResponse {
    #[serde(default)]
    reactions: Reactions,
}

#[async_trait]
impl PostRepository for HttpPostRepository {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, RepositoryError> {
        let url = self.list_url(query);
        tracing::debug!("GET {}", url);

        let response = check_status(self.http.get(&url).send().await?).await?;
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(normalize_posts(value)),
            Err(e) => {
                tracing::warn!("Post list response is not JSON, treating as empty: {}", e);
                Ok(PostPage::default())
            }
        }
    }

    async fn get_post(&self, id: &PostId, count_view: bool) -> Result<Post, RepositoryError> {
        let response = self.http.get(self.post_url(id, count_view)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        self.handle_response(response).await
    }

    async fn toggle_reaction(
        &self,
        id: &PostId,
        kind: ReactionType,
        user_id: &str,
    ) -> Result<Reactions, RepositoryError> {
        let response = self
            .http
            .post(self.api_url(&format!("/reactions/{}", encode(id.as_str()))))
            .json(&ReactionRequest {
                user_id,
                reaction_type: kind,
            })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        let body: ReactionResponse = self.handle_response(response).await?;
        Ok(body.reactions)
    }

    async fn list_comments(&self, id: &PostId) -> Result<Vec<Comment>, RepositoryError> {
        let response = self.http.get(self.comments_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        self.handle_response(response).await
    }

    async fn add_comment(
        &self,
        id: &PostId,
        comment: &NewComment,
    ) -> Result<Comment, RepositoryError> {
        let response = self
            .http
            .post(self.comments_url(id))
            .json(comment)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        self.handle_response(response).await
    }

    async fn delete_comment(
        &self,
        id: &PostId,
        comment_id: &CommentId,
        delete_key: &str,
    ) -> Result<(), RepositoryError> {
        let url = self.delete_comment_url(id, comment_id, delete_key);
        let response = self.http.delete(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(comment_id.to_string()));
        }

        check_status(response).await?;
        Ok(())
    }
}
