//! Community feed: channel filter, search and ordering over posts, plus the
//! post and like writes.

use crate::backend::records::{COMMUNITY_LIKES, COMMUNITY_POSTS};
use crate::backend::{
    BackendClient, BackendError, CommunityLike, CommunityPost, Direction, NewCommunityPost, Query,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Tourism,
    Way2Travel,
    YourSpace,
    DreamWeavers,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Tourism,
        Channel::Way2Travel,
        Channel::YourSpace,
        Channel::DreamWeavers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Tourism => "Tourism",
            Channel::Way2Travel => "Way2Travel",
            Channel::YourSpace => "YourSpace",
            Channel::DreamWeavers => "DreamWeavers",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown channel '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    #[default]
    Recent,
    Popular,
}

impl FromStr for FeedSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(FeedSort::Recent),
            "popular" => Ok(FeedSort::Popular),
            other => Err(format!("unknown sort '{}'", other)),
        }
    }
}

/// Raw query string of the feed endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedParams {
    pub channel: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedQuery {
    /// `None` shows every channel.
    pub channel: Option<Channel>,
    pub search: Option<String>,
    pub sort: FeedSort,
}

impl FeedQuery {
    pub fn parse(params: &FeedParams) -> Result<Self, String> {
        let channel = match params.channel.as_deref().map(str::trim) {
            None | Some("") | Some("All") => None,
            Some(name) => Some(name.parse()?),
        };
        let search = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => FeedSort::default(),
            Some(sort) => sort.parse()?,
        };
        Ok(Self {
            channel,
            search,
            sort,
        })
    }

    pub fn matches(&self, post: &CommunityPost) -> bool {
        if let Some(channel) = self.channel {
            if post.channel != channel.as_str() {
                return false;
            }
        }
        match &self.search {
            Some(needle) => {
                post.title.to_lowercase().contains(needle)
                    || post.content.to_lowercase().contains(needle)
            }
            None => true,
        }
    }

    /// Filters then orders. Both sorts are stable.
    pub fn apply(&self, posts: Vec<CommunityPost>) -> Vec<CommunityPost> {
        let mut posts: Vec<CommunityPost> = posts.into_iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            FeedSort::Popular => posts.sort_by(|a, b| b.likes.cmp(&a.likes)),
            FeedSort::Recent => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        posts
    }
}

pub async fn list_posts(
    client: &BackendClient,
    query: &FeedQuery,
) -> Result<Vec<CommunityPost>, BackendError> {
    let mut request = Query::new()
        .select("*")
        .order("created_at", Direction::Descending);
    if let Some(channel) = query.channel {
        request = request.eq("channel", channel);
    }
    let posts = client.select(COMMUNITY_POSTS, &request).await?;
    Ok(query.apply(posts))
}

/// A post needs a known channel and non-blank title and content.
pub fn validate_new_post(post: &NewCommunityPost) -> Result<(), String> {
    post.channel.parse::<Channel>()?;
    if post.title.trim().is_empty() {
        return Err("title is required".into());
    }
    if post.content.trim().is_empty() {
        return Err("content is required".into());
    }
    Ok(())
}

pub async fn create_post(
    client: &BackendClient,
    post: &NewCommunityPost,
) -> Result<CommunityPost, BackendError> {
    client.insert(COMMUNITY_POSTS, post).await
}

/// Records the caller's like once. A repeat like leaves the post as is.
pub async fn like_post(
    client: &BackendClient,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<CommunityPost, BackendError> {
    let post: CommunityPost = client
        .select_one(COMMUNITY_POSTS, &Query::new().eq("id", post_id))
        .await?;
    let existing: Vec<Value> = client
        .select(COMMUNITY_LIKES, &like_query(post_id, user_id).select("id").limit(1))
        .await?;
    if !existing.is_empty() {
        tracing::debug!("User {} already likes post {}", user_id, post_id);
        return Ok(post);
    }

    let like = CommunityLike {
        id: None,
        post_id,
        user_id,
        created_at: None,
    };
    let _: CommunityLike = client.insert(COMMUNITY_LIKES, &like).await?;
    sync_likes(client, post_id).await
}

/// Removes the caller's like. The counter only moves when a like row was
/// actually deleted.
pub async fn unlike_post(
    client: &BackendClient,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<CommunityPost, BackendError> {
    let post: CommunityPost = client
        .select_one(COMMUNITY_POSTS, &Query::new().eq("id", post_id))
        .await?;
    let removed = client
        .delete(COMMUNITY_LIKES, &like_query(post_id, user_id))
        .await?;
    if removed == 0 {
        return Ok(post);
    }
    sync_likes(client, post_id).await
}

fn like_query(post_id: Uuid, user_id: Uuid) -> Query {
    Query::new().eq("post_id", post_id).eq("user_id", user_id)
}

/// Sets the post's counter to the number of like rows it has.
async fn sync_likes(client: &BackendClient, post_id: Uuid) -> Result<CommunityPost, BackendError> {
    let rows: Vec<Value> = client
        .select(
            COMMUNITY_LIKES,
            &Query::new().select("id").eq("post_id", post_id),
        )
        .await?;
    let posts: Vec<CommunityPost> = client
        .update(
            COMMUNITY_POSTS,
            &Query::new().eq("id", post_id),
            &json!({ "likes": rows.len() }),
        )
        .await?;
    posts.into_iter().next().ok_or_else(|| BackendError::NotFound {
        table: COMMUNITY_POSTS.to_string(),
    })
}
