//! services/api/src/adapters/reddit.rs
//!
//! This module contains the adapter for Reddit's public JSON listings.
//! It implements the `ContentFeedService` port from the `core` crate.

use async_trait::async_trait;
use feelscope_core::ports::{ContentFeedService, PortError, PortResult};
use reqwest::header::USER_AGENT;
use serde::Deserialize;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that reads post titles from a subreddit's "hot" listing.
#[derive(Clone)]
pub struct RedditFeedAdapter {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl RedditFeedAdapter {
    /// Creates a new `RedditFeedAdapter`.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            user_agent: user_agent.into(),
        }
    }
}

//=========================================================================================
// Listing Payload
//=========================================================================================

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: Post,
}

#[derive(Deserialize)]
struct Post {
    title: String,
}

//=========================================================================================
// `ContentFeedService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentFeedService for RedditFeedAdapter {
    async fn hot_titles(&self, community: &str, limit: usize) -> PortResult<Vec<String>> {
        let url = format!("{}/r/{}/hot.json", self.base_url, community);

        let listing = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortError::Upstream(format!("feed request failed: {}", e)))?
            .json::<Listing>()
            .await
            .map_err(|e| PortError::Upstream(format!("feed payload unreadable: {}", e)))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .take(limit)
            .map(|child| child.data.title)
            .collect())
    }
}
