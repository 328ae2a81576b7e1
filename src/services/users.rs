//! Random user provider with caching and retry.

use serde::Deserialize;
use tracing::info;

use crate::cache::{CacheKey, ExpiringCache};
use crate::error::FetchError;
use crate::models::User;
use crate::retry::RetryExecutor;
use crate::services::client::{validate, ApiClient};

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    results: Vec<User>,
}

/// Fetches random user profiles, reusing the cached list while it is fresh.
#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
    cache: ExpiringCache,
    retry: RetryExecutor,
    url: String,
}

impl UserService {
    pub fn new(client: ApiClient, cache: ExpiringCache, retry: RetryExecutor, url: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            retry,
            url: url.into(),
        }
    }

    /// Returns `count` users.
    ///
    /// With `use_cache`, a cached list holding at least `count` users is
    /// sliced and returned without a request. Fetched lists are cached.
    pub async fn fetch_random_users(&self, count: usize, use_cache: bool) -> Result<Vec<User>, FetchError> {
        if use_cache {
            if let Some(mut cached) = self.cached_users() {
                if cached.len() >= count {
                    info!("Using cached users ({} available)", cached.len());
                    cached.truncate(count);
                    return Ok(cached);
                }
            }
        }

        let query = [("results", count.to_string())];
        let users = self
            .retry
            .run("Random User API", || async {
                let data: UsersResponse = self.client.fetch_json(&self.url, &query).await?;
                validate(&data, |d| !d.results.is_empty(), "No users found in response")?;
                Ok::<_, FetchError>(data.results)
            })
            .await?;

        self.cache.set(CacheKey::Users.as_str(), &users);
        Ok(users)
    }

    /// Drops the cached list and fetches a new one.
    pub async fn fetch_fresh_users(&self, count: usize) -> Result<Vec<User>, FetchError> {
        info!("Forcing fresh user fetch (ignoring cache)");
        self.cache.remove(CacheKey::Users.as_str());
        self.fetch_random_users(count, false).await
    }

    /// Cached users, without any request.
    pub fn cached_users(&self) -> Option<Vec<User>> {
        self.cache.get(CacheKey::Users.as_str())
    }

    pub fn has_cached_users(&self) -> bool {
        self.cached_users().is_some_and(|users| !users.is_empty())
    }
}
