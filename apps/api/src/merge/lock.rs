use std::time::Duration;

use redis::Client as RedisClient;
use tracing::{debug, warn};
use uuid::Uuid;

/// Deletes the key only if it still holds our token, so an expired lock
/// re-acquired by someone else is never released by us.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

pub fn merge_lock_key(candidate_id: Uuid) -> String {
    format!("profile-merge:{candidate_id}")
}

/// Per-candidate advisory lock held across extraction and merge of an uploaded CV.
#[derive(Clone)]
pub struct MergeLock {
    redis: RedisClient,
    ttl: Duration,
}

/// Held lock. Release it with [`MergeLockGuard::release`]; a guard dropped
/// without that (client gone, handler cancelled) releases from a spawned task.
pub struct MergeLockGuard {
    redis: RedisClient,
    key: String,
    token: String,
    released: bool,
}

impl MergeLock {
    pub fn new(redis: RedisClient, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    /// Returns `None` when another upload already holds the candidate.
    pub async fn try_acquire(
        &self,
        candidate_id: Uuid,
    ) -> Result<Option<MergeLockGuard>, redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let key = merge_lock_key(candidate_id);
        let token = Uuid::new_v4().to_string();

        let acquired: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(self.ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;

        if acquired.is_none() {
            debug!(%candidate_id, "Merge lock already held");
            return Ok(None);
        }
        Ok(Some(MergeLockGuard {
            redis: self.redis.clone(),
            key,
            token,
            released: false,
        }))
    }
}

impl MergeLockGuard {
    pub async fn release(mut self) {
        if let Some((key, token)) = self.take_pending() {
            release_key(&self.redis, &key, &token).await;
        }
    }

    /// Key and token still to be released; `None` once a release has started.
    fn take_pending(&mut self) -> Option<(String, String)> {
        if self.released {
            return None;
        }
        self.released = true;
        Some((
            std::mem::take(&mut self.key),
            std::mem::take(&mut self.token),
        ))
    }
}

impl Drop for MergeLockGuard {
    fn drop(&mut self) {
        let Some((key, token)) = self.take_pending() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                debug!(%key, "Merge lock dropped while held, releasing in background");
                let redis = self.redis.clone();
                runtime.spawn(async move { release_key(&redis, &key, &token).await });
            }
            Err(_) => warn!(%key, "Merge lock dropped outside a runtime, left to expire"),
        }
    }
}

/// Best effort: a failed release only delays the next merge until the TTL lapses.
async fn release_key(redis: &RedisClient, key: &str, token: &str) {
    let released: Result<i32, redis::RedisError> = async {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        redis::Script::new(RELEASE_SCRIPT)
            .key(key)
            .arg(token)
            .invoke_async(&mut conn)
            .await
    }
    .await;

    match released {
        Ok(0) => warn!(%key, "Merge lock expired before release"),
        Ok(_) => debug!(%key, "Merge lock released"),
        Err(e) => warn!(%key, "Failed to release merge lock: {e}"),
    }
}
