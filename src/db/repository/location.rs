//! Location Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::LocationPing;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct LocationRepository {
    base: BaseRepository,
}

impl LocationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Upsert the user's current location
    ///
    /// 文档以用户 key 为记录 ID，每次上报整体覆盖。
    pub async fn upsert_ping(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        accuracy: f64,
        timestamp: i64,
    ) -> RepoResult<LocationPing> {
        let key = user_id.strip_prefix("user:").unwrap_or(user_id).to_string();

        let mut result = self
            .base
            .db()
            .query(
                r#"UPSERT type::thing('user_location', $key) SET
                    user = $user,
                    latitude = $latitude,
                    longitude = $longitude,
                    accuracy = $accuracy,
                    timestamp = $timestamp
                RETURN AFTER"#,
            )
            .bind(("key", key))
            .bind(("user", user_id.to_string()))
            .bind(("latitude", latitude))
            .bind(("longitude", longitude))
            .bind(("accuracy", accuracy))
            .bind(("timestamp", timestamp))
            .await?;

        result
            .take::<Option<LocationPing>>(0)?
            .ok_or_else(|| RepoError::Database("Failed to upsert location".to_string()))
    }

    /// Fetch the user's current location, if reported
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Option<LocationPing>> {
        let key = user_id.strip_prefix("user:").unwrap_or(user_id).to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM type::thing('user_location', $key)")
            .bind(("key", key))
            .await?;
        let ping: Option<LocationPing> = result.take(0)?;
        Ok(ping)
    }
}
