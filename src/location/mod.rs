//! Location tracking side channel
//!
//! 已认证客户端上报当前位置，服务端打点时间并按用户覆盖存储。
//! 与购物车和目录状态完全独立。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::AppError;
use crate::db::models::LocationPing;
use crate::db::repository::LocationRepository;
use crate::utils::AppResult;

/// 位置上报服务
#[derive(Clone)]
pub struct LocationService {
    repo: LocationRepository,
    enabled: bool,
}

impl LocationService {
    pub fn new(db: Surreal<Db>, enabled: bool) -> Self {
        Self {
            repo: LocationRepository::new(db),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 记录一次位置上报
    ///
    /// 坐标超界或精度为负拒绝；时间由服务端打点。
    pub async fn record_ping(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    ) -> AppResult<LocationPing> {
        if !self.enabled {
            return Err(AppError::Forbidden(
                "Location tracking is disabled".to_string(),
            ));
        }

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(format!(
                "Latitude out of range: {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!(
                "Longitude out of range: {}",
                longitude
            )));
        }
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(AppError::Validation(format!(
                "Invalid accuracy: {}",
                accuracy
            )));
        }

        let timestamp = chrono::Utc::now().timestamp_millis();
        let ping = self
            .repo
            .upsert_ping(user_id, latitude, longitude, accuracy, timestamp)
            .await?;

        tracing::debug!(user = %user_id, "Location ping recorded");
        Ok(ping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn service(enabled: bool) -> (LocationService, LocationRepository) {
        let db = DbService::memory().await.expect("in-memory db").db;
        (
            LocationService::new(db.clone(), enabled),
            LocationRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_ping_overwrites_previous() {
        let (svc, repo) = service(true).await;

        svc.record_ping("user:ana", 40.4168, -3.7038, 12.5)
            .await
            .unwrap();
        svc.record_ping("user:ana", 41.3874, 2.1686, 8.0)
            .await
            .unwrap();

        let current = repo.find_by_user("user:ana").await.unwrap().unwrap();
        assert_eq!(current.latitude, 41.3874);
        assert_eq!(current.user, "user:ana");
    }

    #[tokio::test]
    async fn test_out_of_range_rejected() {
        let (svc, _repo) = service(true).await;
        assert!(svc.record_ping("user:ana", 91.0, 0.0, 1.0).await.is_err());
        assert!(svc.record_ping("user:ana", 0.0, 181.0, 1.0).await.is_err());
        assert!(svc.record_ping("user:ana", 0.0, 0.0, -1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_rejects() {
        let (svc, _repo) = service(false).await;
        let err = svc
            .record_ping("user:ana", 40.0, -3.0, 5.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
