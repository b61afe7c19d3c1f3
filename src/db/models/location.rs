//! Location Ping Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// 用户当前位置文档
///
/// 每个用户只保留一条记录，每次上报整体覆盖。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationPing {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// 上报用户 ("user:xxx")
    pub user: String,
    pub latitude: f64,
    pub longitude: f64,
    /// 定位精度 (米)
    pub accuracy: f64,
    /// 服务端打点时间 (epoch 毫秒)
    pub timestamp: i64,
}
