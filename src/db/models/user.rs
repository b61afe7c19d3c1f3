//! User Profile Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// User profile matching the document store schema
///
/// 联合登录创建的档案没有密码 (`hash_pass = None`)，
/// 这类账号不能走密码登录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing)]
    pub hash_pass: Option<String>,
    /// 角色: client | admin | seller
    pub role: String,
    /// 创建时间 (epoch 毫秒)
    #[serde(default)]
    pub created_at: i64,
}

impl User {
    /// "table:id" 字符串形式的 ID (无 ID 时为空串)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }

    /// Verify password using argon2
    ///
    /// 无密码档案 (联合登录) 始终返回 false
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let Some(hash_pass) = &self.hash_pass else {
            return Ok(false);
        };

        let parsed_hash = PasswordHash::new(hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

/// Public view of a user profile (API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: i64,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
        }
    }
}

/// 角色是否合法
pub fn is_valid_role(role: &str) -> bool {
    matches!(role, "client" | "admin" | "seller")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = User::hash_password("secreto123").expect("Failed to hash password");
        let user = User {
            id: None,
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            hash_pass: Some(hash),
            role: "client".to_string(),
            created_at: 0,
        };

        assert!(user.verify_password("secreto123").expect("verify failed"));
        assert!(!user.verify_password("wrong").expect("verify failed"));
    }

    #[test]
    fn test_passwordless_profile_never_verifies() {
        let user = User {
            id: None,
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            hash_pass: None,
            role: "client".to_string(),
            created_at: 0,
        };

        assert!(!user.verify_password("anything").expect("verify failed"));
    }

    #[test]
    fn test_valid_roles() {
        assert!(is_valid_role("client"));
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("seller"));
        assert!(!is_valid_role("root"));
    }
}
