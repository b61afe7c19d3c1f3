//! 联合登录令牌验证
//!
//! 客户端使用身份提供商签发的 HS256 令牌换取本服务的 JWT。
//! 令牌使用 FEDERATED_JWT_SECRET 共享密钥验证。

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use super::JwtError;

/// 联合登录配置
#[derive(Debug, Clone)]
pub struct FederatedConfig {
    /// 身份提供商共享密钥 (未设置则禁用联合登录)
    pub secret: Option<String>,
}

impl FederatedConfig {
    /// 从环境变量加载 (FEDERATED_JWT_SECRET)
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("FEDERATED_JWT_SECRET").ok(),
        }
    }
}

/// 身份提供商令牌携带的身份信息
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedIdentity {
    /// 提供商侧的用户标识
    pub sub: String,
    /// 邮箱
    pub email: String,
    /// 显示名称
    #[serde(default)]
    pub name: Option<String>,
    /// 过期时间戳
    pub exp: i64,
}

/// 联合登录令牌验证器
#[derive(Debug, Clone)]
pub struct FederatedVerifier {
    decoding_key: Option<DecodingKey>,
}

impl FederatedVerifier {
    pub fn new(config: &FederatedConfig) -> Self {
        Self {
            decoding_key: config
                .secret
                .as_ref()
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
        }
    }

    /// 联合登录是否启用
    pub fn is_enabled(&self) -> bool {
        self.decoding_key.is_some()
    }

    /// 验证身份提供商令牌
    ///
    /// 提供商令牌只要求 sub/exp；不校验 iss/aud
    pub fn verify(&self, token: &str) -> Result<FederatedIdentity, JwtError> {
        let key = self.decoding_key.as_ref().ok_or_else(|| {
            JwtError::ConfigError("Federated sign-in is not configured".to_string())
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data =
            decode::<FederatedIdentity>(token, key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(format!("Provider token rejected: {}", e)),
            })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct ProviderClaims {
        sub: String,
        email: String,
        name: Option<String>,
        exp: i64,
    }

    fn provider_token(secret: &str, exp_offset: i64) -> String {
        let claims = ProviderClaims {
            sub: "google-uid-1".to_string(),
            email: "ana@example.com".to_string(),
            name: Some("Ana".to_string()),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode provider token")
    }

    #[test]
    fn test_verify_accepts_provider_token() {
        let verifier = FederatedVerifier::new(&FederatedConfig {
            secret: Some("shared-provider-secret".to_string()),
        });

        let identity = verifier
            .verify(&provider_token("shared-provider-secret", 3600))
            .expect("Failed to verify provider token");
        assert_eq!(identity.sub, "google-uid-1");
        assert_eq!(identity.email, "ana@example.com");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = FederatedVerifier::new(&FederatedConfig {
            secret: Some("shared-provider-secret".to_string()),
        });

        assert!(verifier.verify(&provider_token("other-secret", 3600)).is_err());
    }

    #[test]
    fn test_verify_disabled_without_secret() {
        let verifier = FederatedVerifier::new(&FederatedConfig { secret: None });
        assert!(!verifier.is_enabled());
        assert!(matches!(
            verifier.verify("anything"),
            Err(JwtError::ConfigError(_))
        ));
    }
}
