//! JWT 토큰 처리.
//!
//! 인증 WebSocket 엔드포인트의 경로 토큰을 HS256으로 검증합니다.
//! 토큰 발급은 별도 인증 서비스의 몫이며, 여기서는 테스트와 개발용
//! [`create_token`]만 제공합니다.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{IdentityResolver, UserIdentity};

/// JWT 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이메일
    pub sub: String,
    /// 사용자 이름 (없으면 이메일 로컬 파트 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// 사용자 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `email` - 사용자 이메일 (`sub`)
    /// * `expires_in_minutes` - 만료 시간 (분)
    pub fn new(email: impl Into<String>, expires_in_minutes: i64) -> Self {
        Self {
            sub: email.into(),
            username: None,
            uid: None,
            exp: (Utc::now() + Duration::minutes(expires_in_minutes)).timestamp(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Claims를 사용자 정보로 변환합니다.
    pub fn into_identity(self) -> UserIdentity {
        let username = self
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email_local_part(&self.sub).to_string());

        UserIdentity {
            id: self.uid,
            username,
            email: self.sub,
        }
    }
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// JWT 토큰 생성 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
}

/// HS256 토큰 생성.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// HS256 토큰 검증 및 디코딩.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

/// JWT 기반 신원 확인기.
#[derive(Clone)]
pub struct JwtIdentityResolver {
    secret: String,
}

impl JwtIdentityResolver {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> Option<UserIdentity> {
        match decode_token(token, &self.secret) {
            Ok(claims) if !claims.sub.trim().is_empty() => Some(claims.into_identity()),
            Ok(_) => {
                debug!("Token has empty subject");
                None
            }
            Err(e) => {
                debug!(error = %e, "Token validation failed");
                None
            }
        }
    }
}
