//! 인증.
//!
//! 인증 WebSocket 엔드포인트(`/ws/live-news/{token}`)에서 토큰을 사용자 정보로
//! 변환합니다. 기본 구현은 HS256 JWT를 검증하는 [`JwtIdentityResolver`]입니다.

mod jwt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use jwt::{create_token, decode_token, Claims, JwtError, JwtIdentityResolver};

/// 인증된 사용자 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserIdentity {
    /// 사용자 ID (토큰에 없으면 `null`)
    pub id: Option<String>,
    pub username: String,
    pub email: String,
}

/// 토큰 → 사용자 정보 변환기.
///
/// 검증에 실패하면 `None`을 반환합니다. 실패 사유는 호출자에게 노출하지 않습니다.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Option<UserIdentity>;
}
