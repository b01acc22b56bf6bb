//! 연결 레지스트리.
//!
//! 열린 WebSocket 연결의 송신 핸들을 보관합니다. 각 연결은 전용 writer 태스크가
//! 비우는 bounded 채널을 가지며, 레지스트리는 그 채널에 `try_send`만 합니다.
//! 채널이 닫혔거나 가득 찬 연결은 브로드캐스트 직후 제거되고, 세션 토큰이
//! 취소되어 해당 소켓도 닫힙니다.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::UserIdentity;
use crate::metrics::{record_evictions, set_websocket_connections};
use crate::websocket::{ServerMessage, WsError};

/// 연결 송신 핸들.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: String,
    /// 인증 엔드포인트로 접속한 경우의 사용자
    pub user: Option<UserIdentity>,
    outbound: mpsc::Sender<String>,
    /// 퇴출 시 취소됨. 복제본끼리 공유
    evicted: CancellationToken,
}

impl ClientHandle {
    pub fn new(id: impl Into<String>, user: Option<UserIdentity>, outbound: mpsc::Sender<String>) -> Self {
        Self {
            id: id.into(),
            user,
            outbound,
            evicted: CancellationToken::new(),
        }
    }

    /// 핸들과 writer 태스크가 읽을 수신 측을 함께 생성합니다.
    pub fn channel(
        id: impl Into<String>,
        user: Option<UserIdentity>,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(id, user, tx), rx)
    }

    /// 버퍼에 여유가 생길 때까지 기다려 보냅니다. 수신 측이 사라졌으면 `false`.
    ///
    /// 자기 연결에 대한 응답에만 사용합니다. 브로드캐스트는 [`try_send`](Self::try_send).
    pub async fn send(&self, message: &ServerMessage) -> bool {
        match message.to_json() {
            Ok(json) => self.outbound.send(json).await.is_ok(),
            Err(_) => false,
        }
    }

    /// 기다리지 않고 보냅니다. 버퍼가 가득 찼거나 닫혔으면 실패합니다.
    pub fn try_send(&self, json: String) -> Result<(), mpsc::error::TrySendError<String>> {
        self.outbound.try_send(json)
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    /// 브로드캐스트에서 퇴출되면 취소되는 토큰. 세션 reader가 기다립니다.
    pub fn eviction_token(&self) -> CancellationToken {
        self.evicted.clone()
    }

    pub fn is_evicted(&self) -> bool {
        self.evicted.is_cancelled()
    }
}

/// 브로드캐스트 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: usize,
}

/// 연결 레지스트리.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: RwLock<HashMap<String, ClientHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 연결을 등록합니다. 이미 등록된 ID면 아무것도 하지 않고 `false`.
    pub async fn add(&self, handle: ClientHandle) -> bool {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&handle.id) {
            return false;
        }
        debug!(session_id = %handle.id, "Client registered");
        clients.insert(handle.id.clone(), handle);
        set_websocket_connections(clients.len());
        true
    }

    /// 연결을 제거합니다. 없는 ID면 `false`.
    pub async fn remove(&self, id: &str) -> bool {
        let mut clients = self.clients.write().await;
        let removed = clients.remove(id).is_some();
        if removed {
            debug!(session_id = %id, "Client unregistered");
            set_websocket_connections(clients.len());
        }
        removed
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.clients.read().await.contains_key(id)
    }

    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// 모든 연결에 한 번씩 보냅니다.
    ///
    /// 직렬화는 한 번만 하고, 읽기 락 아래에서 각 연결에 `try_send`합니다.
    /// 실패한 연결은 순회가 끝난 뒤 쓰기 락으로 제거합니다. 재시도는 없습니다.
    pub async fn broadcast(&self, message: &ServerMessage) -> Result<BroadcastReport, WsError> {
        let json = message.to_json()?;
        Ok(self.broadcast_json(json).await)
    }

    async fn broadcast_json(&self, json: String) -> BroadcastReport {
        let mut delivered = 0;
        let mut failed = Vec::new();

        {
            let clients = self.clients.read().await;
            for (id, handle) in clients.iter() {
                match handle.try_send(json.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => failed.push(id.clone()),
                }
            }
        }

        if !failed.is_empty() {
            let mut clients = self.clients.write().await;
            for id in &failed {
                if let Some(handle) = clients.remove(id) {
                    handle.evicted.cancel();
                }
            }
            set_websocket_connections(clients.len());
            record_evictions(failed.len());
            info!(evicted = failed.len(), remaining = clients.len(), "Evicted unresponsive clients");
        }

        BroadcastReport {
            delivered,
            evicted: failed.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: &str, buffer: usize) -> (ClientHandle, mpsc::Receiver<String>) {
        ClientHandle::channel(id, None, buffer)
    }

    #[tokio::test]
    async fn test_add_and_remove_are_idempotent() {
        let registry = ConnectionRegistry::new();
        let (a, _rx) = handle("a", 4);

        assert!(registry.add(a.clone()).await);
        assert!(!registry.add(a).await);
        assert_eq!(registry.connection_count().await, 1);

        assert!(registry.remove("a").await);
        assert!(!registry.remove("a").await);
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_evicts_failed_member() {
        let registry = ConnectionRegistry::new();
        let (c1, mut rx1) = handle("c1", 4);
        let (c2, rx2) = handle("c2", 4);
        let (c3, mut rx3) = handle("c3", 4);
        registry.add(c1).await;
        registry.add(c2).await;
        registry.add(c3).await;

        // c2의 writer가 사라짐
        drop(rx2);

        let report = registry.broadcast(&ServerMessage::pong()).await.unwrap();
        assert_eq!(report, BroadcastReport { delivered: 2, evicted: 1 });

        assert!(rx1.recv().await.unwrap().contains(r#""type":"pong""#));
        assert!(rx3.recv().await.unwrap().contains(r#""type":"pong""#));
        assert!(!registry.contains("c2").await);
        assert_eq!(registry.connection_count().await, 2);
    }

    #[tokio::test]
    async fn test_broadcast_evicts_full_buffer() {
        let registry = ConnectionRegistry::new();
        let (slow, _rx) = handle("slow", 1);
        let session = slow.clone();
        registry.add(slow).await;

        let first = registry.broadcast(&ServerMessage::pong()).await.unwrap();
        assert_eq!(first.delivered, 1);

        // 아무도 읽지 않았으므로 두 번째는 버퍼 초과
        let second = registry.broadcast(&ServerMessage::pong()).await.unwrap();
        assert_eq!(second, BroadcastReport { delivered: 0, evicted: 1 });
        assert_eq!(registry.connection_count().await, 0);

        // 세션 쪽 복제본도 퇴출을 관찰함
        assert!(session.is_evicted());
        assert!(session.eviction_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_remove_does_not_mark_evicted() {
        let registry = ConnectionRegistry::new();
        let (c1, _rx) = handle("c1", 4);
        let session = c1.clone();
        registry.add(c1).await;

        assert!(registry.remove("c1").await);
        assert!(!session.is_evicted());
    }

    #[tokio::test]
    async fn test_broadcast_without_clients() {
        let registry = ConnectionRegistry::new();
        let report = registry.broadcast(&ServerMessage::pong()).await.unwrap();
        assert_eq!(report, BroadcastReport::default());
    }
}
