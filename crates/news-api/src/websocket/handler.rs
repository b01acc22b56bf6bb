//! WebSocket 연결 handler.
//!
//! # 엔드포인트
//!
//! - `GET /ws/live-news`: 익명 접속
//! - `GET /ws/live-news/{token}`: 인증 접속. 토큰이 유효하지 않으면 `error` 프레임을
//!   보낸 뒤 4001 코드로 닫습니다
//!
//! # 연결 처리 순서
//!
//! 1. `connection_status` 전송
//! 2. 갱신 루프 시작 (이미 실행 중이면 무시)
//! 3. `initial_news` 전송 후 레지스트리 등록
//! 4. writer 태스크(채널 → 소켓)와 reader 태스크(소켓 → 디스패처) 실행
//!
//! reader가 끝나면 writer는 남은 응답과 Close 프레임을 보낼 시간을 잠시 얻습니다.
//! writer가 먼저 끝나면 reader는 바로 중단됩니다. 어느 경로로 끝나든 레지스트리에서 제거합니다.
//! 브로드캐스트에서 퇴출된 세션은 reader가 멈추면서 소켓이 닫힙니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{stream::SplitSink, Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dispatcher::CommandDispatcher;
use super::messages::ServerMessage;
use crate::auth::UserIdentity;
use crate::service::ClientHandle;
use crate::state::AppState;

/// 인증 실패 시 close 코드.
pub const CLOSE_INVALID_TOKEN: u16 = 4001;

/// 익명 WebSocket 업그레이드 핸들러.
pub async fn live_news_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, None))
}

/// 인증 WebSocket 업그레이드 핸들러.
pub async fn live_news_ws_authenticated(
    ws: WebSocketUpgrade,
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        match state.identity.resolve(&token).await {
            Some(user) => handle_socket(socket, state, Some(user)).await,
            None => reject_socket(socket).await,
        }
    })
}

/// 인증 실패 연결을 닫습니다.
async fn reject_socket(mut socket: WebSocket) {
    warn!("WebSocket authentication failed");

    if let Ok(json) = ServerMessage::error("Invalid authentication token").to_json() {
        let _ = socket.send(Message::Text(json.into())).await;
    }
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: CLOSE_INVALID_TOKEN,
            reason: "Invalid authentication token".into(),
        })))
        .await;
}

async fn send_direct(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> bool {
    match message.to_json() {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    }
}

/// reader가 끝난 뒤 writer가 남은 프레임을 비울 수 있는 시간.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 채널의 프레임을 소켓으로 보냅니다.
///
/// 모든 송신 핸들이 사라지면 남은 프레임을 보낸 뒤 소켓을 닫습니다.
async fn write_frames<S>(mut sink: S, mut outbound: mpsc::Receiver<String>)
where
    S: Sink<Message> + Unpin,
{
    while let Some(json) = outbound.recv().await {
        if sink.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }
    let _ = sink.close().await;
}

/// 소켓 프레임을 디스패처로 넘기고 응답을 자기 채널에 넣습니다.
///
/// 클라이언트 종료, 수신 에러, 서버 종료, 브로드캐스트 퇴출 중 하나로 끝납니다.
async fn read_commands<S>(
    mut stream: S,
    dispatcher: CommandDispatcher,
    replies: ClientHandle,
    shutdown: CancellationToken,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let evicted = replies.eviction_token();

    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = evicted.cancelled() => {
                info!(session_id = %replies.id, "Session evicted by broadcast");
                break;
            }
            frame = stream.next() => frame,
        };

        let reply = match frame {
            Some(Ok(Message::Text(text))) => dispatcher.dispatch(text.as_str()).await,
            Some(Ok(Message::Binary(_))) => ServerMessage::error("Binary messages are not supported"),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => {
                debug!(session_id = %replies.id, "Close received");
                break;
            }
            Some(Err(e)) => {
                warn!(session_id = %replies.id, error = %e, "WebSocket receive error");
                break;
            }
        };

        if !replies.send(&reply).await {
            break;
        }
    }
}

/// WebSocket 연결 처리.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: Option<UserIdentity>) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let service = Arc::clone(&state.live_news);
    info!(
        session_id = %session_id,
        user = user.as_ref().map(|u| u.username.as_str()).unwrap_or("anonymous"),
        "WebSocket connected"
    );

    let (mut sink, stream) = socket.split();

    let status = match &user {
        Some(user) => ServerMessage::connected_as(user.clone()),
        None => ServerMessage::connected(),
    };
    if !send_direct(&mut sink, &status).await {
        debug!(session_id = %session_id, "Client closed before connection status");
        return;
    }

    service.start().await;

    let (handle, outbound) =
        ClientHandle::channel(session_id.clone(), user, service.config().client_buffer);
    let replies = handle.clone();
    if !service.connect(handle).await {
        return;
    }

    let mut send_task = tokio::spawn(write_frames(sink, outbound));
    let mut recv_task = tokio::spawn(read_commands(
        stream,
        CommandDispatcher::new(Arc::clone(&service)),
        replies,
        state.shutdown.clone(),
    ));

    tokio::select! {
        _ = &mut send_task => {
            debug!(session_id = %session_id, "Send task ended");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!(session_id = %session_id, "Receive task ended");
            // 레지스트리 핸들까지 사라지면 채널이 닫히고 writer가 남은 프레임 전송 후 종료
            service.disconnect(&session_id).await;
            if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task).await.is_err() {
                debug!(session_id = %session_id, "Writer did not drain in time");
                send_task.abort();
            }
        }
    }

    service.disconnect(&session_id).await;
    info!(session_id = %session_id, "WebSocket disconnected");
}

/// WebSocket 라우터 생성.
pub fn websocket_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/live-news", get(live_news_ws))
        .route("/live-news/{token}", get(live_news_ws_authenticated))
}
