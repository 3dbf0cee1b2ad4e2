use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace, warn};

use crate::config::BridgeConfig;
use crate::server::context::{BridgeError, ConnectionContext, SharedConfig};
use crate::server::handlers;
use crate::server::protocol::{Reply, Request};
use crate::server::watcher::ChangeWatcher;

/// Run the WebSocket server on the configured address
pub async fn run_server(config: BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on ws://{}", addr);
    info!("Ready for connections!");

    serve(listener, config).await?;
    Ok(())
}

/// Serve the bridge on an already bound listener
pub async fn serve(listener: TcpListener, config: BridgeConfig) -> std::io::Result<()> {
    axum::serve(listener, router(Arc::new(config))).await
}

/// Routes accepting the WebSocket upgrade
pub fn router(config: SharedConfig) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(config)
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(config): State<SharedConfig>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, ConnectionContext::new(config)))
}

/// Handle a WebSocket connection
///
/// Frames are processed one at a time, so replies leave in request order.
/// Ping frames are answered by axum.
async fn handle_socket(mut socket: WebSocket, ctx: ConnectionContext) {
    info!("Client connected");

    // 连接级 watcher，随连接结束而释放
    let watcher = match ChangeWatcher::start(ctx.root(), &ctx.config.watch) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("File watcher unavailable for this connection: {}", e);
            None
        }
    };

    while let Some(msg_result) = socket.recv().await {
        let data = match msg_result {
            Ok(Message::Text(text)) => text.into_bytes(),
            Ok(Message::Binary(data)) => data,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                debug!("Close frame received");
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
        };

        let reply = handle_client_message(&data, &ctx).await;
        if let Err(e) = send_reply(&mut socket, &reply).await {
            error!("Failed to send reply: {}", e);
            break;
        }
    }

    drop(watcher);
    info!("Client disconnected");
}

/// Decode and dispatch one frame; always yields exactly one reply
async fn handle_client_message(data: &[u8], ctx: &ConnectionContext) -> Reply {
    trace!("handle_client_message: {} bytes", data.len());

    let request: Request = match serde_json::from_slice(data) {
        Ok(request) => request,
        Err(e) => {
            let err = BridgeError::from(e);
            warn!("Rejected message: {}", err);
            return err.to_reply().into();
        }
    };

    match handlers::dispatch(ctx, request).await {
        Ok(response) => response.into(),
        Err(e) => {
            error!("Error: {}", e);
            e.to_reply().into()
        }
    }
}

/// Send a reply as a JSON text frame
pub async fn send_reply(socket: &mut WebSocket, reply: &Reply) -> Result<(), String> {
    let text = serde_json::to_string(reply).map_err(|e| e.to_string())?;
    socket
        .send(Message::Text(text))
        .await
        .map_err(|e| e.to_string())
}
