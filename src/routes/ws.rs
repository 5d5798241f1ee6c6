//! WebSocket upgrade + message loop for the editor's live preview. Each client
//! message is parsed as JSON and answered with a single JSON message.
//!
//! Calls are independent: the client debounces keystrokes and the last reply
//! it receives wins.

use axum::{
  extract::{
    ws::{Message, WebSocket},
    WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::{editor_parse, editor_render, editor_validate};
use crate::protocol::{ClientWsMessage, ServerWsMessage};

#[instrument(level = "info", skip_all)]
pub async fn ws_upgrade(ws: WebSocketUpgrade) -> impl IntoResponse {
  info!(target: "quizdesk_backend", "WebSocket upgrade requested");
  ws.on_upgrade(handle_ws)
}

#[instrument(level = "info", skip(socket))]
async fn handle_ws(mut socket: WebSocket) {
  info!(target: "quizdesk_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = reply_to(&txt);
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "quizdesk_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "quizdesk_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize one text frame.
pub fn reply_to(txt: &str) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "editor", kind = message_kind(&incoming), "WS received");
      handle_client_ws(incoming)
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

fn handle_client_ws(msg: ClientWsMessage) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,
    ClientWsMessage::Parse { text } => ServerWsMessage::Parsed { report: editor_parse(&text) },
    ClientWsMessage::Render { questions } => ServerWsMessage::Rendered { text: editor_render(&questions) },
    ClientWsMessage::Validate { questions } => ServerWsMessage::Validated { report: editor_validate(questions) },
  }
}

fn message_kind(msg: &ClientWsMessage) -> &'static str {
  match msg {
    ClientWsMessage::Ping => "ping",
    ClientWsMessage::Parse { .. } => "parse",
    ClientWsMessage::Render { .. } => "render",
    ClientWsMessage::Validate { .. } => "validate",
  }
}
