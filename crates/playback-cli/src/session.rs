use anyhow::Result;
use colored::Colorize;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::protocol::ServerMessage;

/// Drive a session against a running `playback-server` headlessly: commands
/// come in as JSON lines on stdin, session events are pretty-printed to
/// stdout as they arrive, against the Command/ServerMessage wire protocol.
pub async fn run(server: &str) -> Result<()> {
    let url = Url::parse(&format!("{}/ws", server.trim_end_matches('/')))?;

    tracing::info!(%url, "connecting");
    let (ws_stream, _) = connect_async(url).await?;
    tracing::info!("connected");

    let (mut write, mut read) = ws_stream.split();

    let write_handle = tokio::spawn(async move {
        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Err(e) = write.send(Message::Text(line.to_string())).await {
                tracing::error!(error = %e, "failed to send command");
                break;
            }
        }
    });

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::Session(event)) => {
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                Ok(ServerMessage::Error { message }) => {
                    eprintln!("{} {}", "server error:".red().bold(), message);
                }
                Err(e) => {
                    tracing::warn!(error = %e, raw = %text, "unrecognised server message");
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!("connection closed by server");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "websocket error");
                break;
            }
            _ => {}
        }
    }

    write_handle.abort();
    Ok(())
}
