use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use playback_core::domain::SeedId;
use playback_core::ports::{EventSink, SystemClock};
use playback_core::{generate_script, CyclePlayer, PriorityRoundLoader, SessionController, SessionEvent};

use crate::protocol::{Command, ServerMessage};
use crate::sim_audio::SimulatedAudioOutput;
use crate::state::{belts_from_spec, AppState};

/// Forwards every emitted `SessionEvent` onto a channel drained by the
/// connection's write task. `EventSink::emit` is a synchronous, infallible
/// contract (spec §4.3); an unbounded channel keeps `send` non-blocking.
struct ChannelEventSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();

    let controller: Arc<Mutex<SessionController>> = Arc::new(Mutex::new(SessionController::new(
        CyclePlayer::new(Arc::new(SimulatedAudioOutput), Arc::new(SystemClock)),
    )));
    controller
        .lock()
        .await
        .add_listener(Arc::new(ChannelEventSink { tx: event_tx }));

    let mut loader: Option<Arc<PriorityRoundLoader>> = None;

    // Forwards session events to the client as they arrive.
    let forward_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let json = serde_json::to_string(&ServerMessage::Session(event)).unwrap();
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!(error = %e, "websocket receive error");
                break;
            }
        };

        let Message::Text(text) = msg else {
            if matches!(msg, Message::Close(_)) {
                break;
            }
            continue;
        };

        let command: Command = match serde_json::from_str(&text) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::warn!(error = %e, "invalid command");
                continue;
            }
        };

        handle_command(command, &app_state, &controller, &mut loader).await;
    }

    if let Some(loader) = loader {
        loader.stop();
    }
    forward_task.abort();
}

async fn handle_command(
    command: Command,
    app_state: &AppState,
    controller: &Arc<Mutex<SessionController>>,
    loader: &mut Option<Arc<PriorityRoundLoader>>,
) {
    match command {
        Command::StartSession {
            course_code,
            current_seed,
            total_seeds,
            belts,
            lookahead_seeds,
        } => {
            let start = SeedId::new(current_seed);
            let end = SeedId::new(current_seed + lookahead_seeds);
            let script =
                match generate_script(app_state.repo.as_ref(), &course_code, start, end, &app_state.config).await
                {
                    Ok(script) => script,
                    Err(e) => {
                        tracing::error!(error = %e, "script generation failed");
                        return;
                    }
                };

            {
                let mut guard = controller.lock().await;
                guard.initialize(script.rounds, None, HashMap::new());
                if let Err(e) = guard.start().await {
                    tracing::error!(error = %e, "failed to start session");
                    return;
                }
            }

            let belt_map = belts_from_spec(&belts);
            let new_loader = Arc::new(PriorityRoundLoader::new(
                app_state.repo.clone(),
                course_code,
                app_state.config.clone(),
                start,
                total_seeds,
                &belt_map,
            ));
            let loader_clone = new_loader.clone();
            let controller_clone = controller.clone();
            tokio::spawn(async move {
                loader_clone.run(&controller_clone).await;
            });
            *loader = Some(new_loader);
        }
        Command::Pause => {
            let _ = controller.lock().await.pause();
        }
        Command::Resume => {
            let _ = controller.lock().await.resume().await;
        }
        Command::Stop => {
            controller.lock().await.stop();
            if let Some(loader) = loader.take() {
                loader.stop();
            }
        }
        Command::SkipCycle => controller.lock().await.skip_cycle().await,
        Command::SkipRound => controller.lock().await.skip_round().await,
        Command::JumpToRound { round_index } => controller.lock().await.jump_to_round(round_index).await,
        Command::Prioritize { seed } => {
            if let Some(loader) = loader.clone() {
                tokio::spawn(async move {
                    loader.prioritize(SeedId::new(seed)).await;
                });
            }
        }
    }
}
