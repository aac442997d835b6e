use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;

use super::params::{StreamParams, StreamQuery};
use crate::assembler::SignalAssembler;
use crate::error::SessionError;
use crate::market_data::PriceSource;
use crate::model::Signal;

/// Longest period handed to the timer; a tick further out than this never
/// fires within the life of a connection anyway.
const TIMER_CEILING: Duration = Duration::from_secs(30 * 365 * 86_400);

/// How long teardown waits for the client to finish the close handshake.
const CLOSE_HANDSHAKE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingParams,
    Active,
    Closed,
}

/// Why a session reached `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ParamsRejected,
    ClientClosed,
    SendFailed,
    Shutdown,
}

/// Everything a session borrows from the server. All of it is read-only.
pub struct SessionContext<S> {
    pub assembler: Arc<SignalAssembler<S>>,
    pub shutdown: watch::Receiver<bool>,
}

type WsSink = SplitSink<WebSocket, Message>;
type WsStream = SplitStream<WebSocket>;

/// Drive one client connection from parameter validation to close.
///
/// The write half stays with this task: it emits signals and performs
/// teardown. The read half moves to a spawned reader whose only job is to
/// notice the client going away and fire the one-shot cancellation.
pub async fn run_session<S>(socket: WebSocket, query: StreamQuery, ctx: SessionContext<S>) -> SessionEnd
where
    S: PriceSource + 'static,
{
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("session", %session_id);
    drive(socket, query, ctx).instrument(span).await
}

async fn drive<S>(socket: WebSocket, query: StreamQuery, ctx: SessionContext<S>) -> SessionEnd
where
    S: PriceSource + 'static,
{
    let mut state = SessionState::AwaitingParams;
    let (mut sink, stream) = socket.split();

    let params = match StreamParams::parse(&query) {
        Ok(params) => params,
        Err(e) => {
            tracing::info!(error = %e, ?query, "Rejecting stream request");
            if let Err(err) = sink.send(Message::Text(e.to_string().into())).await {
                tracing::debug!(error = %err, "Could not deliver parameter error");
            }
            close_normally(&mut sink).await;
            transition(&mut state, SessionState::Closed);
            return SessionEnd::ParamsRejected;
        }
    };

    transition(&mut state, SessionState::Active);
    tracing::info!(
        symbols = ?params.symbols,
        tick_secs = params.tick.as_secs(),
        "Streaming signals"
    );

    let (cancel_tx, cancel_rx) = oneshot::channel();
    let mut reader = tokio::spawn(read_until_closed(stream, cancel_tx).in_current_span());

    let end = emit_loop(&mut sink, &params, &ctx.assembler, cancel_rx, ctx.shutdown).await;

    close_normally(&mut sink).await;
    // The reader flushes the close reply and sees the peer's close; give it
    // a bounded window before dropping the connection.
    if tokio::time::timeout(CLOSE_HANDSHAKE_GRACE, &mut reader)
        .await
        .is_err()
    {
        tracing::debug!("Close handshake did not complete, dropping connection");
        reader.abort();
    }
    transition(&mut state, SessionState::Closed);
    tracing::info!(reason = ?end, "Session closed");
    end
}

fn transition(state: &mut SessionState, next: SessionState) {
    tracing::debug!(from = ?*state, to = ?next, "Session state change");
    *state = next;
}

/// Discards inbound data and fires `cancel` on the first close frame or read
/// error. Reading continues after a close frame so the queued close reply
/// gets flushed; the loop ends when the connection is fully closed.
async fn read_until_closed(mut stream: WsStream, cancel: oneshot::Sender<()>) {
    let mut cancel = Some(cancel);
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Close(frame)) => {
                tracing::debug!(?frame, "Client requested close");
                if let Some(tx) = cancel.take() {
                    let _ = tx.send(());
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket read error");
                break;
            }
        }
    }
    if let Some(tx) = cancel.take() {
        let _ = tx.send(());
    }
}

/// Cancellation and shutdown are only observed between ticks; a tick in
/// progress always runs to completion.
async fn emit_loop<S: PriceSource>(
    sink: &mut WsSink,
    params: &StreamParams,
    assembler: &SignalAssembler<S>,
    mut cancel: oneshot::Receiver<()>,
    mut shutdown: watch::Receiver<bool>,
) -> SessionEnd {
    let period = params.tick.min(TIMER_CEILING);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        if *shutdown.borrow() {
            return SessionEnd::Shutdown;
        }
        tokio::select! {
            biased;
            _ = &mut cancel => return SessionEnd::ClientClosed,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return SessionEnd::Shutdown;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        tick += 1;
        if let Err(e) = emit_tick(sink, &params.symbols, assembler, tick).await {
            tracing::warn!(tick, error = %e, "Send failed, closing session");
            return SessionEnd::SendFailed;
        }
    }
}

async fn emit_tick<S: PriceSource>(
    sink: &mut WsSink,
    symbols: &[String],
    assembler: &SignalAssembler<S>,
    tick: u64,
) -> Result<usize, SessionError> {
    let mut sent = 0;
    for symbol in symbols {
        match assembler.build_signal(symbol).await {
            Ok(signal) => {
                let payload = match encode_signal(&signal) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(tick, symbol = %symbol, error = %e, "Skipping unencodable signal");
                        continue;
                    }
                };
                sink.send(Message::Text(payload.into())).await?;
                sent += 1;
            }
            Err(e) => {
                tracing::warn!(tick, symbol = %symbol, error = %e, "Skipping symbol this tick");
            }
        }
    }
    tracing::debug!(tick, sent, total = symbols.len(), "Tick complete");
    Ok(sent)
}

fn encode_signal(signal: &Signal) -> Result<String, serde_json::Error> {
    serde_json::to_string(signal)
}

/// Sends a normal-closure frame. After a client-initiated close this doubles
/// as the acknowledgement.
async fn close_normally(sink: &mut WsSink) {
    let frame = CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static(""),
    };
    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "Close frame not delivered");
    }
}
