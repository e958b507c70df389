//! Terminal client.
//!
//! Reads moves from stdin, sends them to the server, and prints every board
//! and the final result. Input is read on a plain thread so a blocked read
//! never holds the runtime open after the match ends.

use std::io::{BufRead, Write};

use futures_util::{SinkExt, StreamExt};
use tictac::prelude::*;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

const PROMPT: &str = "Move from 1-9 or (r)esign: ";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Builds the WebSocket URL for `url` and `port`.
///
/// A bare host gets `ws://`; `http://` and `https://` are swapped for
/// their WebSocket counterparts.
pub fn normalize_url(url: &str, port: u16) -> String {
    let url = url.trim().trim_end_matches('/');
    let (scheme, host) = match url.split_once("://") {
        Some((scheme, host)) => (scheme.to_ascii_lowercase(), host),
        None => (String::new(), url),
    };
    let scheme = match scheme.as_str() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    format!("{scheme}://{host}:{port}")
}

/// Parses one line of input. Anything other than a single `1`-`9` or `r`
/// is rejected.
pub fn parse_move(line: &str) -> Option<MoveEvent> {
    let mut chars = line.trim().chars();
    let (first, None) = (chars.next()?, chars.next()) else {
        return None;
    };
    match first {
        'r' => Some(MoveEvent::resignation()),
        '1'..='9' => first.to_digit(10).map(MoveEvent::at),
        _ => None,
    }
}

/// What the terminal does in response to one server event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Nothing to show.
    Quiet,
    /// Print the text, then ask for a move.
    Prompt(String),
    /// Print the text and leave.
    Finish(String),
}

/// Client-side view of the session.
///
/// Spectators are prompted too. A spectator moves up into a player slot
/// when a player leaves mid-match, and no event announces that, so the
/// server decides whether a move counts.
#[derive(Debug, Default)]
pub struct Terminal {
    me: Option<ConnectionId>,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn react(&mut self, event: ServerEvent) -> Screen {
        match event {
            ServerEvent::Welcome(welcome) => {
                self.me = Some(welcome.connection_id);
                Screen::Quiet
            }
            ServerEvent::MatchStarted(started) => {
                let me = self.me.as_ref();
                let role = if me == Some(&started.first_player_id) {
                    "the first player"
                } else if me == Some(&started.second_player_id) {
                    "the second player"
                } else {
                    "a spectator"
                };
                Screen::Prompt(format!("Game started. You are {role}."))
            }
            ServerEvent::BoardUpdated(update) => Screen::Prompt(format!("\n{}\n", update.board)),
            ServerEvent::MatchEnded(ended) => Screen::Finish(format!("\n{}", ended.text)),
        }
    }
}

/// Connects to `url` and plays until the match ends or the server leaves.
pub async fn play(url: &str) -> Result<(), ClientError> {
    let (ws, _) = tokio_tungstenite::connect_async(url).await?;
    println!("connected to {url}");

    let (mut sink, mut stream) = ws.split();
    let mut input = spawn_stdin_reader();
    let mut terminal = Terminal::new();
    let codec = JsonCodec;

    loop {
        tokio::select! {
            frame = stream.next() => {
                let data: Vec<u8> = match frame {
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Binary(data))) => data.into(),
                    Some(Ok(Message::Close(_))) | None => {
                        println!("disconnected");
                        return Ok(());
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };
                let event: ServerEvent = match codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(error = %e, "ignoring undecodable frame");
                        continue;
                    }
                };
                match terminal.react(event) {
                    Screen::Quiet => {}
                    Screen::Prompt(text) => {
                        println!("{text}");
                        print!("{PROMPT}");
                        let _ = std::io::stdout().flush();
                    }
                    Screen::Finish(text) => {
                        println!("{text}");
                        let _ = sink.close().await;
                        return Ok(());
                    }
                }
            }
            Some(line) = input.recv() => {
                let Some(event) = parse_move(&line) else {
                    continue;
                };
                let bytes = codec.encode(&ClientEvent::Move(event))?;
                sink.send(Message::binary(bytes)).await?;
            }
        }
    }
}

/// Forwards stdin lines until EOF.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
