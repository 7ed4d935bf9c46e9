//! Travel Chat - terminal client for the AI travel assistant
//!
//! Reads one message per stdin line and prints the transcript as it grows.
//! `/quit` exits immediately; end of input waits for a pending reply first.

use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travel_chat::{
    spawn_conversation, ClientConfig, ConversationSession, HttpTransport, LoggingTransport,
    Message, Sender, SessionSnapshot, SystemClock,
};

const QUIT_COMMAND: &str = "/quit";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_chat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let http = HttpTransport::new(&config.transport)?;

    match tokio::time::timeout(HEALTH_TIMEOUT, http.health()).await {
        Ok(Ok(health)) if health.is_ok() => {
            tracing::info!(base_url = %config.transport.base_url, "Assistant service is healthy");
        }
        Ok(Ok(health)) => {
            tracing::warn!(
                status = %health.status,
                message = ?health.message,
                "Assistant service reports a problem"
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(
                base_url = %config.transport.base_url,
                error = %e,
                "Assistant service is unreachable"
            );
        }
        Err(_) => {
            tracing::warn!(
                base_url = %config.transport.base_url,
                "Assistant health check timed out"
            );
        }
    }

    let transport = Arc::new(LoggingTransport::new(http));
    let session = ConversationSession::with_greeting(config.greeting, chrono::Utc::now());
    let (handle, runtime_task) = spawn_conversation(session, transport, SystemClock);

    let printer = tokio::spawn(print_transcript(handle.watch()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            return Ok(());
        }
        handle.submit_turn(line).await?;
    }

    // End of input: let a pending turn land before exiting
    drop(handle);
    runtime_task.await?;
    printer.await?;

    Ok(())
}

/// Print each new message once, plus a marker when a turn starts
async fn print_transcript(mut snapshots: watch::Receiver<SessionSnapshot>) {
    let mut printed = 0;
    let mut was_busy = false;

    loop {
        {
            let snapshot = snapshots.borrow_and_update();
            for message in snapshot.messages.iter().skip(printed) {
                println!("{}", transcript_line(message));
            }
            printed = snapshot.messages.len();

            if snapshot.busy && !was_busy {
                println!("  ... assistant is typing");
            }
            was_busy = snapshot.busy;
        }

        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

fn transcript_line(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Bot => "assistant",
    };
    let at = message.timestamp.with_timezone(&Local).format("%H:%M");
    format!("[{at}] {who}: {}", message.text)
}
