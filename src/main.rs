//! Terminal front end for the chat exchange engine
//!
//! Reads one message per line from stdin and prints whatever the session
//! produces. `/reset`, `/status` and `/quit` are handled locally.

use chat_exchange::{ChatConfig, Session, SubmitOutcome};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stderr keeps it out of the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_exchange=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ChatConfig::from_env()?;
    let session = Session::from_config(&config)?;

    if config.is_backend_configured() {
        tracing::info!(protocol = %session.protocol(), "Live backend configured");
    } else {
        tracing::warn!(
            "No backend endpoint configured, replying in mock mode. \
             Set CHAT_API_URL, CHAT_WORKER_URL or CHAT_GRAPHQL_URL."
        );
    }

    let mut stdout = tokio::io::stdout();
    let snapshot = session.snapshot();
    for message in snapshot.conversation.messages() {
        print_message(&mut stdout, message.role().as_str(), message.content()).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/reset" => {
                if !session.reset() {
                    print_message(&mut stdout, "status", "busy, try again shortly").await?;
                    continue;
                }
                let snapshot = session.snapshot();
                for message in snapshot.conversation.messages() {
                    print_message(&mut stdout, message.role().as_str(), message.content())
                        .await?;
                }
            }
            "/status" => {
                let mode = if session.is_backend_configured() {
                    "live"
                } else {
                    "mock"
                };
                let status = format!("{mode} ({})", session.protocol());
                print_message(&mut stdout, "status", &status).await?;
            }
            _ => match session.submit(&line).await {
                SubmitOutcome::Replied(reply) => {
                    print_message(&mut stdout, "assistant", &reply).await?;
                }
                SubmitOutcome::Failed(error) => {
                    print_message(&mut stdout, "error", &error).await?;
                }
                SubmitOutcome::Ignored => {}
            },
        }
    }

    Ok(())
}

async fn print_message(
    out: &mut tokio::io::Stdout,
    label: &str,
    content: &str,
) -> std::io::Result<()> {
    out.write_all(format!("[{label}]\n{content}\n\n").as_bytes())
        .await?;
    out.flush().await
}
