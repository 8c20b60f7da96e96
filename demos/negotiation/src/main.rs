use std::sync::Arc;
use std::time::Duration;

use colonnade::prelude::*;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

const NEGOTIATION_PANEL: &str = "negotiationDialog";

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Panels the client currently shows.
type Panels = Arc<Mutex<Vec<String>>>;

/// A client that logs instead of drawing.
struct ConsoleClient {
    panels: Panels,
}

impl ClientCapabilities for ConsoleClient {
    fn close_panel(&mut self, panel: &str) -> Result<(), HandlerError> {
        let mut panels = self.panels.lock();
        let index = panels
            .iter()
            .position(|p| p == panel)
            .ok_or_else(|| HandlerError::unresolved("panel", panel))?;
        panels.remove(index);
        tracing::info!(panel, "panel closed by server");
        Ok(())
    }

    fn display_chat(
        &mut self,
        sender: &str,
        message: &str,
        private: bool,
    ) -> Result<(), HandlerError> {
        tracing::info!(sender, private, "{message}");
        Ok(())
    }

    fn set_current_player(&mut self, player: &str) -> Result<(), HandlerError> {
        tracing::info!(player, "turn changed");
        Ok(())
    }

    fn game_ended(&mut self, winner: &str, high_score: bool) -> Result<(), HandlerError> {
        tracing::info!(winner, high_score, "game over");
        Ok(())
    }
}

/// An AI that accepts every proposal on its turn.
struct AgreeableAi {
    player: String,
}

impl AiCapabilities for AgreeableAi {
    fn player(&self) -> &str {
        &self.player
    }

    fn begin_turn(&mut self, outbox: &Outbox) -> Result<(), HandlerError> {
        outbox.push(ChatMessage::new(&self.player, "We accept the treaty."));
        Ok(())
    }

    fn game_ended(&mut self, _winner: &str) -> Result<(), HandlerError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Server and client flows
// ---------------------------------------------------------------------------

/// Offers the human a treaty, then closes the dialog when they never answer.
async fn offer_treaty<C: Connection>(conn: C, config: LinkConfig) -> Result<(), ColonnadeError> {
    let server = Sender::new(Arc::new(conn), Outbox::new(), config.clone());

    server.push(SetCurrentPlayerMessage::new("Dutch"));
    server.push(ChatMessage::new("Stuyvesant", "The Dutch propose a trade treaty.").private());
    let deadline = ResponseDeadline::arm(
        server.outbox().clone(),
        NEGOTIATION_PANEL,
        config.response_deadline,
    );
    server.flush().await?;

    tokio::time::sleep(config.response_deadline + Duration::from_millis(50)).await;
    if !deadline.answered() {
        tracing::info!(panel = NEGOTIATION_PANEL, "offer expired");
    }
    server.flush().await?;

    server.push(GameEndedMessage::new("English"));
    server.flush().await?;
    server.close().await
}

/// Accepts a single human player and runs the treaty offer against them.
async fn serve_one(
    mut transport: WebSocketTransport,
    config: LinkConfig,
) -> Result<(), ColonnadeError> {
    let conn = transport.accept().await?;
    tracing::info!(conn_id = %conn.id(), "player connected");
    offer_treaty(conn, config).await
}

/// Receives until the server hangs up and returns the tags seen.
async fn run_client<C: Connection>(
    conn: C,
    panels: Panels,
    registry: Arc<Registry>,
    config: LinkConfig,
) -> Result<Vec<&'static str>, ColonnadeError> {
    let endpoint = Endpoint::client(ConsoleClient { panels });
    let mut link = Link::open(conn, "server", endpoint, registry, config);
    let mut seen = Vec::new();

    loop {
        match link.receive().await {
            Ok(Some(delivery)) => seen.push(delivery.message.tag()),
            Ok(None) => break,
            Err(e) if e.is_link_fatal() => return Err(e),
            Err(e) => tracing::warn!(error = %e, "skipped bad message"),
        }
    }
    Ok(seen)
}

/// Gives an in-process AI its turn and returns its raw reply frame.
async fn ai_turn(registry: Arc<Registry>, config: LinkConfig) -> Result<Vec<u8>, ColonnadeError> {
    let (server_end, ai_end) = MemoryConnection::pair();
    let server_end = Arc::new(server_end);
    let server = Sender::new(Arc::clone(&server_end), Outbox::new(), config.clone());
    let endpoint = Endpoint::ai(AgreeableAi {
        player: "Dutch".into(),
    });
    let mut ai = Link::open(ai_end, "server", endpoint, registry, config);

    server.push(SetCurrentPlayerMessage::new("Dutch"));
    server.flush().await?;
    ai.receive().await?;
    ai.flush().await?;

    let reply = server_end.recv().await?.unwrap_or_default();
    ai.close().await?;
    Ok(reply)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = LinkConfig {
        response_deadline: Duration::from_millis(500),
        ..LinkConfig::default()
    };
    let registry = Arc::new(Registry::standard());

    let transport = WebSocketTransport::bind("127.0.0.1:0").await?;
    let addr = transport.local_addr()?;
    tracing::info!(%addr, "server listening");

    let server = tokio::spawn(serve_one(transport, config.clone()));

    let panels = Panels::default();
    panels.lock().push(NEGOTIATION_PANEL.to_string());
    let conn = WebSocketConnection::connect(&format!("ws://{addr}")).await?;
    let seen = run_client(conn, Arc::clone(&panels), Arc::clone(&registry), config.clone()).await?;
    server.await??;
    tracing::info!(?seen, open_panels = ?*panels.lock(), "client finished");

    let reply = ai_turn(registry, config).await?;
    tracing::info!(reply = %String::from_utf8_lossy(&reply), "AI answered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> LinkConfig {
        LinkConfig {
            response_deadline: Duration::from_millis(20),
            ..LinkConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unanswered_offer_closes_dialog() {
        let (server_end, client_end) = MemoryConnection::pair();
        let panels = Panels::default();
        panels.lock().push(NEGOTIATION_PANEL.to_string());

        let server = tokio::spawn(offer_treaty(server_end, quick()));
        let seen = run_client(
            client_end,
            Arc::clone(&panels),
            Arc::new(Registry::standard()),
            quick(),
        )
        .await
        .unwrap();
        server.await.unwrap().unwrap();

        assert_eq!(seen, ["setCurrentPlayer", "chat", "close", "gameEnded"]);
        assert!(panels.lock().is_empty());
    }

    #[tokio::test]
    async fn test_ai_answers_on_its_turn() {
        let reply = ai_turn(Arc::new(Registry::standard()), quick()).await.unwrap();
        assert_eq!(reply, br#"{"chat":{"message":"We accept the treaty.","sender":"Dutch"}}"#);
    }
}
