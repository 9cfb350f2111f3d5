use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatbot_client::{
    app,
    config::ClientConfig,
    services::{
        backend::HttpBackend, dispatcher::Dispatcher, renderer::TerminalRenderer,
        session::resolve_session,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chatbot_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = HttpBackend::new(config.endpoint.clone(), config.request_timeout)
        .context("failed to build HTTP client")?;
    let session_id = resolve_session(&config.session, &backend).await;
    info!(
        endpoint = %config.endpoint,
        session_id = %session_id,
        reply_order = ?config.reply_order,
        "chat client ready"
    );

    println!(
        "💬 Chatting with {} (type {} to exit)",
        config.endpoint,
        app::QUIT_COMMAND
    );

    let (dispatcher, completions) =
        Dispatcher::new(Arc::new(backend), session_id, config.reply_order);
    let mut renderer = TerminalRenderer::stdout();
    let lines = app::spawn_line_reader(std::io::BufReader::new(std::io::stdin()));

    tokio::select! {
        result = app::run(dispatcher, completions, lines, &mut renderer) => {
            result.context("chat loop failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }

    Ok(())
}
