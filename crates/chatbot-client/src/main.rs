//! chatbot binary
//!
//! - Load strict YAML config (`chatbot.yaml` or the first argument)
//! - Negotiate the chat session over HTTP
//! - Run the polling loop until the node times out or Ctrl-C

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use chatbot_client::session::{Bootstrapper, HttpBootstrapper};
use chatbot_client::transport::HttpTransport;
use chatbot_client::{config, ChatClient};
use chatbot_core::Result;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "chatbot.yaml".into());
    if let Err(e) = run(&path).await {
        tracing::error!(code = e.code().as_str(), error = %e, "chatbot exited");
        std::process::exit(1);
    }
}

async fn run(path: &str) -> Result<()> {
    let cfg = config::load_from_file(path)?;
    let session = HttpBootstrapper::new().bootstrap(&cfg).await?;
    let transport =
        HttpTransport::new(&cfg.transport, &session.poll_base, session.cookie.as_deref())?;

    let client = ChatClient::new(cfg, session, Arc::new(transport));

    let quitter = client.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; logging out");
            if let Err(e) = quitter.quit().await {
                tracing::warn!(error = %e, "quit failed");
            }
        }
    });

    client.run().await
}
