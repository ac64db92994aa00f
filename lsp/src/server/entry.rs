use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::{cli::try_cli, state::RfxLanguageServer};

pub async fn run() {
    if let Some(output) = try_cli().unwrap_or_else(|e| {
        eprintln!("rfx-lsp error: {e:#}");
        std::process::exit(2);
    }) {
        println!("{}", output);
        return;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(RfxLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
