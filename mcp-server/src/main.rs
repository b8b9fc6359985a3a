//! Folio Feed MCP Server
//!
//! Exposes the blog feed over MCP on stdio. Tools cover:
//! - Browsing the paginated feed
//! - Searching, filtering by category and sorting
//! - Bookmarks and reading progress
//! - Reading posts and reacting to them

mod server;
mod session;

use anyhow::Result;
use rmcp::ServiceExt;
use server::FolioFeedServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is used for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,folio_feed=debug,folio_feed_mcp=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Folio feed MCP server");

    let server = FolioFeedServer::from_env()?;

    // Serve over stdio - pass as tuple (stdin, stdout)
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.clone().serve(transport).await?;

    // Wait for shutdown
    service.waiting().await?;

    server.shutdown();

    Ok(())
}
