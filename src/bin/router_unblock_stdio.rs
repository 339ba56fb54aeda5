#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use dotenv::dotenv;
use poem_mcpserver::McpServer;
use router_unblock::unblock::RouterUnblockTools;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // stdout carries the MCP protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .init();

    poem_mcpserver::stdio::stdio(McpServer::new().tools(RouterUnblockTools::from_env())).await?;
    Ok(())
}
