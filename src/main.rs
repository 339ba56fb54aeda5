#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use dotenv::dotenv;
use poem::{EndpointExt, Route, Server, listener::TcpListener, middleware::Tracing};
use poem_mcpserver::{McpServer, streamable_http};
use router_unblock::unblock::RouterUnblockTools;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .init();

    let mcp_port: u16 = std::env::var("MCP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let mcp_addr = format!("0.0.0.0:{}", mcp_port);
    info!("Starting MCP server on {}", mcp_addr);

    // One tool set shared by every MCP session, so the credential store and
    // the session limit are process-wide
    let tools = RouterUnblockTools::from_env();

    let app = Route::new()
        .at(
            "/",
            streamable_http::endpoint(move |_| McpServer::new().tools(tools.clone())),
        )
        .with(Tracing);

    info!("Router unblock MCP server is ready");
    info!("Use router_update_config to configure the router, then router_test_connection");

    Server::new(TcpListener::bind(mcp_addr))
        .name("Router Unblock MCP Server")
        .run(app)
        .await?;

    Ok(())
}
