use anyhow::Context;
use stagewise_core::config::Config;
use std::path::Path;

/// Serve the HTTP API. `port` comes from `--port` or `PORT`; the config file
/// supplies it otherwise.
pub fn run(root: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load_or_default(root)?;
    let host = config.server.host.clone();
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("failed to bind {host}:{port}"))?;
        let actual_port = listener.local_addr()?.port();

        println!("stagewise API → http://localhost:{actual_port}/api");

        tokio::select! {
            res = stagewise_server::serve_on(&root_buf, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
