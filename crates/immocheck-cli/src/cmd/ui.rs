use anyhow::Context;
use immocheck_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    // Fail fast with the init hint before binding anything.
    let config = Config::load(root).context("failed to load config")?;

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();

        println!(
            "ImmoCheck form for '{}' → http://localhost:{actual_port}",
            config.project
        );

        tokio::select! {
            res = immocheck_server::serve_on(&root_buf, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
