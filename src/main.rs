use okecho::{EchoServer, DEFAULT_ADDR};
use std::env;

fn main() -> anyhow::Result<()> {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .init();

    let args = env::args().map(String::from).collect::<Vec<_>>();
    let addr = args
        .get(1)
        .map(String::as_str)
        .unwrap_or(DEFAULT_ADDR)
        .parse()
        .expect("<ADDR> parse failed");

    let mut server = EchoServer::bind(addr)?;
    server.serve()?;

    Ok(())
}
