#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    toolhub::server::run().await
}
