#[tokio::main]
async fn main() -> anyhow::Result<()> {
    feed_server::run().await
}
