#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mediai_server::run().await
}
