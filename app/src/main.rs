#[tokio::main]
async fn main() -> anyhow::Result<()> {
    listing_harvest::run().await
}
