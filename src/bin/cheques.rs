#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cheques::cli::run().await
}
