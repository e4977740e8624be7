mod platform;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    platform::run_host().await
}
