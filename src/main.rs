#[tokio::main]
async fn main() -> anyhow::Result<()> {
    session_notifier::start_notifier().await
}
