#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = thesisdesk::run().await {
        eprintln!("thesisdesk fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
