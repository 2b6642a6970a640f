#[tokio::main]
async fn main() -> wikidump_dl::Result<()> {
    wikidump_dl::cli::run().await
}
