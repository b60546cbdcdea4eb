#[tokio::main]
async fn main() {
    if let Err(e) = caselog_lib::run().await {
        eprintln!("caselog: {e}");
        std::process::exit(1);
    }
}
