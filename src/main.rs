use repotree::{cli, logging};

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(e) = cli::main().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
