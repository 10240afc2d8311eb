//! The `ntx` binary.

#[tokio::main]
async fn main() {
    let code = ntx_cli::run(std::env::args().collect()).await;
    std::process::exit(code);
}
