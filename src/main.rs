use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = pokeproxy::cli::Cli::parse();
    if let Err(e) = pokeproxy::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
