use clap::Parser;
use yanta_tree::config::{Config, Opts};
use yanta_tree::{log, server};

// Allow the server to return its version with a --version flag
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let opts: Opts = Opts::parse();
    if opts.version {
        println!("{}", VERSION);
        return;
    }
    let config = match Config::from_opts(opts) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Unable to prepare the note storage: {}", e);
            std::process::exit(1);
        }
    };
    let _guard = match log::init_logging(&config.log_dir, config.debug) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Unable to start logging: {}", e);
            std::process::exit(1);
        }
    };

    let srv = server::get_server(&config);
    if let Err(e) = srv.start().await {
        tracing::error!("Server failed: {}", e);
        eprintln!("Server failed: {}", e);
        drop(srv);
        std::process::exit(1);
    }
}
