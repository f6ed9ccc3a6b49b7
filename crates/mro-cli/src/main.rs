use clap::Parser;
use mro_cli::{init_tracing, run, RunArgs};

#[tokio::main]
async fn main() {
    init_tracing();

    let args = RunArgs::parse();
    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "run failed");
        for cause in err.chain().skip(1) {
            tracing::error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}
