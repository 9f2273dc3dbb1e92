use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Guest list, one name per line. Blank lines and `#` comments are skipped.
    path: PathBuf,

    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Drop the existing list before loading.
    #[arg(long)]
    replace: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    seed::load_guests(&args.path, &args.redis_url, args.replace).await
}
