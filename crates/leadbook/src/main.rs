use clap::Parser;
use leadbook::{cli::Cli, config};

#[tokio::main]
async fn main() -> leadbook::Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "leadbook={level},engine={level}",
            level = settings.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = leadbook::cli::run(cli.command, &settings).await {
        tracing::debug!("{err:?}");
        eprintln!("error: {err}");
        if err.needs_sign_in() {
            eprintln!("Run `leadbook signin --email <email>` first.");
        }
        std::process::exit(1);
    }
    Ok(())
}
