use std::{path::PathBuf, process, sync::Arc};

use clap::Parser;
use log::info;
use machine_learning::Predictor;
use tokio::signal;

use bot::{
    BotConfig, BotErr, Handler,
    telegram::{Runner, TelegramClient},
};

/// Serves body-composition predictions over a Telegram bot.
#[derive(Parser, Debug)]
#[command(name = "bot", version)]
struct Args {
    /// Path to the model artifact written by train_model.
    #[arg(long)]
    model: PathBuf,
}

async fn run(args: Args) -> Result<(), BotErr> {
    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;

    let predictor = Predictor::load(&args.model)?;
    info!(
        "loaded model from {} ({} features, {} targets)",
        args.model.display(),
        predictor.features().len(),
        predictor.targets().len()
    );

    let client = Arc::new(TelegramClient::new(&config)?);
    let handler = Arc::new(Handler::new(predictor));
    let runner = Runner::new(client, handler);

    tokio::select! {
        _ = runner.run() => {}
        ret = signal::ctrl_c() => {
            ret?;
            info!("received ctrl-c, shutting down");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
