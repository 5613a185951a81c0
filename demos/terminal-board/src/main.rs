use boardcast::prelude::*;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use self::args::Args;
use self::input::Command;
use self::render::TerminalSurface;

mod args;
mod input;
mod render;

type Error = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let builder = BoardClient::builder()
        .config(args.client_config())
        .launch(args.launch());

    match &args.assets {
        Some(dir) => {
            let store = DirAssetStore::new(dir);
            tracing::info!(root = %store.root().display(), "reading piece images from disk");
            play(builder, store).await
        }
        None => {
            let store = builder.http_assets()?;
            tracing::info!(base = %store.base(), "fetching piece images over http");
            play(builder, store).await
        }
    }
}

async fn play<A: AssetStore>(builder: BoardClientBuilder, assets: A) -> Result<(), Error> {
    let (prompter, mut prompts) = ChannelPrompter::new();
    let client = builder
        .connect(TerminalSurface::stdout(), assets, prompter)
        .await?;

    let reporter = client.reporter();
    let mut game = tokio::spawn(client.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut question: Option<PromptRequest> = None;

    loop {
        tokio::select! {
            finished = &mut game => {
                let stats = finished??;
                tracing::info!(applied = stats.completed, dropped = stats.failed, "game over");
                break;
            }
            Some(request) = prompts.recv() => {
                println!("{} (type {} to dismiss)", request.prompt, input::CANCEL);
                question = Some(request);
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    if let Some(request) = question.take() {
                        request.dismiss();
                    }
                    continue;
                };

                if let Some(request) = question.take() {
                    match input::answer(&line) {
                        Some(answer) => request.answer(answer),
                        None => request.dismiss(),
                    }
                    continue;
                }

                match input::parse(&line) {
                    Ok(Command::Click(at)) => match reporter.click(at) {
                        Ok(()) => {}
                        Err(BoardcastError::Geometry(e)) => eprintln!("{e}"),
                        Err(e) => return Err(e.into()),
                    },
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", input::HELP),
                    Err(message) => eprintln!("{message}"),
                }
            }
        }
    }

    Ok(())
}
