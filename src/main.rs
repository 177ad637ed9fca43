use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use namethatsong::{
    cli::{self, AppContext},
    config, error, logging, utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Search artists by name
    Search(SearchOptions),

    /// List the albums of an artist
    Albums(AlbumsOptions),

    /// List the tracks of an album
    Tracks(TracksOptions),

    /// Play a game with the picked albums
    Play(PlayOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Artist name to look for
    name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct AlbumsOptions {
    /// Spotify id of the artist
    artist_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Spotify id of the album, or top-tracks:<artist-id>
    album_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayOptions {
    /// Album to play as <artist-id>:<album-id>; can be repeated
    #[clap(
        long = "pick",
        required = true,
        value_parser = utils::parse_pick,
        action = ArgAction::Append,
        num_args = 1
    )]
    picks: Vec<(String, String)>,

    /// Move on to the next song as soon as a title is guessed
    #[clap(long)]
    auto_advance: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = logging::init_logging() {
        error!("Cannot initialize logging. Err: {}", e);
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let ctx = match AppContext::new(config).await {
        Ok(ctx) => ctx,
        Err(e) => error!("Cannot set up the game. Err: {}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(&ctx).await,
        Command::Search(opt) => cli::search(&ctx, &opt.name).await,
        Command::Albums(opt) => cli::list_albums(&ctx, &opt.artist_id).await,
        Command::Tracks(opt) => cli::list_tracks(&ctx, &opt.album_id).await,
        Command::Play(opt) => cli::play(&ctx, &opt.picks, opt.auto_advance).await,
        Command::Completions(_) => {}
    }
}
