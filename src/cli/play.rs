use std::{collections::BTreeSet, time::Duration};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::{AppContext, fail, spinner},
    error,
    error::GameError,
    info, success,
    types::SessionSnapshot,
    utils, warning,
};

enum Flow {
    Continue,
    Quit,
}

/// Plays a game over the picked `(artist id, album id)` pairs.
///
/// Lines typed on stdin are guesses, except for the commands `/skip`,
/// `/pause`, `/resume` and `/quit`. When a song ends its title is revealed
/// and the next one starts.
pub async fn play(ctx: &AppContext, picks: &[(String, String)], auto_advance: bool) {
    let picks: BTreeSet<&(String, String)> = picks.iter().collect();
    if picks.is_empty() {
        error!("Pick at least one album with --pick <artist-id>:<album-id>.");
    }

    for (artist_id, album_id) in picks {
        ctx.session
            .toggle_album_selection(album_id, artist_id)
            .await;
    }

    let pb = spinner("Preparing the game...");
    if let Err(e) = ctx.session.start_game().await {
        pb.finish_and_clear();
        fail("Starting the game", e);
    }
    pb.finish_and_clear();

    info!("Type your guesses. Commands: /skip, /pause, /resume, /quit");
    show_title(&ctx.session.snapshot().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut paused = false;

    loop {
        let flow = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_line(ctx, line.trim(), auto_advance, &mut paused).await,
                Ok(None) => Flow::Quit,
                Err(e) => {
                    warning!("Cannot read input: {}", e);
                    Flow::Quit
                }
            },
            _ = ticker.tick() => {
                let snapshot = ctx.session.snapshot().await;
                if !paused && snapshot.song_over {
                    reveal(&snapshot);
                    next_song(ctx).await
                } else {
                    Flow::Continue
                }
            }
        };

        if let Flow::Quit = flow {
            break;
        }
    }

    let snapshot = ctx.session.snapshot().await;
    if let Err(e) = ctx.session.clear_queue().await {
        warning!("Cannot pause playback: {}", e);
    }
    success!(
        "Final score: {}/{}",
        snapshot.score,
        snapshot.tracks_played
    );
}

async fn handle_line(ctx: &AppContext, line: &str, auto_advance: bool, paused: &mut bool) -> Flow {
    match line {
        "/quit" => Flow::Quit,
        "/skip" => {
            reveal(&ctx.session.snapshot().await);
            next_song(ctx).await
        }
        "/pause" => {
            match ctx.session.pause().await {
                Ok(()) => *paused = true,
                Err(e) => warning!("Cannot pause: {}", e),
            }
            Flow::Continue
        }
        "/resume" => {
            match ctx.session.resume().await {
                Ok(()) => *paused = false,
                Err(e) => warning!("Cannot resume: {}", e),
            }
            Flow::Continue
        }
        "" => {
            show_title(&ctx.session.snapshot().await);
            Flow::Continue
        }
        guess => match ctx.session.guess(guess).await {
            Ok(true) => {
                let snapshot = ctx.session.snapshot().await;
                success!("You got it! {}", snapshot.masked_title);
                if auto_advance {
                    next_song(ctx).await
                } else {
                    Flow::Continue
                }
            }
            Ok(false) => {
                show_title(&ctx.session.snapshot().await);
                Flow::Continue
            }
            Err(e) => {
                warning!("{}", e);
                Flow::Continue
            }
        },
    }
}

async fn next_song(ctx: &AppContext) -> Flow {
    match ctx.session.skip_song().await {
        Ok(()) => {
            show_title(&ctx.session.snapshot().await);
            Flow::Continue
        }
        Err(GameError::QueueExhausted) => {
            info!("No more songs in the queue.");
            Flow::Quit
        }
        Err(e) => {
            warning!("Cannot play the next song: {}", e);
            Flow::Quit
        }
    }
}

fn show_title(snapshot: &SessionSnapshot) {
    info!(
        "[{}/{}] {}  ({} / {})",
        snapshot.cursor + 1,
        snapshot.queue_len,
        snapshot.masked_title,
        utils::duration_to_string(snapshot.elapsed),
        utils::duration_to_string(snapshot.duration)
    );
}

fn reveal(snapshot: &SessionSnapshot) {
    if let Some(now_playing) = &snapshot.now_playing {
        info!(
            "It was \"{}\" by {} from {}",
            now_playing.track.name, now_playing.artist.name, now_playing.album.name
        );
    }
}
