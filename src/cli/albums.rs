use tabled::Table;

use crate::{
    cli::{AppContext, fail, spinner},
    types::{AlbumTableRow, TrackTableRow},
    utils, warning,
};

pub async fn list_albums(ctx: &AppContext, artist_id: &str) {
    let pb = spinner("Fetching albums...");
    let albums = match ctx.session.artist_albums(artist_id).await {
        Ok(albums) => albums,
        Err(e) => {
            pb.finish_and_clear();
            fail("Fetching albums", e)
        }
    };
    pb.finish_and_clear();

    let table_rows: Vec<AlbumTableRow> = albums
        .into_iter()
        .map(|a| AlbumTableRow {
            id: a.id,
            name: a.name,
            released: a.release_date,
            tracks: a.total_tracks,
        })
        .collect();

    println!("{}", Table::new(table_rows));
}

pub async fn list_tracks(ctx: &AppContext, album_id: &str) {
    let pb = spinner("Fetching tracks...");
    let tracks = match ctx.session.album_tracks(album_id).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            fail("Fetching tracks", e)
        }
    };
    pb.finish_and_clear();

    if tracks.is_empty() {
        warning!("Album {} has no playable tracks.", album_id);
        return;
    }

    let table_rows: Vec<TrackTableRow> = tracks
        .iter()
        .map(|t| TrackTableRow {
            no: format!("{}.{:02}", t.disc_number, t.track_number),
            name: t.name.clone(),
            duration: utils::duration_to_string(t.duration()),
        })
        .collect();

    println!("{}", Table::new(table_rows));
}
