use tabled::Table;

use crate::{
    cli::{AppContext, fail, spinner},
    types::ArtistTableRow,
    warning,
};

pub async fn search(ctx: &AppContext, name: &str) {
    let pb = spinner(format!("Searching artists named {name}..."));
    let artists = match ctx.session.search_artists(name).await {
        Ok(artists) => artists,
        Err(e) => {
            pb.finish_and_clear();
            fail("Artist search", e)
        }
    };
    pb.finish_and_clear();

    if artists.is_empty() {
        warning!("No artist found for '{}'.", name);
        return;
    }

    let table_rows: Vec<ArtistTableRow> = artists
        .into_iter()
        .map(|a| ArtistTableRow {
            id: a.id,
            name: a.name,
            popularity: a.popularity,
        })
        .collect();

    println!("{}", Table::new(table_rows));
}
