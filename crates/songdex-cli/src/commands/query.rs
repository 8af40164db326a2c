use anyhow::{Context, Result};
use songdex_worker::Config;

use crate::session::{SearchSession, SessionEvent};
use crate::view::{self, ResultsView};

/// Run a single search and print the results.
pub async fn run_query(config: &Config, term: &str, json: bool) -> Result<()> {
    let source = config.catalog_source();
    let records = source
        .fetch(config.fetch_retries)
        .await
        .with_context(|| format!("{} ({})", view::CATALOG_FAILED, source))?;

    let (worker, mut responses) = songdex_worker::spawn().context(view::WORKER_FAILED)?;
    let mut session = SearchSession::new(worker, config.display_cap, config.debounce())
        .with_initial_term(term);
    session.load(records)?;

    let results = loop {
        let response = responses.recv().await?;
        match session.on_response(response)? {
            Some(SessionEvent::Ready { total_songs }) => {
                log::info!("{}", view::ready_line(total_songs));
            }
            Some(SessionEvent::Results(results)) => break results,
            None => {}
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(results.rows())?);
    } else {
        print_table(&results);
    }
    Ok(())
}

fn print_table(results: &ResultsView) {
    let title_width = results
        .rows()
        .iter()
        .map(|song| song.title_and_artist().chars().count())
        .max()
        .unwrap_or(0)
        .max("Title & Artist".len());

    println!("{:<8}  {:<title_width$}  Song Code", "Date", "Title & Artist");
    for song in results.rows() {
        println!(
            "{:<8}  {:<title_width$}  {}",
            song.date_string(),
            song.title_and_artist(),
            song.song_code()
        );
    }
    println!("\n{}", results.status_line());
}
