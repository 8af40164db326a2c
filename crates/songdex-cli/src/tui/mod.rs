use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use open::that as open_link;
use ratatui::prelude::*;
use songdex_core::{IndexedSong, SongRecord};
use songdex_worker::{CatalogResult, Config, ResponseStream, SearchWorker, WorkerError};
use tokio::sync::oneshot;

use crate::session::{SearchSession, SessionEvent};
use crate::view::{self, ResultsView};

pub mod song_table;

/// How long to wait for a key before servicing the worker again.
const POLL_INTERVAL: Duration = Duration::from_millis(30);

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// The search input changed; debounce and send it.
    InputChanged(String),
    /// Open the link for the selected song code.
    Open(String),
    /// Copy the selected song's code.
    Copy(String),
}

/// Screen state for the search TUI.
#[derive(Debug)]
pub struct App {
    pub input: String,
    /// Typing is disabled until the catalog is indexed, and for good after
    /// a fatal error.
    pub input_enabled: bool,
    pub status: String,
    pub status_is_error: bool,
    pub results: Option<ResultsView>,
    pub selected: usize,
    pub offset: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            input_enabled: false,
            status: view::LOADING.to_string(),
            status_is_error: false,
            results: None,
            selected: 0,
            offset: 0,
        }
    }

    fn rows(&self) -> &[IndexedSong] {
        match &self.results {
            Some(results) => results.rows(),
            None => &[],
        }
    }

    pub fn selected_song(&self) -> Option<&IndexedSong> {
        self.rows().get(self.selected)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    /// Disable searching for the rest of the session.
    pub fn fail(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = true;
        self.input_enabled = false;
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Ready { total_songs } => {
                self.input_enabled = true;
                self.set_status(view::ready_line(total_songs));
            }
            SessionEvent::Results(results) => {
                self.set_status(results.status_line());
                self.results = Some(results);
                self.selected = 0;
                self.offset = 0;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Char('y') if ctrl => self.copy_selected(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Down => {
                self.move_selection(1);
                Action::None
            }
            KeyCode::Up => {
                self.move_selection(-1);
                Action::None
            }
            KeyCode::PageDown => {
                self.move_selection(song_table::PAGE_SIZE);
                Action::None
            }
            KeyCode::PageUp => {
                self.move_selection(-song_table::PAGE_SIZE);
                Action::None
            }
            KeyCode::Char(c) if self.input_enabled && !ctrl => {
                self.input.push(c);
                Action::InputChanged(self.input.clone())
            }
            KeyCode::Backspace if self.input_enabled => {
                if self.input.pop().is_some() {
                    Action::InputChanged(self.input.clone())
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    fn selected_code(&self) -> Option<String> {
        self.selected_song()
            .filter(|song| song.has_song_code())
            .map(|song| song.song_code().to_string())
    }

    fn open_selected(&mut self) -> Action {
        match self.selected_code() {
            Some(code) => Action::Open(code),
            None => Action::None,
        }
    }

    fn copy_selected(&mut self) -> Action {
        match self.selected_code() {
            Some(code) => Action::Copy(code),
            None => Action::None,
        }
    }

    /// Keep the selection within the visible window of `height` rows.
    pub fn scroll_into_view(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected + 1 - height;
        }
    }
}

/// Put text on the terminal clipboard with an OSC 52 escape sequence.
fn copy_to_clipboard(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
    stdout.flush()
}

/// Everything the search screen needs, started before the terminal is
/// taken over.
#[derive(Debug)]
pub struct SearchResources {
    /// `None` when the worker could not be started.
    pub worker: Option<(SearchWorker, ResponseStream)>,
    pub catalog: oneshot::Receiver<CatalogResult<Vec<SongRecord>>>,
}

/// Run the search TUI.
///
/// Sets up the terminal, runs the main event loop, and restores the terminal
/// on exit (including on error).
pub fn run_tui(config: &Config, resources: SearchResources) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, config, resources);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    resources: SearchResources,
) -> Result<()> {
    let mut app = App::new();
    let SearchResources {
        worker,
        catalog: mut pending_catalog,
    } = resources;

    let (mut session, mut responses) = match worker {
        Some((worker, responses)) => (
            Some(SearchSession::new(worker, config.display_cap, config.debounce())),
            Some(responses),
        ),
        None => {
            app.fail(view::WORKER_FAILED);
            (None, None)
        }
    };
    let mut catalog_done = session.is_none();

    loop {
        terminal.draw(|frame| song_table::render(frame, &mut app))?;

        if let Some(active) = session.as_mut() {
            if let Err(e) = service_worker(
                &mut app,
                active,
                responses.as_mut(),
                &mut pending_catalog,
                &mut catalog_done,
            ) {
                log::error!("Search worker error: {}", e);
                app.fail(view::WORKER_FAILED);
                session = None;
            }
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key) {
                    Action::Quit => return Ok(()),
                    Action::InputChanged(term) => {
                        if let Some(active) = session.as_mut() {
                            active.input_changed(term, Instant::now());
                        }
                    }
                    Action::Open(code) => {
                        let url = config.song_link(&code);
                        match open_link(&url) {
                            Ok(()) => app.set_status(format!("Opened {url}")),
                            Err(err) => app.set_status(format!("Failed to open link: {err}")),
                        }
                    }
                    Action::Copy(code) => match copy_to_clipboard(&code) {
                        Ok(()) => app.set_status("SongCode Copied!"),
                        Err(err) => app.set_status(format!("Failed to copy SongCode: {err}")),
                    },
                    Action::None => {}
                }
            }
        }
    }
}

/// Deliver the catalog once fetched, drain responses, and flush debounced
/// input.
fn service_worker(
    app: &mut App,
    session: &mut SearchSession,
    responses: Option<&mut ResponseStream>,
    pending_catalog: &mut oneshot::Receiver<CatalogResult<Vec<SongRecord>>>,
    catalog_done: &mut bool,
) -> Result<(), WorkerError> {
    if !*catalog_done {
        match pending_catalog.try_recv() {
            Ok(Ok(records)) => {
                *catalog_done = true;
                session.load(records)?;
            }
            Ok(Err(err)) => {
                *catalog_done = true;
                log::error!("Could not load song catalog: {}", err);
                app.fail(format!("{} ({err})", view::CATALOG_FAILED));
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                *catalog_done = true;
                app.fail(view::CATALOG_FAILED);
            }
        }
    }

    if let Some(responses) = responses {
        while let Some(response) = responses.try_recv()? {
            if let Some(event) = session.on_response(response)? {
                app.apply(event);
            }
        }
    }

    if session.tick(Instant::now())? && session.latest_term().is_some_and(|t| !t.trim().is_empty())
    {
        app.set_status(view::SEARCHING);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn ready_app() -> App {
        let songs = [("Mango Song", "A3"), ("Apple Song", ""), ("Zebra Song", "A1")]
            .iter()
            .enumerate()
            .map(|(i, (title, code))| {
                let record = SongRecord::new()
                    .with_title_and_artist(*title)
                    .with_song_code(*code);
                IndexedSong::from_record(&record, i)
            })
            .collect();
        let mut app = App::new();
        app.apply(SessionEvent::Ready { total_songs: 3 });
        app.apply(SessionEvent::Results(ResultsView::new("", songs, 450)));
        app
    }

    #[test]
    fn test_typing_disabled_until_ready() {
        let mut app = App::new();
        assert_eq!(app.status, view::LOADING);
        assert_eq!(app.handle_key(key(KeyCode::Char('a'))), Action::None);
        assert!(app.input.is_empty());

        app.apply(SessionEvent::Ready { total_songs: 3 });
        assert_eq!(app.status, "Ready. 3 songs loaded. Type to search.");
        assert_eq!(
            app.handle_key(key(KeyCode::Char('a'))),
            Action::InputChanged("a".to_string())
        );
    }

    #[test]
    fn test_backspace_edits_input() {
        let mut app = ready_app();
        app.handle_key(key(KeyCode::Char('z')));
        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(
            app.handle_key(key(KeyCode::Backspace)),
            Action::InputChanged("z".to_string())
        );
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.handle_key(key(KeyCode::Backspace)), Action::None);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = ready_app();
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected, 0);
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.selected, 2);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_open_and_copy_selected_song() {
        let mut app = ready_app();
        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Action::Open("A3".to_string())
        );
        assert_eq!(app.handle_key(ctrl('y')), Action::Copy("A3".to_string()));

        // The second row has no song code.
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
        assert_eq!(app.handle_key(ctrl('y')), Action::None);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = ready_app();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.handle_key(ctrl('c')), Action::Quit);
    }

    #[test]
    fn test_fail_disables_input() {
        let mut app = ready_app();
        app.fail(view::WORKER_FAILED);
        assert!(app.status_is_error);
        assert_eq!(app.handle_key(key(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_scroll_into_view() {
        let mut app = ready_app();
        app.selected = 2;
        app.scroll_into_view(2);
        assert_eq!(app.offset, 1);
        app.selected = 0;
        app.scroll_into_view(2);
        assert_eq!(app.offset, 0);
    }

    mod servicing {
        use super::*;
        use songdex_worker::CatalogError;

        struct Harness {
            app: App,
            session: SearchSession,
            responses: ResponseStream,
            catalog: oneshot::Receiver<CatalogResult<Vec<SongRecord>>>,
            catalog_done: bool,
        }

        impl Harness {
            fn new() -> (Self, oneshot::Sender<CatalogResult<Vec<SongRecord>>>) {
                let (worker, responses) = songdex_worker::spawn().unwrap();
                let (tx, catalog) = oneshot::channel();
                let harness = Self {
                    app: App::new(),
                    session: SearchSession::new(worker, 450, Duration::ZERO),
                    responses,
                    catalog,
                    catalog_done: false,
                };
                (harness, tx)
            }

            fn service(&mut self) {
                service_worker(
                    &mut self.app,
                    &mut self.session,
                    Some(&mut self.responses),
                    &mut self.catalog,
                    &mut self.catalog_done,
                )
                .unwrap();
            }

            /// Service the worker until `done` holds, letting the worker task run
            /// in between.
            async fn service_until(&mut self, done: impl Fn(&App) -> bool) {
                for _ in 0..200 {
                    self.service();
                    if done(&self.app) {
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                panic!("screen never reached the expected state: {:?}", self.app);
            }
        }

        fn catalog() -> Vec<SongRecord> {
            ["Zebra Song", "Apple Song", "Mango Song"]
                .iter()
                .map(|title| SongRecord::new().with_title_and_artist(*title))
                .collect()
        }

        #[tokio::test]
        async fn test_catalog_error_disables_input() {
            let (mut harness, tx) = Harness::new();
            harness.service();
            assert_eq!(harness.app.status, view::LOADING);

            tx.send(Err(CatalogError::Status {
                status: 500,
                url: "https://example.com/KaraokeList_Auto.json".to_string(),
            }))
            .unwrap();
            harness.service();

            assert!(harness.catalog_done);
            assert!(harness.app.status_is_error);
            assert!(!harness.app.input_enabled);
            assert!(harness.app.status.starts_with(view::CATALOG_FAILED));
            assert!(harness.app.status.contains("status: 500"));
        }

        #[tokio::test]
        async fn test_abandoned_catalog_fetch_disables_input() {
            let (mut harness, tx) = Harness::new();
            drop(tx);
            harness.service();

            assert!(harness.catalog_done);
            assert!(harness.app.status_is_error);
            assert!(!harness.app.input_enabled);
            assert_eq!(harness.app.status, view::CATALOG_FAILED);
        }

        #[tokio::test]
        async fn test_catalog_reaches_ready_then_results() {
            let (mut harness, tx) = Harness::new();
            tx.send(Ok(catalog())).unwrap();

            harness.service_until(|app| app.input_enabled).await;
            assert!(!harness.app.status_is_error);

            harness.service_until(|app| app.results.is_some()).await;
            let results = harness.app.results.as_ref().unwrap();
            assert_eq!(results.total_matches(), 3);
            assert_eq!(harness.app.status, "Showing 3 matching songs");
        }

        #[tokio::test]
        async fn test_debounced_input_is_searched() {
            let (mut harness, tx) = Harness::new();
            tx.send(Ok(catalog())).unwrap();
            harness.service_until(|app| app.results.is_some()).await;

            harness.session.input_changed("zeb", Instant::now());
            harness.service();
            assert_eq!(harness.app.status, view::SEARCHING);

            harness
                .service_until(|app| app.results.as_ref().is_some_and(|r| r.term() == "zeb"))
                .await;
            let results = harness.app.results.as_ref().unwrap();
            assert_eq!(results.rows()[0].title_and_artist(), "Zebra Song");
            assert_eq!(harness.app.status, "Showing 1 matching songs");
        }

        #[tokio::test]
        async fn test_stopped_worker_is_an_error() {
            let (mut harness, tx) = Harness::new();
            tx.send(Ok(catalog())).unwrap();
            harness.service_until(|app| app.results.is_some()).await;

            // A stream whose worker has already stopped.
            let (worker, stopped) = songdex_worker::spawn().unwrap();
            worker.shutdown().await.unwrap();
            harness.responses = stopped;

            let result = service_worker(
                &mut harness.app,
                &mut harness.session,
                Some(&mut harness.responses),
                &mut harness.catalog,
                &mut harness.catalog_done,
            );
            assert!(matches!(result, Err(WorkerError::Disconnected)));
        }
    }
}
