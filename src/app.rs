//! App state and navigation
//!
//! A closed set of screens driven by abstract [`Input`] events. The state
//! machine never performs I/O: inputs and completed background work go in,
//! [`Command`]s come out, and the runtime executes them and reports back with
//! [`Completion`]s over a channel.
//!
//! Every screen-scoped command carries a [`Ticket`]. Replacing the screen
//! invalidates its tickets, so work still in flight for a screen the user has
//! left is simply ignored when it completes.

use crate::favorites::FavoritesStore;
use crate::input::Input;
use crate::models::{Broadcaster, Stream};

/// Number of stream rows shown at once
pub const VISIBLE_ROWS: usize = 3;

// =============================================================================
// Screens
// =============================================================================

/// Where a stream list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Top,
    Favorites,
    Search,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Top => "Top streams",
            Source::Favorites => "Favorites",
            Source::Search => "Search results",
        }
    }
}

/// Current screen
#[derive(Debug, Clone)]
pub enum Screen {
    /// A list of streams
    Browsing(BrowseState),
    /// Search box with virtual keyboard
    TextInput(SearchInput),
}

impl Screen {
    fn browse(source: Source, streams: Vec<Stream>) -> Self {
        Screen::Browsing(BrowseState::new(source, streams))
    }

    pub fn source(&self) -> Option<Source> {
        match self {
            Screen::Browsing(b) => Some(b.source),
            Screen::TextInput(_) => None,
        }
    }
}

/// Stream list with its selection and visible window
#[derive(Debug, Clone)]
pub struct BrowseState {
    pub source: Source,
    pub streams: Vec<Stream>,
    pub window: PageWindow,
}

impl BrowseState {
    pub fn new(source: Source, streams: Vec<Stream>) -> Self {
        let window = PageWindow::new(streams.len());
        Self {
            source,
            streams,
            window,
        }
    }

    pub fn selected_stream(&self) -> Option<&Stream> {
        self.streams.get(self.window.selected)
    }

    /// Streams inside the window, paired with their list index
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Stream)> {
        let range = self.window.range(self.streams.len());
        self.streams[range.clone()]
            .iter()
            .enumerate()
            .map(move |(i, s)| (range.start + i, s))
    }

    fn set_streams(&mut self, streams: Vec<Stream>) {
        self.window = PageWindow::new(streams.len());
        self.streams = streams;
    }
}

/// Selection plus a `[start, end]` window of at most [`VISIBLE_ROWS`] rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub selected: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            start: 0,
            end: VISIBLE_ROWS.min(len.max(1)) - 1,
        }
    }

    /// Move selection down; the window follows, never past `len - 1`
    pub fn down(&mut self, len: usize) -> bool {
        if len == 0 || self.selected >= len - 1 {
            return false;
        }
        self.selected += 1;
        if self.selected > self.end {
            self.start += 1;
            self.end = (self.end + 1).min(len - 1);
        }
        true
    }

    /// Move selection up; the window follows
    pub fn up(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        if self.selected < self.start {
            self.start -= 1;
            self.end -= 1;
        }
        true
    }

    /// Index range to draw for a list of `len` items
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.start.min(len);
        start..(self.end + 1).min(len)
    }
}

// =============================================================================
// Search Input
// =============================================================================

pub const KEY_BACKSPACE: &str = "←";
pub const KEY_SPACE: &str = "SPACE";
pub const KEY_ENTER: &str = "ENTER";

/// Virtual keyboard layout for controller-only devices
pub const KEYBOARD: [[&str; 10]; 4] = [
    ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
    ["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"],
    ["a", "s", "d", "f", "g", "h", "j", "k", "l", KEY_BACKSPACE],
    ["z", "x", "c", "v", "b", "n", "m", "_", KEY_SPACE, KEY_ENTER],
];

/// Cursor on the virtual keyboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardCursor {
    pub row: usize,
    pub col: usize,
}

impl KeyboardCursor {
    pub fn up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.row + 1 < KEYBOARD.len() {
            self.row += 1;
        }
    }

    // Left/right wrap around within the row
    pub fn left(&mut self) {
        let width = KEYBOARD[self.row].len();
        self.col = (self.col + width - 1) % width;
    }

    pub fn right(&mut self) {
        let width = KEYBOARD[self.row].len();
        self.col = (self.col + 1) % width;
    }

    pub fn key(&self) -> &'static str {
        KEYBOARD[self.row][self.col]
    }
}

/// Search box state
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    pub query: String,
    pub keyboard: KeyboardCursor,
}

impl SearchInput {
    pub fn insert(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn backspace(&mut self) {
        self.query.pop();
    }
}

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for async operations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    /// Idle - no loading in progress
    #[default]
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Identifies the screen that started an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Work for the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadTop,
    LoadFavorites {
        ticket: Ticket,
        favorites: Vec<Broadcaster>,
    },
    Search {
        ticket: Ticket,
        query: String,
    },
    ResolvePlayback {
        ticket: Ticket,
        login: String,
    },
    Launch {
        ticket: Ticket,
        login: String,
        url: String,
    },
    StopPlayback,
    SaveFavorites,
}

/// Result of a command, sent back to the state machine
#[derive(Debug, Clone)]
pub enum Completion {
    TopLoaded(Result<Vec<Stream>, String>),
    FavoritesLoaded {
        ticket: Ticket,
        result: Result<Vec<Stream>, String>,
    },
    SearchFinished {
        ticket: Ticket,
        result: Result<Vec<Stream>, String>,
    },
    /// `Ok("")` means the stream has no playable rendition
    PlaybackResolved {
        ticket: Ticket,
        login: String,
        result: Result<String, String>,
    },
    PlaybackStarted {
        ticket: Ticket,
        login: String,
    },
    PlaybackFailed {
        ticket: Ticket,
        login: String,
        error: String,
    },
    /// The player exited on its own
    PlaybackEnded,
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Whether the app is running
    pub running: bool,
    /// Screen-scoped loading state
    pub loading: LoadingState,
    /// Error message shown until the next key press
    pub error: Option<String>,
    /// Login of the stream being played
    pub playing: Option<String>,
    /// Last loaded top streams
    pub top_streams: Vec<Stream>,
    pub top_loading: bool,
    pub favorites: FavoritesStore,
    generation: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new(FavoritesStore::in_memory())
    }
}

impl App {
    /// Create a new App on the top streams screen
    pub fn new(favorites: FavoritesStore) -> Self {
        Self {
            screen: Screen::browse(Source::Top, Vec::new()),
            running: true,
            loading: LoadingState::Idle,
            error: None,
            playing: None,
            top_streams: Vec::new(),
            top_loading: false,
            favorites,
            generation: 0,
        }
    }

    /// Commands to run at startup
    pub fn start(&mut self) -> Vec<Command> {
        self.top_loading = true;
        vec![Command::LoadTop]
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Whether the current screen is waiting on background work
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading() || (self.top_loading && self.screen.source() == Some(Source::Top))
    }

    /// Text to show while loading
    pub fn loading_message(&self) -> Option<&str> {
        match self.loading.message() {
            Some(msg) => Some(msg),
            None if self.is_loading() => Some("Loading streams..."),
            None => None,
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket == self.ticket()
    }

    /// Replace the screen; pending work for the old one becomes stale
    fn set_screen(&mut self, screen: Screen) {
        self.generation += 1;
        self.screen = screen;
        self.loading = LoadingState::Idle;
    }

    fn begin(&mut self, message: impl Into<String>) -> Ticket {
        self.loading = LoadingState::Loading(Some(message.into()));
        self.ticket()
    }

    fn go_top(&mut self) {
        self.set_screen(Screen::browse(Source::Top, self.top_streams.clone()));
    }

    fn open_search(&mut self) {
        self.set_screen(Screen::TextInput(SearchInput::default()));
    }

    fn open_favorites(&mut self) -> Vec<Command> {
        self.set_screen(Screen::browse(Source::Favorites, Vec::new()));
        if self.favorites.is_empty() {
            return Vec::new();
        }
        let ticket = self.begin("Loading favorites...");
        vec![Command::LoadFavorites {
            ticket,
            favorites: self.favorites.favorites(),
        }]
    }

    fn stop_playback(&mut self) -> Vec<Command> {
        self.playing = None;
        self.loading = LoadingState::Idle;
        vec![Command::StopPlayback]
    }

    // -------------------------------------------------------------------------
    // Input Handling
    // -------------------------------------------------------------------------

    /// Handle an input event, returning the work it triggers
    pub fn handle_input(&mut self, input: Input) -> Vec<Command> {
        self.error = None;

        if input == Input::Quit {
            let commands = if self.is_playing() {
                self.stop_playback()
            } else {
                Vec::new()
            };
            self.quit();
            return commands;
        }

        match self.screen {
            Screen::Browsing(_) => self.handle_browse_input(input),
            Screen::TextInput(_) => self.handle_text_input(input),
        }
    }

    fn handle_browse_input(&mut self, input: Input) -> Vec<Command> {
        let Screen::Browsing(browse) = &mut self.screen else {
            return Vec::new();
        };
        let playing = self.playing.is_some();

        match input {
            Input::Up if !playing => {
                browse.window.up();
                Vec::new()
            }
            Input::Down if !playing => {
                let len = browse.streams.len();
                browse.window.down(len);
                Vec::new()
            }
            Input::Select if !playing && !self.loading.is_loading() => {
                let Some(login) = browse.selected_stream().map(|s| s.login().to_string()) else {
                    return Vec::new();
                };
                let ticket = self.begin(format!("Loading {} stream...", login));
                vec![Command::ResolvePlayback { ticket, login }]
            }
            Input::Back if playing => self.stop_playback(),
            Input::Back => {
                match browse.source {
                    Source::Top => self.quit(),
                    Source::Favorites | Source::Search => self.go_top(),
                }
                Vec::new()
            }
            Input::Search if !playing => {
                self.open_search();
                Vec::new()
            }
            Input::Right if !playing && browse.source == Source::Top => self.open_favorites(),
            Input::Left if !playing && browse.source == Source::Favorites => {
                self.go_top();
                Vec::new()
            }
            Input::Favorite => {
                let Some(broadcaster) = browse.selected_stream().map(|s| s.broadcaster.clone())
                else {
                    return Vec::new();
                };
                self.favorites.toggle(&broadcaster);
                vec![Command::SaveFavorites]
            }
            _ => Vec::new(),
        }
    }

    fn handle_text_input(&mut self, input: Input) -> Vec<Command> {
        if matches!(input, Input::Back | Input::Search) {
            self.go_top();
            return Vec::new();
        }
        if self.loading.is_loading() {
            return Vec::new();
        }

        let Screen::TextInput(search) = &mut self.screen else {
            return Vec::new();
        };

        match input {
            Input::Up => search.keyboard.up(),
            Input::Down => search.keyboard.down(),
            Input::Left => search.keyboard.left(),
            Input::Right => search.keyboard.right(),
            Input::Char(c) => search.insert(c),
            Input::Backspace => search.backspace(),
            Input::Submit => return self.submit_search(),
            Input::Select => match search.keyboard.key() {
                KEY_ENTER => return self.submit_search(),
                KEY_SPACE => search.insert(' '),
                KEY_BACKSPACE => search.backspace(),
                key => search.query.push_str(key),
            },
            _ => {}
        }
        Vec::new()
    }

    fn submit_search(&mut self) -> Vec<Command> {
        let Screen::TextInput(search) = &self.screen else {
            return Vec::new();
        };
        let query = search.query.trim().to_string();
        if query.is_empty() {
            return Vec::new();
        }
        let ticket = self.begin("Searching streams...");
        vec![Command::Search { ticket, query }]
    }

    // -------------------------------------------------------------------------
    // Completions
    // -------------------------------------------------------------------------

    /// Apply the result of background work
    pub fn complete(&mut self, completion: Completion) -> Vec<Command> {
        match completion {
            Completion::TopLoaded(result) => {
                self.top_loading = false;
                self.top_streams = result.unwrap_or_else(|e| {
                    self.error = Some(format!("Could not load top streams: {}", e));
                    Vec::new()
                });
                if let Screen::Browsing(browse) = &mut self.screen {
                    if browse.source == Source::Top {
                        browse.set_streams(self.top_streams.clone());
                    }
                }
                Vec::new()
            }
            Completion::FavoritesLoaded { ticket, result } => {
                if !self.is_current(ticket) {
                    return Vec::new();
                }
                self.loading = LoadingState::Idle;
                let streams = result.unwrap_or_else(|e| {
                    self.error = Some(format!("Could not load favorites: {}", e));
                    Vec::new()
                });
                if let Screen::Browsing(browse) = &mut self.screen {
                    browse.set_streams(streams);
                }
                Vec::new()
            }
            Completion::SearchFinished { ticket, result } => {
                if !self.is_current(ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(streams) => self.set_screen(Screen::browse(Source::Search, streams)),
                    Err(e) => {
                        self.loading = LoadingState::Idle;
                        self.error = Some(format!("Search failed: {}", e));
                    }
                }
                Vec::new()
            }
            Completion::PlaybackResolved {
                ticket,
                login,
                result,
            } => {
                if !self.is_current(ticket) || self.is_playing() {
                    return Vec::new();
                }
                match result {
                    Ok(url) if !url.is_empty() => vec![Command::Launch { ticket, login, url }],
                    Ok(_) => {
                        self.loading = LoadingState::Idle;
                        self.error = Some(format!("{} has no playable stream", login));
                        Vec::new()
                    }
                    Err(e) => {
                        self.loading = LoadingState::Idle;
                        self.error = Some(format!("Could not play {}: {}", login, e));
                        Vec::new()
                    }
                }
            }
            Completion::PlaybackStarted { ticket, login } => {
                // The player runs whether or not the screen changed meanwhile.
                self.playing = Some(login);
                if self.is_current(ticket) {
                    self.loading = LoadingState::Idle;
                }
                Vec::new()
            }
            Completion::PlaybackFailed {
                ticket,
                login,
                error,
            } => {
                if self.is_current(ticket) {
                    self.loading = LoadingState::Idle;
                    self.error = Some(format!("Could not play {}: {}", login, error));
                }
                Vec::new()
            }
            Completion::PlaybackEnded => {
                self.playing = None;
                Vec::new()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
