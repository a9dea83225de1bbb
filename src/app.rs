use crate::banner::{Canvas, Viewport, center};
use crate::config::Config;
use crate::render::{Pipeline, RenderConfig, RenderError};
use crate::source::{self, CostData, CostSource, SourceError};
use anyhow::Context;
use itertools::Itertools;
use chrono::{DateTime, Local};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthChar;

/// Rows kept below the banner: one blank separator and the status line.
const STATUS_ROWS: usize = 2;

/// Tick used when animation is disabled. The screen still redraws so the
/// status line stays current.
const IDLE_TICK: Duration = Duration::from_secs(1);

const CONTROLS: &str = "Controls: 'r' to refresh, 'q' to quit";
const RETRY_HINT: &str = "Press 'r' to retry or 'q' to quit";

/// Something the user asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Refresh,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Self::Quit),
            KeyCode::Char('q') | KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char('r') => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// What the main area of the screen shows.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Loading,
    Failed(String),
    NoData,
    Cost(CostData),
}

/// Everything the event loop tracks between two draws.
#[derive(Debug)]
pub struct AppState {
    screen: Screen,
    fetching: bool,
    last_update: Option<DateTime<Local>>,
    last_error: Option<String>,
    frame: u64,
    show_timestamp: bool,
}

impl AppState {
    pub fn new(show_timestamp: bool) -> Self {
        Self { screen: Screen::Loading, fetching: false, last_update: None, last_error: None, frame: 0, show_timestamp }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Record a fetch result.
    ///
    /// A failed refresh keeps a cost that is already on screen and only
    /// reports the failure in the status line.
    pub fn apply(&mut self, result: Result<Option<CostData>, SourceError>) {
        self.fetching = false;
        match result {
            Ok(data) => {
                self.last_update = Some(Local::now());
                self.last_error = None;
                self.screen = data.map_or(Screen::NoData, Screen::Cost);
            }
            Err(e) => {
                warn!("failed to fetch cost data: {e}");
                if matches!(self.screen, Screen::Cost(_)) {
                    self.last_error = Some(e.to_string());
                } else {
                    self.screen = Screen::Failed(e.to_string());
                }
            }
        }
    }

    pub fn status_line(&self) -> String {
        let mut parts = Vec::new();
        if self.fetching {
            parts.push("Refreshing...".to_string());
        }
        if let Some(error) = &self.last_error {
            parts.push(format!("Refresh failed: {}", error.lines().map(str::trim).join(" ")));
        }
        if let (true, Some(updated)) = (self.show_timestamp, self.last_update) {
            parts.push(format!("Last updated: {}", updated.format("%H:%M:%S")));
        }
        parts.push(CONTROLS.to_string());
        parts.join(" | ")
    }

    /// Build every line of the screen for a terminal of the given size.
    pub fn compose(&self, pipeline: &Pipeline, config: &RenderConfig, terminal: Viewport) -> Vec<String> {
        let body = Viewport::new(terminal.width, terminal.height.saturating_sub(STATUS_ROWS));
        let mut lines = match &self.screen {
            Screen::Loading => message(&["Loading cost data..."], body),
            Screen::Failed(error) => message(&[format!("Error: {error}").as_str(), "", RETRY_HINT], body),
            Screen::NoData => message(&["No data available"], body),
            Screen::Cost(data) => match render_cost(pipeline, data, self.frame, body, config) {
                Ok(lines) => lines,
                Err(e) => message(&[format!("Error: {e}").as_str(), "", RETRY_HINT], body),
            },
        };
        lines.push(String::new());
        lines.push(truncate(&self.status_line(), terminal.width));
        lines
    }
}

fn render_cost(
    pipeline: &Pipeline,
    data: &CostData,
    frame: u64,
    viewport: Viewport,
    config: &RenderConfig,
) -> Result<Vec<String>, RenderError> {
    let output = pipeline.render(Some(data.total_value), frame, viewport, config)?;
    Ok(output.split('\n').map(ToString::to_string).collect())
}

/// Center plain text. Entries may span several lines, such as a command's stderr.
fn message(text: &[&str], viewport: Viewport) -> Vec<String> {
    let lines = text.iter().flat_map(|entry| entry.split('\n')).map(|line| line.trim_end().to_string()).collect();
    center(&Canvas::new(lines, Vec::new()), viewport).lines().to_vec()
}

/// Cut a line to at most `width` terminal cells.
fn truncate(line: &str, width: usize) -> String {
    let mut used = 0;
    line.chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

/// Runs a cost source on its own thread so a slow fetch never stalls the UI.
struct FetchWorker {
    requests: Sender<()>,
    results: Receiver<Result<Option<CostData>, SourceError>>,
}

impl FetchWorker {
    fn spawn(mut source: Box<dyn CostSource>) -> io::Result<Self> {
        let (request_sender, request_receiver) = mpsc::channel::<()>();
        let (result_sender, result_receiver) = mpsc::channel();
        thread::Builder::new().name("cost-fetch".into()).spawn(move || {
            source.initialize();
            while request_receiver.recv().is_ok() {
                debug!(source = source.name(), "fetching cost data");
                if result_sender.send(source.fetch()).is_err() {
                    break;
                }
            }
            source.shutdown();
        })?;
        Ok(Self { requests: request_sender, results: result_receiver })
    }

    fn request(&self) -> bool {
        self.requests.send(()).is_ok()
    }

    fn try_result(&self) -> Option<Result<Option<CostData>, SourceError>> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

/// Puts the terminal in raw mode on the alternate screen and restores it on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn terminal_viewport() -> io::Result<Viewport> {
    let (columns, rows) = terminal::size()?;
    Ok(Viewport::new(columns.into(), rows.into()))
}

fn draw<W: Write>(out: &mut W, lines: &[String], rows: usize) -> io::Result<()> {
    for (row, line) in lines.iter().take(rows).enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), terminal::Clear(ClearType::CurrentLine), Print(line))?;
    }
    if lines.len() < rows {
        let row = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), terminal::Clear(ClearType::FromCursorDown))?;
    }
    out.flush()
}

/// Run the full screen application until the user quits.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let render_config = config.resolve().context("invalid configuration")?;
    let mut pipeline = Pipeline::new(render_config.thresholds);
    pipeline.initialize();

    let worker = FetchWorker::spawn(source::from_config(&config.source)).context("starting fetch worker")?;
    let tick = if render_config.animation.enabled() { render_config.animation.speed() } else { IDLE_TICK };
    let refresh_rate = config.source.refresh_rate;
    info!(?tick, ?refresh_rate, pattern = %render_config.animation.pattern(), "starting");

    let mut state = AppState::new(config.display.show_timestamp);
    state.fetching = worker.request();

    let _guard = TerminalGuard::enter().context("setting up terminal")?;
    let mut stdout = io::stdout();
    let mut viewport = terminal_viewport().context("reading terminal size")?;
    let mut next_tick = Instant::now() + tick;
    let mut next_refresh = Instant::now() + refresh_rate;
    let mut dirty = true;

    loop {
        if dirty {
            let lines = state.compose(&pipeline, &render_config, viewport);
            draw(&mut stdout, &lines, viewport.height).context("drawing screen")?;
            dirty = false;
        }

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout).context("polling terminal events")? {
            match event::read().context("reading terminal event")? {
                Event::Key(key) => match Action::from_key(key) {
                    Some(Action::Quit) => break,
                    Some(Action::Refresh) if !state.fetching => {
                        state.fetching = worker.request();
                        next_refresh = Instant::now() + refresh_rate;
                        dirty = true;
                    }
                    _ => {}
                },
                Event::Resize(columns, rows) => {
                    viewport = Viewport::new(columns.into(), rows.into());
                    dirty = true;
                }
                _ => {}
            }
        }

        while let Some(result) = worker.try_result() {
            state.apply(result);
            dirty = true;
        }

        let now = Instant::now();
        if now >= next_tick {
            state.advance_frame();
            next_tick += tick;
            if next_tick < now {
                next_tick = now + tick;
            }
            dirty = true;
        }
        if now >= next_refresh {
            if !state.fetching {
                state.fetching = worker.request();
            }
            next_refresh = now + refresh_rate;
        }
    }

    pipeline.shutdown();
    info!("exiting");
    Ok(())
}

/// Fetch once and render a single frame, for scripting and quick checks.
pub fn render_once(config: &Config, viewport: Viewport) -> anyhow::Result<String> {
    let render_config = config.resolve().context("invalid configuration")?;
    let mut source = source::from_config(&config.source);
    source.initialize();
    let data = source.fetch().context("fetching cost data");
    source.shutdown();
    let Some(data) = data? else {
        return Ok("No data available".to_string());
    };

    let mut pipeline = Pipeline::new(render_config.thresholds);
    pipeline.initialize();
    let output = pipeline.render(Some(data.total_value), 0, viewport, &render_config).context("rendering cost")?;
    pipeline.shutdown();
    Ok(output)
}

/// The size used by [`render_once`] when none is given.
pub fn default_viewport(width: Option<usize>, height: Option<usize>) -> Viewport {
    let detected = terminal_viewport().unwrap_or(Viewport::new(80, 24));
    Viewport::new(width.unwrap_or(detected.width), height.unwrap_or(detected.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::CompactThresholds;
    use crate::config::SourceKind;
    use chrono::Local;
    use rstest::rstest;

    fn pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new(CompactThresholds::default());
        pipeline.initialize();
        pipeline
    }

    fn cost(total_value: f64) -> CostData {
        CostData { total_value, currency: "USD".into(), observed_at: Local::now(), breakdown: Vec::new() }
    }

    fn failure() -> SourceError {
        SourceError::Timeout { command: "ccusage".into(), timeout: Duration::from_secs(1) }
    }

    #[rstest]
    #[case(KeyCode::Char('q'), KeyModifiers::NONE, Some(Action::Quit))]
    #[case(KeyCode::Esc, KeyModifiers::NONE, Some(Action::Quit))]
    #[case(KeyCode::Char('c'), KeyModifiers::CONTROL, Some(Action::Quit))]
    #[case(KeyCode::Char('c'), KeyModifiers::NONE, None)]
    #[case(KeyCode::Char('r'), KeyModifiers::NONE, Some(Action::Refresh))]
    #[case(KeyCode::Enter, KeyModifiers::NONE, None)]
    fn key_actions(#[case] code: KeyCode, #[case] modifiers: KeyModifiers, #[case] expected: Option<Action>) {
        assert_eq!(Action::from_key(KeyEvent::new(code, modifiers)), expected);
    }

    #[test]
    fn key_release_is_ignored() {
        let key = KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(Action::from_key(key), None);
    }

    #[test]
    fn fetch_results_update_screen() {
        let mut state = AppState::new(true);
        assert_eq!(state.screen(), &Screen::Loading);

        state.apply(Err(failure()));
        assert!(matches!(state.screen(), Screen::Failed(_)));

        state.apply(Ok(None));
        assert_eq!(state.screen(), &Screen::NoData);

        state.apply(Ok(Some(cost(4.0))));
        assert!(matches!(state.screen(), Screen::Cost(data) if data.total_value == 4.0));
    }

    #[test]
    fn failed_refresh_keeps_cost() {
        let mut state = AppState::new(false);
        state.apply(Ok(Some(cost(12.0))));
        state.apply(Err(failure()));
        assert!(matches!(state.screen(), Screen::Cost(data) if data.total_value == 12.0));
        assert!(state.status_line().starts_with("Refresh failed: "));

        state.apply(Ok(Some(cost(13.0))));
        assert_eq!(state.status_line(), CONTROLS);
    }

    #[test]
    fn status_line_timestamp() {
        let mut state = AppState::new(true);
        assert_eq!(state.status_line(), CONTROLS);
        state.apply(Ok(Some(cost(1.0))));
        assert!(state.status_line().starts_with("Last updated: "));
        state.fetching = true;
        assert!(state.status_line().starts_with("Refreshing... | Last updated: "));
    }

    #[test]
    fn frames_advance() {
        let mut state = AppState::new(true);
        state.advance_frame();
        state.advance_frame();
        assert_eq!(state.frame(), 2);
    }

    #[rstest]
    #[case(Screen::Loading, "Loading cost data...")]
    #[case(Screen::NoData, "No data available")]
    #[case(Screen::Failed("boom".into()), "Error: boom")]
    fn message_screens(#[case] screen: Screen, #[case] expected: &str) {
        let mut state = AppState::new(true);
        state.screen = screen;
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(80, 24));
        assert_eq!(lines.len(), 24);
        assert!(lines.iter().any(|line| line.trim() == expected));
        assert_eq!(lines[23], CONTROLS);
    }

    #[test]
    fn failure_shows_retry_hint() {
        let mut state = AppState::new(true);
        state.apply(Err(failure()));
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(80, 24));
        assert!(lines.iter().any(|line| line.trim() == RETRY_HINT));
    }

    #[test]
    fn cost_screen_fills_terminal() {
        let mut state = AppState::new(true);
        state.apply(Ok(Some(cost(42.5))));
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(120, 30));
        assert_eq!(lines.len(), 30);
        assert!(lines[28].is_empty());
        assert!(lines[29].starts_with("Last updated: "));
    }

    #[test]
    fn unrenderable_cost_is_an_error() {
        let mut state = AppState::new(true);
        state.apply(Ok(Some(cost(-1.0))));
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(80, 24));
        assert!(lines.iter().any(|line| line.trim().starts_with("Error: ")));
    }

    #[cfg(unix)]
    fn failed_command(stderr: &str) -> SourceError {
        let status = std::process::Command::new("sh").args(["-c", "exit 1"]).status().expect("shell runs");
        SourceError::Failed { command: "npx ccusage daily --json".into(), status, stderr: stderr.into() }
    }

    #[cfg(unix)]
    #[test]
    fn multi_line_errors_stay_on_separate_rows() {
        let stderr = "npm ERR! code E404\nnpm ERR! 404 Not Found";
        let mut state = AppState::new(true);
        state.apply(Err(failed_command(stderr)));
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(80, 24));
        assert_eq!(lines.len(), 24);
        assert!(lines.iter().all(|line| !line.contains('\n')));
        assert!(lines.iter().any(|line| line.trim() == "npm ERR! 404 Not Found"));

        state.apply(Ok(Some(cost(2.0))));
        state.apply(Err(failed_command(stderr)));
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(200, 30));
        assert!(lines.iter().all(|line| !line.contains('\n')));
        assert!(state.status_line().contains("npm ERR! code E404 npm ERR! 404 Not Found"));
    }

    #[rstest]
    #[case("abcdef", 4, "abcd")]
    #[case("ab", 4, "ab")]
    #[case("日本語", 5, "日本")]
    #[case("日本語", 0, "")]
    fn truncates_by_cell_width(#[case] line: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(truncate(line, width), expected);
    }

    #[test]
    fn status_line_is_truncated() {
        let state = AppState::new(true);
        let lines = state.compose(&pipeline(), &RenderConfig::default(), Viewport::new(10, 5));
        assert_eq!(lines.last().map(String::as_str), Some("Controls: "));
    }

    #[test]
    fn renders_bankruptcy_once() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Bankruptcy;
        config.animation.enabled = false;
        let output = render_once(&config, Viewport::new(120, 30)).expect("rendered");
        assert_eq!(output.split('\n').count(), 30);
        assert!(output.contains('█'));
    }

    #[test]
    fn render_once_rejects_invalid_config() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Bankruptcy;
        config.animation.pattern = "sparkle".into();
        assert!(render_once(&config, Viewport::new(80, 24)).is_err());
    }

    #[test]
    fn worker_fetches_on_request() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Bankruptcy;
        let worker = FetchWorker::spawn(source::from_config(&config.source)).expect("spawned");
        assert!(worker.request());
        let result = worker.results.recv_timeout(Duration::from_secs(5)).expect("result arrives");
        assert!(matches!(result, Ok(Some(data)) if data.total_value == 9999.99));
    }
}
