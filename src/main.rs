pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use orbit::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    engine::{CountdownMode, TickOutcome},
    runtime::{
        CrosstermEventSource, FixedTicker, Runner, Ticker, TimerEvent, TimerEventSource,
        TICK_INTERVAL,
    },
    session::FocusSession,
    wave::FRAME_INTERVAL_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// focus timer tui with a liquid wave that drains as you work
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A focus timer for the terminal. Focus and break countdowns drain a liquid wave; when a countdown runs out the timer keeps going in flow mode until you reset it."
)]
pub struct Cli {
    /// task to show above the timer (defaults to the last one used)
    #[clap(short = 't', long)]
    task: Option<String>,

    /// start with the ambient noise toggle switched on
    #[clap(short = 'n', long)]
    noise: bool,

    /// start with the ambient noise toggle switched off, even if it was on last time
    #[clap(long, conflicts_with = "noise")]
    no_noise: bool,

    /// start in break mode instead of focus
    #[clap(short = 'b', long = "break")]
    start_break: bool,

    /// write logs to this file instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// log at debug level
    #[clap(short = 'v', long)]
    verbose: bool,

    /// do not remember the task and noise setting between runs
    #[clap(long)]
    no_save: bool,
}

impl Cli {
    fn start_mode(&self) -> CountdownMode {
        if self.start_break {
            CountdownMode::Break
        } else {
            CountdownMode::Focus
        }
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Timer,
    EditingTask,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub session: FocusSession,
    pub state: AppState,
    /// Task text being typed while in `EditingTask`
    pub task_draft: String,
}

impl App {
    pub fn new(cli: Cli, saved: Config) -> Self {
        let task = cli.task.clone().unwrap_or(saved.task);
        let noise = match (cli.noise, cli.no_noise) {
            (true, _) => true,
            (_, true) => false,
            _ => saved.noise_enabled,
        };
        Self {
            session: FocusSession::new(cli.start_mode(), &task, noise),
            cli: Some(cli),
            state: AppState::Timer,
            task_draft: String::new(),
        }
    }

    /// Applies one key press. Returns true when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.state {
            AppState::EditingTask => match key.code {
                KeyCode::Enter => {
                    self.session.set_task(&self.task_draft);
                    self.task_draft.clear();
                    self.state = AppState::Timer;
                }
                KeyCode::Esc => {
                    self.task_draft.clear();
                    self.state = AppState::Timer;
                }
                KeyCode::Backspace => {
                    self.task_draft.pop();
                }
                KeyCode::Char(c) => self.task_draft.push(c),
                _ => {}
            },
            AppState::Timer => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return true,
                KeyCode::Char(' ') | KeyCode::Enter => self.session.toggle(),
                KeyCode::Char('r') => self.session.reset(),
                KeyCode::Char('f') => {
                    self.session.switch_mode(CountdownMode::Focus);
                }
                KeyCode::Char('b') => {
                    self.session.switch_mode(CountdownMode::Break);
                }
                KeyCode::Tab => {
                    if let Some(current) = self.session.mode().countdown() {
                        self.session.switch_mode(current.other());
                    }
                }
                KeyCode::Char('n') => self.session.toggle_noise(),
                KeyCode::Char('e') => {
                    self.task_draft = self.session.task().to_string();
                    self.state = AppState::EditingTask;
                }
                _ => {}
            },
        }
        false
    }

    fn should_save(&self) -> bool {
        self.cli.as_ref().is_some_and(|cli| !cli.no_save)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(&cli);

    let store = FileConfigStore::new();
    let saved = if cli.no_save {
        Config::default()
    } else {
        store.load()
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, saved);
    info!(mode = %app.session.mode(), task = %app.session.task(), "orbit started");
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if app.should_save() {
        if let Err(e) = store.save(&Config::from(&app.session)) {
            warn!(error = %e, "failed to save preferences");
        }
    }
    info!("orbit exited");

    result
}

/// Sends tracing output to a log file; the terminal belongs to the UI.
/// Any failure here leaves logging disabled.
fn init_logging(cli: &Cli) {
    let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orbit={}", cli.log_level())));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(TICK_INTERVAL),
        FixedTicker::new(Duration::from_millis(FRAME_INTERVAL_MS)),
    );
    run_app(terminal, app, &mut runner)
}

/// Event loop: one event per step, then re-sync the schedules with the
/// running flag and redraw.
fn run_app<B: Backend, E: TimerEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    runner.sync(app.session.is_running());
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TimerEvent::Tick => {
                if app.session.on_tick() == TickOutcome::EnteredFlow {
                    info!(task = %app.session.task(), "flow started");
                }
            }
            TimerEvent::Frame => app.session.on_frame(),
            TimerEvent::Resize => {}
            TimerEvent::Idle => continue,
            TimerEvent::Closed => {
                warn!("terminal input closed, exiting");
                break;
            }
            TimerEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }

        runner.sync(app.session.is_running());
        terminal.draw(|f| ui(app, f))?;
    }

    runner.sync(false);
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
