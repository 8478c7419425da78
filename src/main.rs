mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::debounce::Debouncer;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::ticker::Ticker;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use fantasy_api::client::FantasyApi;
use log::{error, info, warn};
use std::io::Stdout;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const FIXTURE_REFRESH_PERIOD: Duration = Duration::from_secs(60);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(match_arg) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    let mut settings = AppSettings::load();
    if match_arg.is_some() {
        settings.season_game_uid = match_arg;
    }
    let client = FantasyApi::new(settings.api.clone());

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let save_debounce = settings.save_debounce;
    let app = Arc::new(Mutex::new(App::new(settings)));
    info!("xitui {} starting", env!("CARGO_PKG_VERSION"));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (save_tx, save_rx) = mpsc::channel::<NetworkRequest>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Selection saves: only the last toggle in a burst reaches the network
    let debouncer = Debouncer::new(save_debounce, save_rx, network_req_tx.clone());
    let debounce_task = tokio::spawn(debouncer.run());

    // Countdown + announcement blink
    let clock_task = tokio::spawn(Ticker::new(TICK_PERIOD, UiEvent::Tick, ui_event_tx.clone()).run());

    // Periodic fixture refresh
    let refresher = Ticker::new(FIXTURE_REFRESH_PERIOD, NetworkRequest::LoadFixtures, network_req_tx.clone())
        .skip_first();
    let refresh_task = tokio::spawn(refresher.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, save_tx, network_resp_rx).await;

    // The loop dropped its request senders; once the refresher is gone the
    // debouncer flushes its pending save and the worker drains and stops.
    input_handler.abort();
    clock_task.abort();
    refresh_task.abort();
    if !state::shutdown::wait_for(SHUTDOWN_GRACE, vec![debounce_task, network_task]).await {
        warn!("pending saves did not finish within {SHUTDOWN_GRACE:?}");
    }

    cleanup_terminal();
    // The input thread is parked in a blocking read and would hold the runtime open.
    std::process::exit(0);
}

/// Returns `None` when the process should exit right away, otherwise the
/// optional match uid given on the command line.
fn handle_cli_args() -> Option<Option<String>> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Some(None);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("xitui {}", env!("CARGO_PKG_VERSION"));
            None
        }
        uid if !uid.starts_with('-') && args.next().is_none() => Some(Some(uid.to_string())),
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "xitui - fantasy cricket lineup builder

Usage:
  xitui [MATCH_UID]
  xitui --help
  xitui --version

Environment:
  XITUI_API_BASE          Fantasy API base URL
  XITUI_SESSION_KEY       Session key sent as the sessionkey header
  XITUI_MODULE_ACCESS     Value of the moduleaccess header
  XITUI_WEBSITE_ID        Website id (default 1)
  XITUI_SPORTS_ID         Sports id (default 7, cricket)
  XITUI_MATCH             Match to open on startup
  XITUI_MERGE_POLICY      local | server: who wins when tags disagree (default local)
  XITUI_SAVE_DEBOUNCE_MS  Quiet period before a selection is saved (default 500)
  XITUI_LOG_LEVEL         error | warn | info | debug | trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    save_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let ControlFlow::Continue(should_redraw) =
                    handle_ui_event(ui_event, &app, &network_requests, &save_requests).await
                else {
                    break;
                };
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    save_requests: &mpsc::Sender<NetworkRequest>,
) -> ControlFlow<(), bool> {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadFixtures).await;
        }
        UiEvent::KeyPressed(key_event) => {
            if keys::handle_key_bindings(key_event, app, network_requests, save_requests).await {
                return ControlFlow::Break(());
            }
        }
        UiEvent::Resize => {}
        UiEvent::Tick => {
            let mut guard = app.lock().await;
            guard.on_tick(chrono::Utc::now());
        }
    }
    ControlFlow::Continue(true)
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::FixturesLoaded { fixtures } => {
            let mut guard = app.lock().await;
            let follow_up = guard.on_fixtures_loaded(fixtures);
            drop(guard);
            if let Some(request) = follow_up {
                let _ = network_requests.send(request).await;
            }
        }
        NetworkResponse::RosterLoaded { generation, roster } => {
            let mut guard = app.lock().await;
            guard.on_roster_loaded(generation, roster);
        }
        NetworkResponse::RosterFailed { generation, message } => {
            let mut guard = app.lock().await;
            guard.on_roster_failed(generation, message);
        }
        NetworkResponse::TeamsGenerated { teams } => {
            let mut guard = app.lock().await;
            guard.on_teams_generated(teams);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort; also runs from the panic hook, so failures are ignored.
fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
