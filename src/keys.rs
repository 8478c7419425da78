use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fantasy_api::Tag;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Selection saves go to `save_requests` (the debouncer input), everything
/// else straight to the network worker. Returns true when the user asked to quit.
pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    save_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    let mut guard = app.lock().await;
    let mut request = None;
    let mut save = None;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => return true,

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Match),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Players),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Tiers),
        (_, Char('4'), _) => guard.update_tab(MenuItem::Lineup),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Match list
        (MenuItem::Match, Char('j') | KeyCode::Down, _) => guard.state.fixtures.navigate_down(),
        (MenuItem::Match, Char('k') | KeyCode::Up, _) => guard.state.fixtures.navigate_up(),
        (MenuItem::Match, KeyCode::Enter, _) => request = guard.open_selected_fixture(),
        (MenuItem::Match, Char('r'), _) => request = Some(NetworkRequest::LoadFixtures),

        // Player selection
        (MenuItem::Players, Char('j') | KeyCode::Down, _) => guard.state.roster.navigate_down(),
        (MenuItem::Players, Char('k') | KeyCode::Up, _) => guard.state.roster.navigate_up(),
        (MenuItem::Players, Char('p'), _) => save = guard.toggle_selected_player(Tag::Preferred),
        (MenuItem::Players, Char('l'), _) => save = guard.toggle_selected_player(Tag::Locked),
        (MenuItem::Players, Char('x'), _) => save = guard.toggle_selected_player(Tag::Excluded),
        (MenuItem::Players, Char('f'), _) => guard.state.roster.cycle_filter(),
        (MenuItem::Players, Char('c'), _) => save = guard.clear_selection(),
        (MenuItem::Players | MenuItem::Tiers, Char('r'), _) => {
            if let Some(uid) = guard.state.roster.fixture().map(|f| f.season_game_uid.clone()) {
                request = Some(guard.request_roster(&uid));
            }
        }

        // Lineup settings
        (MenuItem::Lineup, Char('j') | KeyCode::Down, _) => guard.state.lineup.next_field(),
        (MenuItem::Lineup, Char('k') | KeyCode::Up, _) => guard.state.lineup.prev_field(),
        (MenuItem::Lineup, Char('l') | KeyCode::Right, _) => guard.state.lineup.increase(),
        (MenuItem::Lineup, Char('h') | KeyCode::Left, _) => guard.state.lineup.decrease(),
        (MenuItem::Lineup, Char('g') | KeyCode::Enter, _) => request = guard.generate_request(),
        (MenuItem::Lineup, Char('J'), _) => {
            guard.state.lineup.scroll_offset = guard.state.lineup.scroll_offset.saturating_add(1);
        }
        (MenuItem::Lineup, Char('K'), _) => {
            guard.state.lineup.scroll_offset = guard.state.lineup.scroll_offset.saturating_sub(1);
        }

        // Global
        (_, Char('w'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
    if let Some(save) = save {
        let _ = save_requests.send(save).await;
    }
    false
}
