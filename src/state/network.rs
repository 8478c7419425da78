use crate::state::messages::{NetworkRequest, NetworkResponse};
use fantasy_api::client::{ApiError, FantasyApi};
use fantasy_api::lineup::{LineupLogic, LineupSetting};
use fantasy_api::selection::SelectionLists;
use fantasy_api::Fixture;
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Hands out increasing ids for superseding requests. Only a response
/// carrying the latest id may be applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestGeneration {
    current: u64,
}

impl RequestGeneration {
    pub fn next(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current
    }
}

/// Drives the loading spinner. Cloned into spawned loads.
#[derive(Clone)]
struct Spinner {
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl Spinner {
    async fn start(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

pub struct NetworkWorker {
    client: FantasyApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    spinner: Spinner,
    roster_load: Option<JoinHandle<()>>,
}

impl NetworkWorker {
    pub fn new(
        client: FantasyApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        let spinner = Spinner {
            responses: responses.clone(),
            is_loading: Arc::new(AtomicBool::new(false)),
        };
        Self { client, requests, responses, spinner, roster_load: None }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let response = match request {
                NetworkRequest::LoadRoster { generation, season_game_uid, lineup_logic } => {
                    self.spawn_roster_load(generation, season_game_uid, lineup_logic);
                    continue;
                }
                NetworkRequest::SaveSelection { fixture, lists } => {
                    self.handle_save_selection(&fixture, &lists).await;
                    continue;
                }
                NetworkRequest::LoadFixtures => {
                    self.spinner.start().await;
                    let result = self.handle_load_fixtures().await;
                    self.spinner.stop(result.is_ok()).await;
                    result
                }
                NetworkRequest::GenerateTeams { fixture, lists, setting } => {
                    self.spinner.start().await;
                    let result = self.handle_generate_teams(&fixture, &lists, &setting).await;
                    self.spinner.stop(result.is_ok()).await;
                    result
                }
            };

            debug!("network request complete");
            let response = response.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            // The UI may already be gone while queued saves are still draining.
            if let Err(e) = self.responses.send(response).await {
                debug!("dropping network response: {e}");
            }
        }

        if let Some(handle) = self.roster_load.take() {
            handle.abort();
        }
    }

    /// Start a roster load, aborting any load still in flight.
    fn spawn_roster_load(&mut self, generation: u64, season_game_uid: String, lineup_logic: LineupLogic) {
        if let Some(previous) = self.roster_load.take()
            && !previous.is_finished()
        {
            debug!("roster load superseded by generation {generation}");
            previous.abort();
        }

        let client = self.client.clone();
        let responses = self.responses.clone();
        let spinner = self.spinner.clone();
        self.roster_load = Some(tokio::spawn(async move {
            debug!("loading roster for {season_game_uid} (generation {generation})");
            spinner.start().await;
            let result = client.fetch_roster(&season_game_uid, lineup_logic).await;
            spinner.stop(result.is_ok()).await;

            let response = match result {
                Ok(roster) => NetworkResponse::RosterLoaded { generation, roster },
                Err(e) => NetworkResponse::RosterFailed { generation, message: e.to_string() },
            };
            if let Err(e) = responses.send(response).await {
                error!("Failed to send roster response: {e}");
            }
        }));
    }

    async fn handle_load_fixtures(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading fixtures");
        let fixtures = self.client.fetch_fixtures().await?;
        Ok(NetworkResponse::FixturesLoaded { fixtures })
    }

    /// Save failures are logged and dropped; nothing is retried.
    async fn handle_save_selection(&self, fixture: &Fixture, lists: &SelectionLists) {
        debug!(
            "saving selection for {}: {} tagged players",
            fixture.season_game_uid,
            lists.total()
        );
        if let Err(e) = self.client.save_selection(fixture, lists).await {
            warn!("selection save failed: {e}");
        }
    }

    async fn handle_generate_teams(
        &self,
        fixture: &Fixture,
        lists: &SelectionLists,
        setting: &LineupSetting,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("generating {} teams for {}", setting.teams_count, fixture.season_game_uid);
        let teams = self.client.generate_teams(fixture, lists, setting).await?;
        Ok(NetworkResponse::TeamsGenerated { teams })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantasy_api::client::ApiConfig;

    #[test]
    fn generations_increase_and_only_the_latest_is_current() {
        let mut generation = RequestGeneration::default();
        let first = generation.next();
        let second = generation.next();
        assert!(second > first);
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert_eq!(generation.current(), second);
    }

    #[tokio::test]
    async fn queued_save_still_goes_out_after_the_ui_is_gone() {
        let mut server = mockito::Server::new_async().await;
        let _fixtures = server
            .mock("POST", "/lobby/get_fixtures")
            .with_status(503)
            .create_async()
            .await;
        let save = server
            .mock("POST", "/lineup/save_player_selection")
            .with_status(200)
            .with_body(r#"{"response_code":200,"message":"saved","data":{}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = FantasyApi::new(ApiConfig { base_url: server.url(), ..ApiConfig::default() });
        let (request_tx, request_rx) = mpsc::channel(4);
        let (response_tx, response_rx) = mpsc::channel(4);
        drop(response_rx);

        request_tx.send(NetworkRequest::LoadFixtures).await.unwrap();
        request_tx
            .send(NetworkRequest::SaveSelection {
                fixture: Fixture { season_game_uid: "g1".into(), ..Default::default() },
                lists: SelectionLists { locked_players: vec!["7".into()], ..Default::default() },
            })
            .await
            .unwrap();
        drop(request_tx);

        NetworkWorker::new(client, request_rx, response_tx).run().await;
        save.assert_async().await;
    }
}
