//! Fetch orchestrator: the three operations the rendering layer calls.
//!
//! Each operation is cache-first. On a miss it calls the feed, normalizes
//! what came back, writes the result through the cache and returns it.
//! Failures are classified `FeedError`s up to this point and are degraded
//! to empty or partial results here; nothing past this boundary sees an error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::api::{Feed, FeedError, FeedResult};
use crate::cache::{CacheKey, CacheManager};
use crate::config::Config;
use crate::models::{Game, Team, TeamDetailBundle};
use crate::normalize::{game_from_scoreboard_event, game_from_team_schedule_event, player_from_roster_athlete, teams_from_standings};

/// Games kept on each side of a team's schedule
const TEAM_GAMES_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Days of scoreboard fetched for the schedule, today inclusive
    pub schedule_days: u32,
    /// Upper bound on any single upstream call
    pub request_timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SyncOptions {
    fn from(config: &Config) -> Self {
        Self {
            schedule_days: config.schedule_days,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

pub struct SyncService<F> {
    feed: F,
    cache: Arc<CacheManager>,
    options: SyncOptions,
}

impl<F: Feed> SyncService<F> {
    pub fn new(feed: F, cache: Arc<CacheManager>, options: SyncOptions) -> Self {
        Self { feed, cache, options }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Bound an upstream call so a hanging feed still degrades.
    async fn guarded<T>(&self, call: impl Future<Output = FeedResult<T>>) -> FeedResult<T> {
        match tokio::time::timeout(self.options.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout(self.options.request_timeout)),
        }
    }

    // ===== Standings =====

    /// League standings, East then West, each by playoff seed.
    /// Empty when nothing is cached and the feed fails.
    pub async fn fetch_standings(&self) -> Vec<Team> {
        let key = CacheKey::standings();
        if let Some(teams) = self.cache.get::<Vec<Team>>(&key) {
            return teams;
        }

        match self.guarded(self.feed.standings()).await {
            Ok(response) => {
                let mut teams = teams_from_standings(&response);
                teams.sort_by_key(|t| (t.conference, t.rank == 0, t.rank));
                info!(count = teams.len(), "Standings fetched");
                self.cache.set(&key, &teams);
                teams
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Standings fetch failed");
                Vec::new()
            }
        }
    }

    // ===== Schedule =====

    /// Games for the configured window starting today, in day order.
    pub async fn fetch_schedule(&self) -> Vec<Game> {
        self.fetch_schedule_from(Local::now().date_naive()).await
    }

    /// Same as `fetch_schedule`, with the window starting at `start`.
    pub async fn fetch_schedule_from(&self, start: NaiveDate) -> Vec<Game> {
        let key = CacheKey::schedule();
        if let Some(games) = self.cache.get::<Vec<Game>>(&key) {
            return games;
        }

        let days = schedule_window(start, self.options.schedule_days);

        // join_all yields results in request order, so days stay ascending
        let results = join_all(days.iter().map(|&day| async move {
            let result = self.guarded(self.feed.scoreboard(day)).await;
            (day, result)
        }))
        .await;

        let mut games = Vec::new();
        let mut failed_days = 0;
        for (day, result) in results {
            match result {
                Ok(response) => {
                    let before = games.len();
                    games.extend(response.events.iter().filter_map(game_from_scoreboard_event));
                    debug!(%day, kept = games.len() - before, received = response.events.len(), "Scoreboard day fetched");
                }
                Err(e) => {
                    failed_days += 1;
                    warn!(%day, error = %e, kind = ?e.kind(), "Scoreboard day failed, treating as no games");
                }
            }
        }

        info!(count = games.len(), days = days.len(), failed_days, "Schedule fetched");
        if failed_days < days.len() {
            self.cache.set(&key, &games);
        }
        games
    }

    // ===== Team details =====

    /// Roster plus recent and upcoming games for one team.
    /// Roster and schedule degrade independently.
    pub async fn fetch_team_details(&self, team_id: &str) -> TeamDetailBundle {
        let key = CacheKey::team_details(team_id);
        if let Some(bundle) = self.cache.get::<TeamDetailBundle>(&key) {
            return bundle;
        }

        let (roster_res, schedule_res) = tokio::join!(
            self.guarded(self.feed.team_roster(team_id)),
            self.guarded(self.feed.team_schedule(team_id)),
        );

        let roster = match roster_res {
            Ok(response) => response
                .team
                .athletes
                .iter()
                .filter_map(|athlete| player_from_roster_athlete(athlete, team_id))
                .collect(),
            Err(e) => {
                warn!(team_id, error = %e, kind = ?e.kind(), "Roster fetch failed");
                Vec::new()
            }
        };

        let (next_games, last_games) = match schedule_res {
            Ok(response) => split_team_games(
                response
                    .events
                    .iter()
                    .filter_map(game_from_team_schedule_event)
                    .collect(),
            ),
            Err(e) => {
                warn!(team_id, error = %e, kind = ?e.kind(), "Team schedule fetch failed");
                (Vec::new(), Vec::new())
            }
        };

        let bundle = TeamDetailBundle {
            roster,
            next_games,
            last_games,
        };

        // Empty bundles are never cached
        if bundle.is_empty() {
            debug!(team_id, "Team details empty, not caching");
        } else {
            self.cache.set(&key, &bundle);
        }
        bundle
    }

    // ===== Invalidation =====

    pub fn invalidate(&self, key: &CacheKey) {
        self.cache.remove(key.as_str());
    }

    /// Drop the cached standings and schedule and fetch both again.
    pub async fn refresh_all(&self) -> (Vec<Team>, Vec<Game>) {
        self.invalidate(&CacheKey::standings());
        self.invalidate(&CacheKey::schedule());
        tokio::join!(self.fetch_standings(), self.fetch_schedule())
    }
}

/// `days` consecutive dates starting at `start`.
pub(crate) fn schedule_window(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..u64::from(days))
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .collect()
}

/// Sort by date and split into (next, last): the first upcoming games
/// oldest-first, and the most recent completed games newest-first.
pub fn split_team_games(mut games: Vec<Game>) -> (Vec<Game>, Vec<Game>) {
    games.sort_by_key(|g| g.date);
    let (finished, upcoming): (Vec<Game>, Vec<Game>) = games.into_iter().partition(Game::is_final);

    let skip = finished.len().saturating_sub(TEAM_GAMES_WINDOW);
    let last_games: Vec<Game> = finished.into_iter().skip(skip).rev().collect();
    let next_games: Vec<Game> = upcoming.into_iter().take(TEAM_GAMES_WINDOW).collect();
    (next_games, last_games)
}
