use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use futures::{stream, StreamExt};
use sqlx::SqlitePool;
use thiserror::Error;
use tmdb::{Credits, MovieDetails, MovieSummary, PaginatedResponse};

use super::catalog::{CatalogError, CatalogService};
use crate::models::{SyncRunStatus, UpsertMovie};
use crate::repositories::{MovieRepository, SyncRunRepository};

/// Concurrency limit for per-movie detail fetches within a page
const SYNC_CONCURRENCY: usize = 5;

/// How many billed cast members make up the display actors string
const TOP_BILLED_ACTORS: usize = 5;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Origin listing and detail lookups consumed by the sync engine.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of catalog descriptors, optionally filtered by year.
    async fn list_page(
        &self,
        year: Option<i32>,
        page: i64,
    ) -> Result<PaginatedResponse<MovieSummary>, CatalogError>;

    /// Fetch full details (credits included) for one catalog entry.
    async fn movie_detail(&self, tmdb_id: i64) -> Result<MovieDetails, CatalogError>;
}

#[async_trait]
impl CatalogSource for CatalogService {
    async fn list_page(
        &self,
        year: Option<i32>,
        page: i64,
    ) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
        match year {
            Some(year) => self.discover_by_year(year, page).await,
            None => self.top_rated(page).await,
        }
    }

    async fn movie_detail(&self, tmdb_id: i64) -> Result<MovieDetails, CatalogError> {
        CatalogService::movie_detail(self, tmdb_id).await
    }
}

/// Outcome of a single sync run
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOutcome {
    pub pages: usize,
    pub synced: usize,
    pub failed: usize,
    pub aborted: bool,
}

/// Mirrors external catalog entries into the local movie table.
///
/// Runs are idempotent: every descriptor is upserted by its external id, so
/// re-running against unchanged origin data converges to the same rows.
/// Concurrent runs are not deduplicated; the upsert key keeps the final state
/// consistent (last write wins on mutable fields).
pub struct SyncService {
    db: SqlitePool,
    source: Arc<dyn CatalogSource>,
    limit: usize,
}

impl SyncService {
    pub fn new(db: SqlitePool, source: Arc<dyn CatalogSource>, limit: usize) -> Self {
        Self { db, source, limit }
    }

    /// Run a sync on a detached task. The caller gets no completion signal;
    /// the run is observable through the sync_runs table and logs.
    pub fn spawn(self: &Arc<Self>, year: Option<i32>) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.sync(year).await;
        });
    }

    /// Mirror up to `limit` catalog entries into the movie table.
    ///
    /// A page fetch failure abandons the remaining pages of the run; a
    /// failure on a single descriptor is logged and skipped.
    pub async fn sync(&self, year: Option<i32>) -> SyncOutcome {
        match year {
            Some(year) => tracing::info!("Starting catalog sync for year {}", year),
            None => tracing::info!("Starting catalog sync"),
        }

        let run_id = match SyncRunRepository::start(&self.db, year).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!("Failed to record sync run start: {}", e);
                None
            }
        };

        let mut outcome = SyncOutcome::default();
        let mut remaining = self.limit;
        let mut page = 1_i64;

        while remaining > 0 {
            let listing = match self.source.list_page(year, page).await {
                Ok(listing) => listing,
                Err(e) => {
                    tracing::error!(
                        "Aborting sync run: failed to fetch catalog page {}: {}",
                        page,
                        e
                    );
                    outcome.aborted = true;
                    break;
                }
            };

            outcome.pages += 1;
            let total_pages = listing.total_pages;
            let batch: Vec<MovieSummary> =
                listing.results.into_iter().take(remaining).collect();
            if batch.is_empty() {
                break;
            }
            remaining -= batch.len();

            let results: Vec<bool> = stream::iter(batch)
                .map(|summary| async move {
                    match self.process_descriptor(&summary).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(
                                "Skipping catalog entry {} ({}): {}",
                                summary.id,
                                summary.title,
                                e
                            );
                            false
                        }
                    }
                })
                .buffer_unordered(SYNC_CONCURRENCY)
                .collect()
                .await;

            for succeeded in results {
                if succeeded {
                    outcome.synced += 1;
                } else {
                    outcome.failed += 1;
                }
            }

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        if let Some(run_id) = run_id {
            let status = if outcome.aborted {
                SyncRunStatus::Aborted
            } else {
                SyncRunStatus::Completed
            };
            if let Err(e) = SyncRunRepository::finish(
                &self.db,
                run_id,
                status,
                outcome.synced as i64,
                outcome.failed as i64,
                outcome.pages as i64,
            )
            .await
            {
                tracing::error!("Failed to record sync run outcome: {}", e);
            }
        }

        tracing::info!(
            "Catalog sync finished: {} synced, {} failed over {} pages{}",
            outcome.synced,
            outcome.failed,
            outcome.pages,
            if outcome.aborted { " (aborted)" } else { "" }
        );

        outcome
    }

    async fn process_descriptor(&self, summary: &MovieSummary) -> Result<(), SyncError> {
        let detail = self.source.movie_detail(summary.id).await?;
        MovieRepository::upsert(&self.db, upsert_from_details(&detail)).await?;
        Ok(())
    }
}

/// Build upsert data from origin details, deriving the computed fields.
fn upsert_from_details(detail: &MovieDetails) -> UpsertMovie {
    let release_date = parse_release_date(detail.release_date.as_deref());
    let credits = detail.credits.clone();

    UpsertMovie {
        tmdb_id: detail.id,
        title: detail.title.clone(),
        original_title: Some(detail.original_title.clone()),
        overview: non_empty(&detail.overview),
        release_date,
        release_year: release_date.map(|date| date.year()),
        runtime: detail.runtime,
        vote_average: detail.vote_average,
        vote_count: detail.vote_count,
        popularity: detail.popularity,
        poster_path: detail.poster_path.clone(),
        backdrop_path: detail.backdrop_path.clone(),
        original_language: non_empty(&detail.original_language),
        genres: detail.genres.clone(),
        production_companies: detail.production_companies.clone(),
        director: credits.as_ref().and_then(extract_director),
        actors: credits.as_ref().and_then(extract_actors),
        credits,
    }
}

/// Parse an origin release date; the origin sends absent dates as empty strings.
fn parse_release_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|raw| !raw.is_empty())
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// The movie's director: first crew member credited with the "Director" job.
fn extract_director(credits: &Credits) -> Option<String> {
    credits
        .crew
        .iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.clone())
}

/// Top billed cast names joined for display.
fn extract_actors(credits: &Credits) -> Option<String> {
    let mut cast: Vec<_> = credits.cast.iter().collect();
    cast.sort_by_key(|member| member.order);

    let names: Vec<&str> = cast
        .iter()
        .take(TOP_BILLED_ACTORS)
        .map(|member| member.name.as_str())
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_pool;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use tmdb::{CastMember, CrewMember, TmdbError};

    fn summary(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: Some("2023-05-10".to_string()),
            vote_average: 8.0,
            vote_count: 100,
            popularity: 10.0,
            genre_ids: vec![],
            original_language: "en".to_string(),
            adult: false,
            video: false,
        }
    }

    fn details(id: i64, title: &str) -> MovieDetails {
        MovieDetails {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            overview: format!("{} overview", title),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: None,
            release_date: Some("2023-05-10".to_string()),
            vote_average: 8.0,
            vote_count: 100,
            popularity: 10.0,
            genres: vec![],
            production_companies: vec![],
            original_language: "en".to_string(),
            adult: false,
            runtime: Some(120),
            status: None,
            tagline: None,
            imdb_id: None,
            homepage: None,
            credits: Some(Credits {
                cast: vec![CastMember {
                    id: 1,
                    name: "Lead Actor".to_string(),
                    character: None,
                    order: 0,
                }],
                crew: vec![CrewMember {
                    id: 2,
                    name: "Jane Director".to_string(),
                    job: "Director".to_string(),
                    department: Some("Directing".to_string()),
                }],
            }),
        }
    }

    /// Scriptable in-memory catalog source.
    #[derive(Default)]
    struct MockCatalogSource {
        pages: Mutex<HashMap<i64, PaginatedResponse<MovieSummary>>>,
        details: Mutex<HashMap<i64, MovieDetails>>,
        failing_pages: HashSet<i64>,
        failing_details: HashSet<i64>,
    }

    impl MockCatalogSource {
        fn with_single_page(entries: Vec<(MovieSummary, MovieDetails)>) -> Self {
            let source = Self::default();
            let summaries = entries.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>();
            source.pages.lock().insert(
                1,
                PaginatedResponse {
                    page: 1,
                    total_pages: 1,
                    total_results: summaries.len() as i64,
                    results: summaries,
                },
            );
            for (_, detail) in entries {
                source.details.lock().insert(detail.id, detail);
            }
            source
        }

        fn set_detail(&self, detail: MovieDetails) {
            self.details.lock().insert(detail.id, detail);
        }
    }

    fn origin_error() -> CatalogError {
        CatalogError::Origin(TmdbError::Api {
            status_code: 503,
            message: "unavailable".to_string(),
        })
    }

    #[async_trait]
    impl CatalogSource for MockCatalogSource {
        async fn list_page(
            &self,
            _year: Option<i32>,
            page: i64,
        ) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
            if self.failing_pages.contains(&page) {
                return Err(origin_error());
            }
            self.pages
                .lock()
                .get(&page)
                .cloned()
                .ok_or_else(origin_error)
        }

        async fn movie_detail(&self, tmdb_id: i64) -> Result<MovieDetails, CatalogError> {
            if self.failing_details.contains(&tmdb_id) {
                return Err(origin_error());
            }
            self.details
                .lock()
                .get(&tmdb_id)
                .cloned()
                .ok_or_else(origin_error)
        }
    }

    #[test]
    fn test_release_year_derivation() {
        let date = parse_release_date(Some("2023-05-10")).unwrap();
        assert_eq!(date.year(), 2023);

        assert_eq!(parse_release_date(Some("")), None);
        assert_eq!(parse_release_date(Some("not a date")), None);
        assert_eq!(parse_release_date(None), None);
    }

    #[test]
    fn test_extract_director_first_match() {
        let credits = Credits {
            cast: vec![],
            crew: vec![
                CrewMember {
                    id: 1,
                    name: "Someone Else".to_string(),
                    job: "Producer".to_string(),
                    department: None,
                },
                CrewMember {
                    id: 2,
                    name: "First Director".to_string(),
                    job: "Director".to_string(),
                    department: None,
                },
                CrewMember {
                    id: 3,
                    name: "Second Director".to_string(),
                    job: "Director".to_string(),
                    department: None,
                },
            ],
        };

        assert_eq!(
            extract_director(&credits),
            Some("First Director".to_string())
        );
        assert_eq!(extract_director(&Credits::default()), None);
    }

    #[test]
    fn test_extract_actors_top_billed() {
        let cast = (0..8)
            .map(|i| CastMember {
                id: i,
                name: format!("Actor {}", i),
                character: None,
                // Reverse billing order to prove sorting happens
                order: 7 - i,
            })
            .collect();
        let credits = Credits { cast, crew: vec![] };

        assert_eq!(
            extract_actors(&credits),
            Some("Actor 7, Actor 6, Actor 5, Actor 4, Actor 3".to_string())
        );
        assert_eq!(extract_actors(&Credits::default()), None);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let pool = memory_pool().await;
        let source = Arc::new(MockCatalogSource::with_single_page(vec![
            (summary(100, "First"), details(100, "First")),
            (summary(200, "Second"), details(200, "Second")),
        ]));
        let service = SyncService::new(pool.clone(), source, 100);

        let first = service.sync(None).await;
        assert_eq!(first.synced, 2);
        assert_eq!(first.failed, 0);
        assert!(!first.aborted);

        let before = MovieRepository::get_by_tmdb_id(&pool, 100)
            .await
            .unwrap()
            .unwrap();

        let second = service.sync(None).await;
        assert_eq!(second.synced, 2);
        assert_eq!(MovieRepository::count_all(&pool).await.unwrap(), 2);

        let after = MovieRepository::get_by_tmdb_id(&pool, 100)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.title, before.title);
        assert_eq!(after.overview, before.overview);
        assert_eq!(after.release_year, Some(2023));
        assert_eq!(after.director, Some("Jane Director".to_string()));
    }

    #[tokio::test]
    async fn test_sync_refreshes_mutable_fields_only() {
        let pool = memory_pool().await;
        let source = Arc::new(MockCatalogSource::with_single_page(vec![(
            summary(100, "Original Title"),
            details(100, "Original Title"),
        )]));
        let service = SyncService::new(pool.clone(), Arc::clone(&source) as _, 100);
        service.sync(None).await;

        // The origin now reports new vote stats and a renamed title.
        let mut changed = details(100, "Renamed Title");
        changed.vote_average = 9.1;
        changed.vote_count = 500;
        source.set_detail(changed);
        service.sync(None).await;

        let movie = MovieRepository::get_by_tmdb_id(&pool, 100)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(movie.vote_average, 9.1);
        assert_eq!(movie.vote_count, 500);
        // The title is not a mutable field; the insert-time value stays.
        assert_eq!(movie.title, "Original Title");
        assert_eq!(MovieRepository::count_all(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_remaining_pages() {
        let pool = memory_pool().await;
        let mut source = MockCatalogSource::default();
        source.pages.lock().insert(
            1,
            PaginatedResponse {
                page: 1,
                total_pages: 3,
                total_results: 60,
                results: vec![summary(100, "First")],
            },
        );
        source.details.lock().insert(100, details(100, "First"));
        source.failing_pages.insert(2);

        let service = SyncService::new(pool.clone(), Arc::new(source), 100);
        let outcome = service.sync(None).await;

        assert!(outcome.aborted);
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.synced, 1);
        assert_eq!(MovieRepository::count_all(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_descriptor_failure_skips_item_but_continues() {
        let pool = memory_pool().await;
        let mut source = MockCatalogSource::with_single_page(vec![
            (summary(100, "Good"), details(100, "Good")),
            (summary(200, "Bad"), details(200, "Bad")),
            (summary(300, "Also Good"), details(300, "Also Good")),
        ]);
        source.failing_details.insert(200);

        let service = SyncService::new(pool.clone(), Arc::new(source), 100);
        let outcome = service.sync(None).await;

        assert!(!outcome.aborted);
        assert_eq!(outcome.synced, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(MovieRepository::count_all(&pool).await.unwrap(), 2);
        assert!(MovieRepository::get_by_tmdb_id(&pool, 200)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_sync_respects_limit() {
        let pool = memory_pool().await;
        let entries: Vec<_> = (1..=30)
            .map(|i| (summary(i, &format!("Movie {}", i)), details(i, &format!("Movie {}", i))))
            .collect();
        let source = MockCatalogSource::with_single_page(entries);

        let service = SyncService::new(pool.clone(), Arc::new(source), 10);
        let outcome = service.sync(None).await;

        assert_eq!(outcome.synced, 10);
        assert_eq!(MovieRepository::count_all(&pool).await.unwrap(), 10);
    }
}
