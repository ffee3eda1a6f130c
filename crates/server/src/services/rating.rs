use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use thiserror::Error;

use super::cache::CacheService;
use crate::auth::{Identity, Role};
use crate::models::{Rating, RatingAverage, SubmitRatingRequest, UpdateRatingRequest};
use crate::repositories::RatingRepository;

/// Longest accepted rating comment
const MAX_COMMENT_LENGTH: usize = 1000;

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Rating not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(&'static str),
}

/// Rating lifecycle and average aggregation.
///
/// Every mutation synchronously removes the movie's cached average before the
/// call returns, keeping the read cache bounded-stale. The one-row-per-
/// (user, movie) invariant is enforced by the storage layer's unique
/// constraint, not by application-level checks.
pub struct RatingService {
    db: SqlitePool,
    cache: Arc<CacheService>,
    auto_approve: bool,
    average_ttl: Duration,
}

impl RatingService {
    pub fn new(
        db: SqlitePool,
        cache: Arc<CacheService>,
        auto_approve: bool,
        average_ttl: Duration,
    ) -> Self {
        Self {
            db,
            cache,
            auto_approve,
            average_ttl,
        }
    }

    /// Create or update the caller's rating for a movie.
    ///
    /// Returns the persisted row and whether it was newly created. The write
    /// itself is a single atomic upsert; the preceding lookup only shapes the
    /// response status. New rows take their approval state from the
    /// configured default; updated rows keep theirs.
    pub async fn submit(
        &self,
        identity: &Identity,
        request: SubmitRatingRequest,
    ) -> Result<(Rating, bool), RatingError> {
        validate_rating_value(request.rating)?;
        validate_comment(request.comment.as_deref())?;

        let existing = RatingRepository::get_by_user_and_movie(
            &self.db,
            identity.user_id,
            request.movie_id,
        )
        .await?;

        let rating = RatingRepository::upsert(
            &self.db,
            identity.user_id,
            request.movie_id,
            request.rating,
            request.comment.as_deref(),
            self.auto_approve,
        )
        .await?;

        self.invalidate_average(request.movie_id).await;

        Ok((rating, existing.is_none()))
    }

    /// Update an existing rating. Only the owning user may do this.
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        request: UpdateRatingRequest,
    ) -> Result<Rating, RatingError> {
        if let Some(value) = request.rating {
            validate_rating_value(value)?;
        }
        validate_comment(request.comment.as_deref())?;

        let rating = RatingRepository::get_by_id(&self.db, id)
            .await?
            .ok_or(RatingError::NotFound)?;

        if rating.user_id != identity.user_id {
            return Err(RatingError::Forbidden(
                "You can only update your own ratings",
            ));
        }

        let updated =
            RatingRepository::update(&self.db, id, request.rating, request.comment.as_deref())
                .await?
                .ok_or(RatingError::NotFound)?;

        self.invalidate_average(rating.movie_id).await;

        Ok(updated)
    }

    /// Delete a rating. Only the owning user may do this.
    pub async fn delete(&self, identity: &Identity, id: i64) -> Result<(), RatingError> {
        let rating = RatingRepository::get_by_id(&self.db, id)
            .await?
            .ok_or(RatingError::NotFound)?;

        if rating.user_id != identity.user_id {
            return Err(RatingError::Forbidden(
                "You can only delete your own ratings",
            ));
        }

        if !RatingRepository::delete(&self.db, id).await? {
            return Err(RatingError::NotFound);
        }

        self.invalidate_average(rating.movie_id).await;

        Ok(())
    }

    /// Approve a pending rating. Admin role only; approving an already
    /// approved rating is a no-op.
    pub async fn approve(&self, identity: &Identity, id: i64) -> Result<Rating, RatingError> {
        if identity.role != Role::Admin {
            return Err(RatingError::Forbidden("Only admins can approve ratings"));
        }

        let approved = RatingRepository::approve(&self.db, id)
            .await?
            .ok_or(RatingError::NotFound)?;

        self.invalidate_average(approved.movie_id).await;

        Ok(approved)
    }

    /// The movie's average over approved ratings, served from the cache when
    /// a fresh entry exists and recomputed (then cached) otherwise.
    pub async fn average(&self, movie_id: i64) -> Result<RatingAverage, RatingError> {
        let key = average_cache_key(movie_id);

        if let Some(cached) = self.cache.get_json::<RatingAverage>(&key).await {
            return Ok(cached);
        }

        let (average, count) = RatingRepository::average_for_movie(&self.db, movie_id).await?;
        let result = RatingAverage {
            movie_id,
            average_rating: round_to_one_decimal(average.unwrap_or(0.0)),
            total_ratings: count,
        };

        self.cache.put_json(&key, &result, self.average_ttl).await;

        Ok(result)
    }

    /// Drop the movie's cached average. Completes before the surrounding
    /// mutation reports success; store failures are logged and swallowed.
    async fn invalidate_average(&self, movie_id: i64) {
        self.cache.invalidate(&average_cache_key(movie_id)).await;
    }
}

fn average_cache_key(movie_id: i64) -> String {
    format!("movie:{}:average_rating", movie_id)
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn validate_rating_value(value: i64) -> Result<(), RatingError> {
    if !(1..=10).contains(&value) {
        return Err(RatingError::Validation(
            "rating must be between 1 and 10".to_string(),
        ));
    }
    Ok(())
}

fn validate_comment(comment: Option<&str>) -> Result<(), RatingError> {
    if comment.is_some_and(|comment| comment.len() > MAX_COMMENT_LENGTH) {
        return Err(RatingError::Validation(format!(
            "comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryCacheStore;
    use crate::test_utils::memory_pool;

    fn user(user_id: i64) -> Identity {
        Identity {
            user_id,
            role: Role::User,
        }
    }

    fn admin(user_id: i64) -> Identity {
        Identity {
            user_id,
            role: Role::Admin,
        }
    }

    fn submit_request(movie_id: i64, rating: i64) -> SubmitRatingRequest {
        SubmitRatingRequest {
            movie_id,
            rating,
            comment: None,
        }
    }

    async fn service(auto_approve: bool) -> (RatingService, SqlitePool) {
        let pool = memory_pool().await;
        let cache = Arc::new(CacheService::new(Arc::new(MemoryCacheStore::new())));
        let service = RatingService::new(
            pool.clone(),
            cache,
            auto_approve,
            Duration::from_secs(3600),
        );
        (service, pool)
    }

    #[test]
    fn test_round_to_one_decimal() {
        assert_eq!(round_to_one_decimal(8.0), 8.0);
        assert_eq!(round_to_one_decimal(25.0 / 3.0), 8.3);
        assert_eq!(round_to_one_decimal(7.25), 7.3);
        assert_eq!(round_to_one_decimal(0.0), 0.0);
    }

    #[tokio::test]
    async fn test_submit_creates_then_updates_single_row() {
        let (service, pool) = service(true).await;

        let (created, was_created) = service.submit(&user(1), submit_request(10, 8)).await.unwrap();
        assert!(was_created);
        assert_eq!(created.rating, 8);

        let (updated, was_created) = service.submit(&user(1), submit_request(10, 5)).await.unwrap();
        assert!(!was_created);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.rating, 5);

        assert_eq!(
            RatingRepository::count(&pool, Some(1), Some(10)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_concurrent_submissions_keep_single_row() {
        let (service, pool) = service(true).await;

        let u = user(1);
        let (a, b) = tokio::join!(
            service.submit(&u, submit_request(10, 8)),
            service.submit(&u, submit_request(10, 6)),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        assert_eq!(
            RatingRepository::count(&pool, Some(1), Some(10)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_out_of_range_values() {
        let (service, _pool) = service(true).await;

        for value in [0, 11, -3] {
            let result = service.submit(&user(1), submit_request(10, value)).await;
            assert!(matches!(result, Err(RatingError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_average_computation() {
        let (service, _pool) = service(true).await;

        service.submit(&user(1), submit_request(10, 8)).await.unwrap();
        service.submit(&user(2), submit_request(10, 7)).await.unwrap();
        service.submit(&user(3), submit_request(10, 9)).await.unwrap();

        let average = service.average(10).await.unwrap();
        assert_eq!(average.average_rating, 8.0);
        assert_eq!(average.total_ratings, 3);
    }

    #[tokio::test]
    async fn test_average_of_unrated_movie_is_zero() {
        let (service, _pool) = service(true).await;

        let average = service.average(99).await.unwrap();
        assert_eq!(average.average_rating, 0.0);
        assert_eq!(average.total_ratings, 0);
    }

    #[tokio::test]
    async fn test_average_is_rounded_to_one_decimal() {
        let (service, _pool) = service(true).await;

        service.submit(&user(1), submit_request(10, 8)).await.unwrap();
        service.submit(&user(2), submit_request(10, 8)).await.unwrap();
        service.submit(&user(3), submit_request(10, 9)).await.unwrap();

        let average = service.average(10).await.unwrap();
        assert_eq!(average.average_rating, 8.3);
    }

    #[tokio::test]
    async fn test_average_served_from_cache_until_invalidated() {
        let (service, pool) = service(true).await;

        service.submit(&user(1), submit_request(10, 8)).await.unwrap();
        let first = service.average(10).await.unwrap();
        assert_eq!(first.average_rating, 8.0);

        // Bypassing the service leaves the cached value in place.
        RatingRepository::delete(&pool, 1).await.unwrap();
        let stale = service.average(10).await.unwrap();
        assert_eq!(stale.average_rating, 8.0);

        // A mutation through the service invalidates before returning.
        service.submit(&user(2), submit_request(10, 4)).await.unwrap();
        let fresh = service.average(10).await.unwrap();
        assert_eq!(fresh.average_rating, 4.0);
        assert_eq!(fresh.total_ratings, 1);
    }

    #[tokio::test]
    async fn test_every_mutation_invalidates_the_average() {
        let (service, _pool) = service(true).await;

        let (rating, _) = service.submit(&user(1), submit_request(10, 8)).await.unwrap();
        assert_eq!(service.average(10).await.unwrap().average_rating, 8.0);

        service
            .update(
                &user(1),
                rating.id,
                UpdateRatingRequest {
                    rating: Some(6),
                    comment: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(service.average(10).await.unwrap().average_rating, 6.0);

        service.delete(&user(1), rating.id).await.unwrap();
        let after_delete = service.average(10).await.unwrap();
        assert_eq!(after_delete.average_rating, 0.0);
        assert_eq!(after_delete.total_ratings, 0);
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let (service, _pool) = service(true).await;

        let (rating, _) = service.submit(&user(1), submit_request(10, 8)).await.unwrap();

        let result = service
            .update(
                &user(2),
                rating.id,
                UpdateRatingRequest {
                    rating: Some(1),
                    comment: None,
                },
            )
            .await;
        assert!(matches!(result, Err(RatingError::Forbidden(_))));

        // No mutation happened.
        let unchanged = RatingRepository::get_by_id(&service.db, rating.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.rating, 8);
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let (service, pool) = service(true).await;

        let (rating, _) = service.submit(&user(1), submit_request(10, 8)).await.unwrap();

        let result = service.delete(&user(2), rating.id).await;
        assert!(matches!(result, Err(RatingError::Forbidden(_))));
        assert!(RatingRepository::get_by_id(&pool, rating.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_approve_is_admin_only_and_idempotent() {
        let (service, _pool) = service(false).await;

        let (rating, _) = service.submit(&user(1), submit_request(10, 8)).await.unwrap();
        assert!(!rating.is_approved);

        let result = service.approve(&user(1), rating.id).await;
        assert!(matches!(result, Err(RatingError::Forbidden(_))));

        let approved = service.approve(&admin(42), rating.id).await.unwrap();
        assert!(approved.is_approved);

        let again = service.approve(&admin(42), rating.id).await.unwrap();
        assert!(again.is_approved);
    }

    #[tokio::test]
    async fn test_unapproved_ratings_are_excluded_from_average() {
        let (service, _pool) = service(false).await;

        let (rating, _) = service.submit(&user(1), submit_request(10, 9)).await.unwrap();

        let pending = service.average(10).await.unwrap();
        assert_eq!(pending.average_rating, 0.0);
        assert_eq!(pending.total_ratings, 0);

        service.approve(&admin(42), rating.id).await.unwrap();

        let approved = service.average(10).await.unwrap();
        assert_eq!(approved.average_rating, 9.0);
        assert_eq!(approved.total_ratings, 1);
    }

    #[tokio::test]
    async fn test_update_of_unknown_rating_is_not_found() {
        let (service, _pool) = service(true).await;

        let result = service
            .update(
                &user(1),
                999,
                UpdateRatingRequest {
                    rating: Some(5),
                    comment: None,
                },
            )
            .await;
        assert!(matches!(result, Err(RatingError::NotFound)));
    }
}
