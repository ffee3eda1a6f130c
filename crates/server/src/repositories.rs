mod cache;
mod movie;
mod rating;
mod sync_run;

pub use cache::CacheRepository;
pub use movie::MovieRepository;
pub use rating::RatingRepository;
pub use sync_run::SyncRunRepository;
