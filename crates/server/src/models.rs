mod movie;
mod rating;
mod sync_run;

pub use movie::{Movie, MoviePage, MovieRow, UpsertMovie};
pub use rating::{
    Rating, RatingAverage, RatingPage, SubmitRatingRequest, UpdateRatingRequest,
};
pub use sync_run::{SyncRun, SyncRunRow, SyncRunStatus};
