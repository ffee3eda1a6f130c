use utoipa::OpenApi;

use crate::api::handlers::{SyncAccepted, SyncRequest};
use crate::error::ErrorResponse;
use crate::models::{
    Movie, MoviePage, Rating, RatingAverage, RatingPage, SubmitRatingRequest, SyncRun,
    SyncRunStatus, UpdateRatingRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cinehub API",
        version = "1.0.0"
    ),
    tags(
        (name = "movies", description = "Mirrored movie endpoints"),
        (name = "catalog", description = "External catalog endpoints"),
        (name = "ratings", description = "User rating endpoints")
    ),
    components(schemas(
        Movie,
        MoviePage,
        Rating,
        RatingPage,
        RatingAverage,
        SubmitRatingRequest,
        UpdateRatingRequest,
        SyncRun,
        SyncRunStatus,
        SyncRequest,
        SyncAccepted,
        ErrorResponse
    ))
)]
pub struct ApiDoc;
