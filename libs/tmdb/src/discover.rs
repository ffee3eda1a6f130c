use crate::{
    models::{MovieSummary, PaginatedResponse},
    TmdbClient,
};

/// Parameters for the movie discover endpoint.
#[derive(Debug, Clone, Default)]
pub struct DiscoverMoviesParams {
    pub primary_release_year: Option<i32>,
    pub page: Option<i64>,
    pub sort_by: Option<String>,
}

impl TmdbClient {
    /// Discover movies with filters.
    ///
    /// GET /discover/movie
    pub async fn discover_movies(
        &self,
        params: DiscoverMoviesParams,
    ) -> crate::Result<PaginatedResponse<MovieSummary>> {
        let url = self.url("/discover/movie");
        let api_key = self.api_key();
        let page = params.page.unwrap_or(1).to_string();

        let mut query = vec![
            ("api_key", api_key.clone()),
            ("language", self.lang.clone()),
            ("page", page),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = params.primary_release_year {
            query.push(("primary_release_year", year.to_string()));
        }
        if let Some(sort_by) = &params.sort_by {
            query.push(("sort_by", sort_by.clone()));
        }

        let response = self.client().get(&url).query(&query).send().await?;
        self.handle_response(response).await
    }
}
