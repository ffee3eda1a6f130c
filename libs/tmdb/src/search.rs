use crate::{
    models::{MovieSummary, PaginatedResponse},
    TmdbClient,
};

/// Parameters for the movie search endpoint.
#[derive(Debug, Clone, Default)]
pub struct SearchMoviesParams {
    pub query: String,
    pub page: Option<i64>,
    pub year: Option<i32>,
}

impl TmdbClient {
    /// Search for movies by title.
    ///
    /// GET /search/movie
    pub async fn search_movies(
        &self,
        params: SearchMoviesParams,
    ) -> crate::Result<PaginatedResponse<MovieSummary>> {
        let url = self.url("/search/movie");
        let api_key = self.api_key();
        let page = params.page.unwrap_or(1).to_string();

        let mut query = vec![
            ("api_key", api_key.clone()),
            ("language", self.lang.clone()),
            ("query", params.query.clone()),
            ("page", page),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = params.year {
            query.push(("primary_release_year", year.to_string()));
        }

        let response = self.client().get(&url).query(&query).send().await?;
        self.handle_response(response).await
    }
}
