use crate::{
    models::{MovieSummary, PaginatedResponse},
    TmdbClient,
};

impl TmdbClient {
    /// Get popular movies.
    ///
    /// GET /movie/popular
    pub async fn popular_movies(&self, page: i64) -> crate::Result<PaginatedResponse<MovieSummary>> {
        self.movie_listing("/movie/popular", page).await
    }

    /// Get top rated movies.
    ///
    /// GET /movie/top_rated
    pub async fn top_rated_movies(
        &self,
        page: i64,
    ) -> crate::Result<PaginatedResponse<MovieSummary>> {
        self.movie_listing("/movie/top_rated", page).await
    }

    /// Get upcoming movies.
    ///
    /// GET /movie/upcoming
    pub async fn upcoming_movies(
        &self,
        page: i64,
    ) -> crate::Result<PaginatedResponse<MovieSummary>> {
        self.movie_listing("/movie/upcoming", page).await
    }

    async fn movie_listing(
        &self,
        path: &str,
        page: i64,
    ) -> crate::Result<PaginatedResponse<MovieSummary>> {
        let url = self.url(path);
        let api_key = self.api_key();
        let page = page.to_string();
        let response = self
            .client()
            .get(&url)
            .query(&[
                ("api_key", api_key.as_str()),
                ("language", self.lang.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;
        self.handle_response(response).await
    }
}
