use crate::{models::MovieDetails, TmdbClient};

impl TmdbClient {
    /// Get movie details with credits appended
    ///
    /// GET /movie/{movie_id}?append_to_response=credits
    pub async fn get_movie(&self, movie_id: i64) -> crate::Result<MovieDetails> {
        let url = self.url(&format!("/movie/{}", movie_id));
        let api_key = self.api_key();
        let response = self
            .client()
            .get(&url)
            .query(&[
                ("api_key", api_key.as_str()),
                ("language", self.lang.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;
        self.handle_response(response).await
    }
}
