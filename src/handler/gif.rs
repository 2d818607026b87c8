use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::bridge::{self, Failure, Gif};
use crate::handler::ApiResult;

pub fn gif_router() -> Router {
    Router::new().route("/", get(convert_gif))
}

#[derive(Deserialize)]
struct GifQuery {
    video: Option<String>,
}

async fn convert_gif(Query(query): Query<GifQuery>) -> ApiResult<Response> {
    let url = query
        .video
        .ok_or_else(|| Failure::InvalidInput("missing ?video= parameter".to_string()))?;
    let gif = bridge::shared().convert(&url).await?;
    Ok(([(header::CONTENT_TYPE, Gif::CONTENT_TYPE)], gif.bytes).into_response())
}
