use crate::handlers::{self, CreateRequest};
use crate::provider::SharedProvider;
use warp::Filter;

const MAX_JSON_BYTES: u64 = 64 * 1024;

pub(super) fn routes(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_version()
        .or(create_folder(provider.clone()))
        .or(create_file(provider.clone()))
        .or(events(provider.clone()))
}

fn get_version() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("version")
        .and(warp::get())
        .and_then(handlers::get_version)
}

fn create_folder(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("folders")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_JSON_BYTES))
        .and(warp::body::json::<CreateRequest>())
        .and_then(move |request: CreateRequest| handlers::create_folder(provider.clone(), request))
}

fn create_file(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("files")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_JSON_BYTES))
        .and(warp::body::json::<CreateRequest>())
        .and_then(move |request: CreateRequest| handlers::create_file(provider.clone(), request))
}

fn events(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("events")
        .and(warp::get())
        .and_then(move || handlers::subscribe(provider.clone()))
}
