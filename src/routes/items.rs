use crate::handlers;
use crate::provider::SharedProvider;
use crate::tree::TreeItemId;
use std::collections::HashMap;
use std::convert::Infallible;
use warp::reply::Response;
use warp::Filter;

const MAX_CONTENT_BYTES: u64 = 16 * 1024 * 1024;
const MAX_JSON_BYTES: u64 = 1024 * 1024;

pub(super) fn routes(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_item(provider.clone())
        .or(get_items(provider.clone()))
        .or(change_children(provider.clone()))
        .or(rename_item(provider.clone()))
        .or(read_content(provider.clone()))
        .or(write_content(provider.clone()))
}

fn get_item(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("item")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and_then(move |mut params: HashMap<String, String>| {
            let provider = provider.clone();
            async move {
                match params.remove("id") {
                    Some(id) => handlers::get_item(provider, id).await,
                    None => Ok::<Response, Infallible>(handlers::missing_argument("id")),
                }
            }
        })
}

fn get_items(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("items")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_JSON_BYTES))
        .and(warp::body::json::<Vec<TreeItemId>>())
        .and_then(move |ids: Vec<TreeItemId>| handlers::get_items(provider.clone(), ids))
}

fn change_children(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("item" / "children")
        .and(warp::put())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::body::content_length_limit(MAX_JSON_BYTES))
        .and(warp::body::json::<Vec<TreeItemId>>())
        .and_then(
            move |mut params: HashMap<String, String>, children: Vec<TreeItemId>| {
                let provider = provider.clone();
                async move {
                    match params.remove("id") {
                        Some(id) => handlers::change_children(provider, id, children).await,
                        None => Ok::<Response, Infallible>(handlers::missing_argument("id")),
                    }
                }
            },
        )
}

fn rename_item(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("item" / "rename")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and_then(move |mut params: HashMap<String, String>| {
            let provider = provider.clone();
            async move {
                let id = match params.remove("id") {
                    Some(id) => id,
                    None => return Ok::<Response, Infallible>(handlers::missing_argument("id")),
                };
                match params.remove("name") {
                    Some(name) => handlers::rename_item(provider, id, name).await,
                    None => Ok(handlers::missing_argument("name")),
                }
            }
        })
}

fn read_content(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("item" / "content")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and_then(move |mut params: HashMap<String, String>| {
            let provider = provider.clone();
            async move {
                match params.remove("id") {
                    Some(id) => handlers::read_content(provider, id).await,
                    None => Ok::<Response, Infallible>(handlers::missing_argument("id")),
                }
            }
        })
}

fn write_content(
    provider: SharedProvider,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("item" / "content")
        .and(warp::put())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::body::content_length_limit(MAX_CONTENT_BYTES))
        .and(warp::body::bytes())
        .and_then(
            move |mut params: HashMap<String, String>, body: bytes::Bytes| {
                let provider = provider.clone();
                async move {
                    match params.remove("id") {
                        Some(id) => handlers::write_content(provider, id, body).await,
                        None => Ok::<Response, Infallible>(handlers::missing_argument("id")),
                    }
                }
            },
        )
}
