use crate::provider::SharedProvider;
use crate::tree::{TreeItemId, TreeItemView};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::instrument;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequest {
    pub(crate) focused: Option<TreeItemId>,
    pub(crate) name: String,
}

#[derive(Serialize)]
struct ChangedResponse {
    changed: Vec<TreeItemId>,
}

pub(crate) fn missing_argument(name: &str) -> Response {
    tracing::error!("Query missing {} argument", name);
    warp::reply::with_status(
        warp::reply::json(&format!("Missing {} argument", name)),
        StatusCode::BAD_REQUEST,
    )
    .into_response()
}

#[instrument(name = "handlers.get_version", level = "info")]
pub(crate) async fn get_version() -> Result<Response, Infallible> {
    Ok(warp::reply::with_status(
        warp::reply::json(&env!("CARGO_PKG_VERSION").to_string()),
        StatusCode::OK,
    )
    .into_response())
}

#[instrument(name = "handlers.get_item", level = "info", skip(provider))]
pub(crate) async fn get_item(provider: SharedProvider, id: String) -> Result<Response, Infallible> {
    let item = provider.lock().await.get_tree_item(&id).await;
    match item {
        Ok(item) => Ok(warp::reply::json(&TreeItemView::from(&item)).into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.get_items", level = "info", skip(provider))]
pub(crate) async fn get_items(
    provider: SharedProvider,
    ids: Vec<TreeItemId>,
) -> Result<Response, Infallible> {
    let items = provider.lock().await.get_tree_items(&ids).await;
    match items {
        Ok(items) => {
            let views: Vec<TreeItemView> = items.iter().map(TreeItemView::from).collect();
            Ok(warp::reply::json(&views).into_response())
        }
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.change_children", level = "info", skip(provider))]
pub(crate) async fn change_children(
    provider: SharedProvider,
    id: String,
    children: Vec<TreeItemId>,
) -> Result<Response, Infallible> {
    let result = provider
        .lock()
        .await
        .on_change_item_children(&id, &children)
        .await;
    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.rename_item", level = "info", skip(provider))]
pub(crate) async fn rename_item(
    provider: SharedProvider,
    id: String,
    name: String,
) -> Result<Response, Infallible> {
    let mut guard = provider.lock().await;
    let mut item = match guard.get_tree_item(&id).await {
        Ok(item) => item,
        Err(e) => return Ok(e.into_response()),
    };
    match guard.on_rename_item(&mut item, &name).await {
        Ok(()) => Ok(warp::reply::json(&TreeItemView::from(&item)).into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.create_folder", level = "info", skip(provider))]
pub(crate) async fn create_folder(
    provider: SharedProvider,
    request: CreateRequest,
) -> Result<Response, Infallible> {
    let created = provider
        .lock()
        .await
        .create_folder(request.focused.as_deref(), &request.name)
        .await;
    match created {
        Ok(item) => Ok(warp::reply::with_status(
            warp::reply::json(&TreeItemView::from(&item)),
            StatusCode::CREATED,
        )
        .into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.create_file", level = "info", skip(provider))]
pub(crate) async fn create_file(
    provider: SharedProvider,
    request: CreateRequest,
) -> Result<Response, Infallible> {
    let created = provider
        .lock()
        .await
        .create_file(request.focused.as_deref(), &request.name)
        .await;
    match created {
        Ok(item) => Ok(warp::reply::with_status(
            warp::reply::json(&TreeItemView::from(&item)),
            StatusCode::CREATED,
        )
        .into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(name = "handlers.read_content", level = "info", skip(provider))]
pub(crate) async fn read_content(
    provider: SharedProvider,
    id: String,
) -> Result<Response, Infallible> {
    let content = provider.lock().await.read_item_content(&id).await;
    match content {
        Ok(data) => Ok(Response::new(data.into())),
        Err(e) => Ok(e.into_response()),
    }
}

#[instrument(
    name = "handlers.write_content",
    level = "info",
    skip(provider, body),
    fields(bytes = body.len())
)]
pub(crate) async fn write_content(
    provider: SharedProvider,
    id: String,
    body: Bytes,
) -> Result<Response, Infallible> {
    let result = provider.lock().await.write_item_content(&id, &body).await;
    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Ok(e.into_response()),
    }
}

/// Stream tree change notifications as server-sent events. The listener is
/// removed when the client goes away and the stream is dropped.
#[instrument(name = "handlers.subscribe", level = "info", skip(provider))]
pub(crate) async fn subscribe(provider: SharedProvider) -> Result<Response, Infallible> {
    let (tx, rx) = mpsc::unbounded_channel::<Vec<TreeItemId>>();
    let subscription = provider
        .lock()
        .await
        .on_did_change_tree_data(move |changed: &[TreeItemId]| {
            let _ = tx.send(changed.to_vec());
        });
    tracing::info!("Tree change subscriber connected");

    let events = UnboundedReceiverStream::new(rx).map(move |changed| {
        let _subscription = &subscription;
        let payload = serde_json::to_string(&ChangedResponse { changed }).unwrap_or_default();
        Ok::<_, Infallible>(warp::sse::Event::default().event("changed").data(payload))
    });
    Ok(warp::sse::reply(warp::sse::keep_alive().stream(events)).into_response())
}
