mod items;
mod tree;

use crate::provider::SharedProvider;
use warp::Filter;

pub fn routes(
    provider: SharedProvider,
) -> impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    tree::routes(provider.clone())
        .or(items::routes(provider.clone()))
        .with(warp::trace::request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::VirtualFileTreeProvider;
    use crate::store::{BackingStore, MemoryStore};
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use warp::http::StatusCode;

    async fn seeded() -> (SharedProvider, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.write(Path::new("yanta-notes/a.md"), b"alpha").await.unwrap();
        store.create_dir(Path::new("yanta-notes/journal")).await.unwrap();
        let provider = VirtualFileTreeProvider::new(store.clone());
        (Arc::new(Mutex::new(provider)), store)
    }

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn get_item_returns_the_root() {
        let (provider, _) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("GET")
            .path("/item?id=yanta-notes")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let item = body_json(res.body());
        assert_eq!(item["index"], "yanta-notes");
        assert_eq!(item["isFolder"], true);
        assert_eq!(item["children"], json!(["a.md", "journal"]));
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (provider, _) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("GET")
            .path("/item?id=nope.md")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = warp::test::request()
            .method("GET")
            .path("/item")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_items_in_request_order() {
        let (provider, _) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("POST")
            .path("/items")
            .json(&json!(["journal", "a.md"]))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let items = body_json(res.body());
        assert_eq!(items[0]["index"], "journal");
        assert_eq!(items[1]["index"], "a.md");
        assert_eq!(items[1]["isFolder"], false);
    }

    #[tokio::test]
    async fn create_file_then_conflict() {
        let (provider, store) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("POST")
            .path("/files")
            .json(&json!({"focused": "journal", "name": "monday.md"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(store
            .exists(Path::new("yanta-notes/journal/monday.md"))
            .await
            .unwrap());

        let res = warp::test::request()
            .method("POST")
            .path("/folders")
            .json(&json!({"focused": "journal", "name": "monday.md"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn rename_returns_the_renamed_item() {
        let (provider, store) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("POST")
            .path("/item/rename?id=a.md&name=b.md")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res.body())["index"], "b.md");
        assert!(store.exists(Path::new("yanta-notes/b.md")).await.unwrap());

        let res = warp::test::request()
            .method("GET")
            .path("/item?id=a.md")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn content_can_be_written_and_read() {
        let (provider, _) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("PUT")
            .path("/item/content?id=a.md")
            .body("# updated")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = warp::test::request()
            .method("GET")
            .path("/item/content?id=a.md")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"# updated");
    }

    #[tokio::test]
    async fn children_change_is_acknowledged() {
        let (provider, _) = seeded().await;
        let api = routes(provider);

        let res = warp::test::request()
            .method("PUT")
            .path("/item/children?id=yanta-notes")
            .json(&json!(["journal", "a.md"]))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
