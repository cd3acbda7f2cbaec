//! Gallery flows across modules: captioning into persisted stores, searching
//! by the resulting tags, viewer navigation and the ask pipeline.

mod common;

use std::sync::Arc;

use album_core::chat::{ChatBrain, RouteError, Topic, md_to_html};
use album_core::gallery::{
    Catalog, MediaItem, MediaType, PlaybackCommand, Stage, Viewer, build_album_context, caption_album,
    filter_albums, thumb_for,
};
use album_core::store::{AiTagStore, CaptionStore, JsonFileStore, KeyValueStore, TopicStore};
use album_models::MockProvider;
use common::{chain, service};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(JsonFileStore::open(dir.path().join("state.json")).unwrap())
}

#[test]
fn test_search_by_title_and_curated_tags() {
    let catalog = Catalog::builtin();
    let tags = AiTagStore::new(Arc::new(album_core::store::MemoryStore::new()));

    let found = filter_albums(catalog.albums(), "Sri Lanka Autonomous Driving Dataset", &tags);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "dataset");

    let found = filter_albums(catalog.albums(), "fusion", &tags);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "aavss");
}

#[test]
fn test_thumbnails_for_each_youtube_form() {
    let cover = "https://cdn.example/cover.jpg";
    let still = "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg";

    for src in [
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10",
        "https://youtu.be/dQw4w9WgXcQ",
    ] {
        assert_eq!(thumb_for(&MediaItem::new(MediaType::Youtube, src), cover), still, "{src}");
    }

    assert_eq!(thumb_for(&MediaItem::new(MediaType::Youtube, "not a url"), cover), cover);
    assert_eq!(thumb_for(&MediaItem::new(MediaType::Video, "https://cdn.example/a.mp4"), cover), cover);
    assert_eq!(
        thumb_for(&MediaItem::new(MediaType::Image, "https://cdn.example/a.jpg"), cover),
        "https://cdn.example/a.jpg"
    );
}

#[tokio::test]
async fn test_captions_persist_and_become_searchable() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::builtin();
    let album = catalog.find("dataset").unwrap();

    let vision = Arc::new(
        MockProvider::new("m")
            .with_id("openai")
            .with_reply("A three-wheeler waiting at a junction.")
            .with_reply("tuk-tuk, junction")
            .with_reply("A bus on a rainy street.")
            .with_reply("bus, rain"),
    );
    let ai = service(vec![], chain(&[&vision]));

    {
        let kv = file_store(&dir);
        let report =
            caption_album(album, &*ai, &CaptionStore::new(kv.clone()), &AiTagStore::new(kv)).await;
        assert_eq!(report.captions.len(), 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.tags, vec!["tuk-tuk", "junction", "bus", "rain"]);
    }
    assert_eq!(vision.calls(), 4);

    // A fresh handle reads what the first one wrote.
    let kv = file_store(&dir);
    let captions = CaptionStore::new(kv.clone());
    let ai_tags = AiTagStore::new(kv);
    assert_eq!(
        captions.get(&album.media[0].src).map(|c| c.caption),
        Some("A three-wheeler waiting at a junction.".to_string())
    );

    let found = filter_albums(catalog.albums(), "TUK-TUK", &ai_tags);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "dataset");

    // Second pass is served entirely from the stored captions.
    let report = caption_album(album, &*ai, &captions, &ai_tags).await;
    assert_eq!(report.cached, 2);
    assert_eq!(vision.calls(), 4);
}

#[test]
fn test_viewer_walk_through_album() {
    let album = Catalog::builtin().find("aavss").cloned().unwrap();
    let mut viewer = Viewer::open(album, 0).unwrap().with_origin("https://portfolio.example.io");

    assert!(matches!(viewer.stage(), Stage::Image { .. }));
    assert_eq!(viewer.next(), None);

    let Stage::YouTube { embed_url } = viewer.stage() else {
        panic!("expected the YouTube item");
    };
    assert!(embed_url.contains("enablejsapi=1"));
    assert!(embed_url.contains("origin=https"));

    // Leaving a YouTube item stops it.
    assert_eq!(viewer.next(), Some(PlaybackCommand::Stop));
    assert_eq!(viewer.index(), 2);
    assert_eq!(viewer.next(), None);
    assert_eq!(viewer.index(), 0);

    assert_eq!(viewer.prev(), None);
    assert_eq!(viewer.index(), 2);
    assert_eq!(viewer.swipe(-10.0), None);
    assert_eq!(viewer.index(), 2);
}

#[tokio::test]
async fn test_ask_pipeline_routes_remembers_and_renders() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::builtin();
    let album = catalog.find("aavss").unwrap();
    let brain = ChatBrain::new(TopicStore::new(file_store(&dir)));

    let short = brain.route("hi", None);
    let Err(RouteError::Clarify { choices }) = short else {
        panic!("short question without a topic should ask to clarify");
    };
    assert_eq!(choices.len(), 2);

    let routed = brain.route("Which sensors does it fuse?", Some(album)).unwrap();
    assert_eq!(routed.topic, Some(Topic::Aavss));
    assert!(routed.guarded.ends_with("Q: Which sensors does it fuse?"));

    // The remembered topic survives a reopen of the state file.
    let reopened = ChatBrain::new(TopicStore::new(file_store(&dir)));
    assert_eq!(reopened.stored_topic(), Some(Topic::Aavss));

    let groq = Arc::new(
        MockProvider::new("m").with_id("groq").with_reply("**Sensors:**\n- LiDAR\n- Radar\n- Camera"),
    );
    let ai = service(chain(&[&groq]), vec![]);
    let answer = ai.ask(&routed.guarded, &build_album_context(album)).await.unwrap();
    assert_eq!(answer.provider, "groq");

    let html = md_to_html(&answer.answer);
    assert!(html.contains("<strong>Sensors:</strong>"));
    assert!(html.contains("<ul><li>LiDAR</li><li>Radar</li><li>Camera</li></ul>"));

    let sent = groq.last_messages();
    assert!(sent[1].content.text().contains("Title: Advanced Autonomous Vehicle Safety System"));
}
