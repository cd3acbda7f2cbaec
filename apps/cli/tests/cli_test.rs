//! Integration tests for the `album` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// An `album` command isolated from the user's config and state.
fn album(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("album").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("ALBUM_API_BASE")
        .env_remove("ALBUM_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_albums_lists_builtin_catalog() {
    let home = TempDir::new().unwrap();
    album(&home)
        .arg("albums")
        .assert()
        .success()
        .stdout(predicate::str::contains("aavss"))
        .stdout(predicate::str::contains("Sri Lanka Autonomous Driving Dataset"))
        .stdout(predicate::str::contains("img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"));
}

#[test]
fn test_albums_json() {
    let home = TempDir::new().unwrap();
    let output = album(&home).args(["albums", "--json"]).assert().success().get_output().stdout.clone();
    let albums: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(albums.as_array().unwrap().len(), 2);
    assert_eq!(albums[0]["media"][1]["type"], "youtube");
}

#[test]
fn test_custom_catalog() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("albums.json");
    std::fs::write(
        &path,
        r#"[{"id":"boats","title":"Harbour Boats","tags":["sea"],"media":[{"type":"image","src":"https://x/b.jpg"}]}]"#,
    )
    .unwrap();

    album(&home)
        .arg("--catalog")
        .arg(&path)
        .args(["search", "harbour"])
        .assert()
        .success()
        .stdout(predicate::str::contains("boats"));
}

#[test]
fn test_search() {
    let home = TempDir::new().unwrap();
    album(&home)
        .args(["search", "--json", "JETSON"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""albums":["aavss"]"#));

    album(&home)
        .args(["search", "submarine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No albums match"));
}

#[test]
fn test_thumb() {
    let home = TempDir::new().unwrap();
    album(&home)
        .args(["thumb", "https://youtu.be/3JZ_D3ELwOQ"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://img.youtube.com/vi/3JZ_D3ELwOQ/hqdefault.jpg"))
        .stdout(predicate::str::contains("enablejsapi=1"));

    album(&home)
        .args(["thumb", "--type", "youtube", "--fallback", "https://x/cover.jpg", "not-a-url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://x/cover.jpg"));

    album(&home).args(["thumb", "--type", "gif", "https://x/a.gif"]).assert().failure();
}

#[test]
fn test_short_question_asks_for_topic() {
    let home = TempDir::new().unwrap();
    album(&home)
        .args(["--api-base", "http://127.0.0.1:9", "ask", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Which topic"))
        .stdout(predicate::str::contains("--topic AAVSS"));
}

#[test]
fn test_ask_against_server() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/ai")
        .match_body(mockito::Matcher::PartialJsonString(r#"{"mode":"ask"}"#.to_string()))
        .with_status(200)
        .with_body(r#"{"answer":"**Sensors:**\n- LiDAR\n- Radar","provider":"groq"}"#)
        .create();

    album(&home)
        .args(["--api-base", &server.url(), "ask", "What", "sensors", "does", "AAVSS", "use?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AAVSS via groq"))
        .stdout(predicate::str::contains("• LiDAR"));
    mock.assert();

    // The detected topic is remembered for the next question.
    let state = std::fs::read_to_string(home.path().join(".album/state.json")).unwrap();
    assert!(state.contains("AAVSS"));
}

#[test]
fn test_long_question_within_limit_is_sent() {
    let home = TempDir::new().unwrap();
    let question = format!("AAVSS {}", "sensor ".repeat(270));
    assert!((1800..=2000).contains(&question.trim().chars().count()));

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/ai")
        .match_body(mockito::Matcher::Regex(r#""question":"AAVSS sensor"#.to_string()))
        .with_status(200)
        .with_body(r#"{"answer":"Fusion of all of them.","provider":"groq"}"#)
        .create();

    album(&home)
        .args(["--api-base", &server.url(), "ask", &question])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fusion of all of them."));
    mock.assert();
}

#[test]
fn test_overlong_question_is_rejected_locally() {
    let home = TempDir::new().unwrap();
    album(&home)
        .args(["--api-base", "http://127.0.0.1:9", "ask", &"why ".repeat(501)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Question too long"));
}

#[test]
fn test_server_error_is_reported() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/api/ai")
        .with_status(502)
        .with_body(r#"{"error":"All providers failed."}"#)
        .expect_at_least(1)
        .create();

    album(&home)
        .args(["--api-base", &server.url(), "caption", "https://x/a.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("All providers failed."));
}

#[test]
fn test_caption_requires_target() {
    let home = TempDir::new().unwrap();
    album(&home).arg("caption").assert().failure();
}

#[test]
fn test_health_unreachable() {
    let home = TempDir::new().unwrap();
    album(&home)
        .args(["--api-base", "http://127.0.0.1:9", "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unreachable"));
}
