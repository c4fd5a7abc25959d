use mockito::{Matcher, Server};
use signboard_translator::utils::{ServerConfig, UploadConfig};
use signboard_translator::{
    AutoConfirm, DeleteOutcome, EntryId, HistoryBrowser, HttpBackend, ImageFile, LoadState,
    SessionPhase, SignboardError, TranslationSession,
};

fn backend_for(server: &Server) -> HttpBackend {
    HttpBackend::new(&ServerConfig {
        base_url: server.url(),
        ..ServerConfig::default()
    })
    .unwrap()
}

fn entry_json(id: u32, name: &str) -> String {
    format!(
        r#"{{"id": {id}, "original_filename": "{name}", "image_size": 2048,
            "image_dimensions": "640x480", "processing_time": 1.0,
            "created_at": "2024-06-02T08:15:00",
            "original_texts": ["Sortie"], "translated_texts": ["Exit"]}}"#
    )
}

fn page_json(entries: &[String], pages: u32) -> String {
    format!(
        r#"{{"translations": [{}], "pages": {}}}"#,
        entries.join(","),
        pages
    )
}

#[tokio::test]
async fn upload_then_retry_after_malformed_answer() {
    let mut server = Server::new_async().await;
    let malformed = server
        .mock("POST", "/api/translate")
        .with_status(200)
        .with_body(r#"{"original_texts": ["A", "B"], "translated_texts": ["X"]}"#)
        .expect(1)
        .create_async()
        .await;

    let backend = backend_for(&server);
    let preview_dir = tempfile::tempdir().unwrap();
    let mut session = TranslationSession::new(&UploadConfig {
        preview_dir: Some(preview_dir.path().to_path_buf()),
        ..UploadConfig::default()
    });

    let image = ImageFile::new("menu.jpg", "image/jpeg", b"jpeg-bytes".to_vec());
    assert_eq!(session.select_file(Some(image)), SessionPhase::FileSelected);
    assert!(session.preview_path().unwrap().exists());

    assert_eq!(session.submit(&backend).await, SessionPhase::Failed);
    assert!(matches!(
        session.error(),
        Some(SignboardError::MalformedResponse(_))
    ));
    assert!(session.result().is_none());
    malformed.assert_async().await;
    malformed.remove_async().await;

    server
        .mock("POST", "/api/translate")
        .with_status(200)
        .with_body(
            r#"{"original_texts": ["Menü"], "translated_texts": ["Menu"],
                "processed_image": null, "processing_time": 0.9}"#,
        )
        .create_async()
        .await;

    assert_eq!(session.submit(&backend).await, SessionPhase::Succeeded);
    assert!(session.error().is_none());
    assert_eq!(session.result().unwrap().translated_texts()[0], "Menu");
}

#[tokio::test]
async fn browse_delete_and_clear_history() {
    let mut server = Server::new_async().await;
    let backend = backend_for(&server);

    let first_page = server
        .mock("GET", "/api/history")
        .match_query(Matcher::UrlEncoded("page".to_string(), "1".to_string()))
        .with_status(200)
        .with_body(page_json(&[entry_json(1, "a.png"), entry_json(2, "b.png")], 1))
        .expect(1)
        .create_async()
        .await;
    let stats = server
        .mock("GET", "/api/stats")
        .with_status(200)
        .with_body(r#"{"total_translations": 2, "average_processing_time": 1.0}"#)
        .expect(1)
        .create_async()
        .await;

    let mut browser = HistoryBrowser::new(10);
    browser.open(&backend).await;
    first_page.assert_async().await;
    stats.assert_async().await;
    assert_eq!(browser.entries().len(), 2);
    assert!(browser.select(&EntryId::new("1")));

    // Delete the selected entry; list and stats are reloaded.
    server
        .mock("DELETE", "/api/history/1")
        .with_status(200)
        .with_body(r#"{"message": "Translation deleted successfully"}"#)
        .create_async()
        .await;
    first_page.remove_async().await;
    stats.remove_async().await;
    server
        .mock("GET", "/api/history")
        .match_query(Matcher::UrlEncoded("page".to_string(), "1".to_string()))
        .with_status(200)
        .with_body(page_json(&[entry_json(2, "b.png")], 1))
        .create_async()
        .await;
    let stats_after_delete = server
        .mock("GET", "/api/stats")
        .with_status(200)
        .with_body(r#"{"total_translations": 1, "average_processing_time": 1.0}"#)
        .create_async()
        .await;

    let outcome = browser
        .delete_one(&backend, &EntryId::new("1"), &AutoConfirm)
        .await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(browser.selected().is_none());
    assert_eq!(browser.entries().len(), 1);
    assert_eq!(browser.stats().unwrap().total_translations, 1);

    // A failing clear leaves everything in place.
    let failing_clear = server
        .mock("DELETE", "/api/history/clear")
        .with_status(500)
        .with_body(r#"{"error": "Failed to clear history: database is locked"}"#)
        .create_async()
        .await;
    browser.select(&EntryId::new("2"));
    assert_eq!(
        browser.delete_all(&backend, &AutoConfirm).await,
        DeleteOutcome::Failed
    );
    assert_eq!(browser.entries().len(), 1);
    assert!(browser.selected().is_some());
    assert!(matches!(
        browser.action_error(),
        Some(SignboardError::ClearError(_))
    ));

    // Then a successful one empties the view and refetches stats.
    failing_clear.remove_async().await;
    stats_after_delete.remove_async().await;
    server
        .mock("DELETE", "/api/history/clear")
        .with_status(200)
        .with_body(r#"{"message": "Cleared 1 translations from history"}"#)
        .create_async()
        .await;
    let zero_stats = server
        .mock("GET", "/api/stats")
        .with_status(200)
        .with_body(r#"{"total_translations": 0, "average_processing_time": 0}"#)
        .expect(1)
        .create_async()
        .await;

    assert_eq!(
        browser.delete_all(&backend, &AutoConfirm).await,
        DeleteOutcome::Deleted
    );
    zero_stats.assert_async().await;
    assert!(browser.entries().is_empty());
    assert!(browser.selected().is_none());
    assert!(browser.action_error().is_none());
    assert_eq!(browser.stats().unwrap().total_translations, 0);
    assert_eq!(browser.stats_state(), &LoadState::Loaded);
}

#[tokio::test]
async fn deleting_reserved_id_never_clears_history() {
    let mut server = Server::new_async().await;
    let backend = backend_for(&server);
    let clear = server
        .mock("DELETE", "/api/history/clear")
        .with_status(200)
        .with_body(r#"{"message": "Cleared 2 translations from history"}"#)
        .expect(0)
        .create_async()
        .await;

    let mut browser = HistoryBrowser::new(10);
    let outcome = browser
        .delete_one(&backend, &EntryId::new("clear"), &AutoConfirm)
        .await;

    assert_eq!(outcome, DeleteOutcome::Failed);
    assert!(matches!(
        browser.action_error(),
        Some(SignboardError::DeleteError(_))
    ));
    clear.assert_async().await;
}

#[tokio::test]
async fn failed_page_change_keeps_current_page() {
    let mut server = Server::new_async().await;
    let backend = backend_for(&server);

    server
        .mock("GET", "/api/history")
        .match_query(Matcher::UrlEncoded("page".to_string(), "1".to_string()))
        .with_status(200)
        .with_body(page_json(&[entry_json(1, "a.png")], 3))
        .create_async()
        .await;
    server
        .mock("GET", "/api/history")
        .match_query(Matcher::UrlEncoded("page".to_string(), "3".to_string()))
        .with_status(500)
        .with_body(r#"{"error": "Failed to fetch history: timeout"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/stats")
        .with_status(200)
        .with_body(r#"{"total_translations": 21, "average_processing_time": 2.0}"#)
        .create_async()
        .await;

    let mut browser = HistoryBrowser::new(10);
    browser.open(&backend).await;
    browser.change_page(&backend, 40).await;

    assert_eq!(browser.current_page(), 1);
    assert_eq!(browser.entries().len(), 1);
    assert_eq!(
        browser.error(),
        Some(&SignboardError::LoadError(
            "Failed to fetch history: timeout".to_string()
        ))
    );
}
