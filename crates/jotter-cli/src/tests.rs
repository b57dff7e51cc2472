use std::sync::Arc;

use jotter_core::auth::Identity;
use jotter_core::editor::Editor;
use jotter_core::store::{DocumentStore, MemoryStore};
use jotter_core::sync::NoteList;
use jotter_core::Note;
use pretty_assertions::assert_eq;

use crate::cli::CompletionShell;
use crate::commands::common::{
    default_editor, first_snapshot, format_note_lines, format_relative_time, markup_to_text,
    normalize_content, normalize_note_identifier, resolve_note, save_editor, split_title_body,
    text_to_markup, truncate_chars,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{merge_profile_values, missing_fields, ProfileValues};
use crate::commands::new::resolve_new_note_text;
use crate::commands::show::parse_show_target;
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn note(id: &str, uid: &str, title: &str, updated_at: Option<i64>) -> Note {
    Note {
        id: id.parse().unwrap(),
        title: title.to_string(),
        content: format!("<div>{title} body</div>"),
        uid: uid.to_string(),
        created_at: updated_at,
        updated_at,
    }
}

fn identity(uid: &str) -> Identity {
    Identity {
        uid: uid.to_string(),
        email: Some(format!("{uid}@example.com")),
    }
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_note_identifier_rejects_blank() {
    assert!(matches!(
        normalize_note_identifier("   "),
        Err(CliError::EmptyNoteId)
    ));
    assert_eq!(normalize_note_identifier(" abc ").unwrap(), "abc");
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(Some(now - 30_000), now), "just now");
    assert_eq!(format_relative_time(Some(now - 120_000), now), "2m ago");
    assert_eq!(format_relative_time(Some(now - 2 * 60 * 60_000), now), "2h ago");
    assert_eq!(format_relative_time(None, now), "pending");
}

#[test]
fn truncate_chars_adds_ellipsis() {
    assert_eq!(truncate_chars("short", 10), "short");
    assert_eq!(truncate_chars("abcdefghij", 6), "abc...");
}

#[test]
fn text_to_markup_escapes_and_breaks_lines() {
    assert_eq!(
        text_to_markup("Milk & eggs\n<bread>\n"),
        "Milk &amp; eggs<br>&lt;bread&gt;"
    );
    assert_eq!(text_to_markup("   "), "");
}

#[test]
fn markup_to_text_keeps_block_breaks() {
    assert_eq!(
        markup_to_text("<b>Milk</b><div>and&nbsp;eggs</div><div><br></div><ul><li>one</li><li>two</li></ul>"),
        "Milk\nand eggs\n\none\ntwo"
    );
    assert_eq!(markup_to_text("<div> </div>"), "");
}

#[test]
fn split_title_body_uses_first_line() {
    assert_eq!(
        split_title_body("Groceries\nMilk\nEggs\n"),
        ("Groceries".to_string(), "Milk\nEggs".to_string())
    );
    assert_eq!(
        split_title_body("  Only a title "),
        ("Only a title".to_string(), String::new())
    );
}

#[test]
fn resolve_new_note_text_prefers_flags() {
    let (title, content) =
        resolve_new_note_text(Some("Groceries".to_string()), None).unwrap();
    assert_eq!(title, "Groceries");
    assert_eq!(content, "");
}

#[test]
fn format_note_lines_show_untitled_and_pending() {
    let mut untitled = note("0192aaaa0000000000000000000000aa", "u1", "", None);
    untitled.content = "<div>Milk</div>".to_string();
    let lines = format_note_lines(&[untitled]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("0192aaaa00000"));
    assert!(lines[0].contains("Untitled"));
    assert!(lines[0].contains("Milk"));
    assert!(lines[0].ends_with("pending"));
}

#[test]
fn resolve_note_matches_exact_id_and_unique_prefix() {
    let notes = NoteList::from_snapshot(vec![
        note("aaa111", "u1", "First", Some(1)),
        note("aab222", "u1", "Second", Some(2)),
    ]);

    assert_eq!(resolve_note(&notes, "aaa111").unwrap().title, "First");
    assert_eq!(resolve_note(&notes, "aab").unwrap().title, "Second");
    assert!(matches!(
        resolve_note(&notes, "zzz"),
        Err(CliError::NoteNotFound(query)) if query == "zzz"
    ));
    match resolve_note(&notes, "aa") {
        Err(CliError::AmbiguousNoteId(message)) => {
            assert!(message.contains("ambiguous"));
            assert!(message.contains("aab222"));
            assert!(message.contains("aaa111"));
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[tokio::test]
async fn first_snapshot_is_sorted_and_owner_scoped() {
    let store = MemoryStore::new();
    store.seed(note("old", "u1", "Old", Some(10))).unwrap();
    store.seed(note("new", "u1", "New", Some(20))).unwrap();
    store.seed(note("pending", "u1", "Pending", None)).unwrap();
    store.seed(note("other", "u2", "Other", Some(30))).unwrap();

    let notes = first_snapshot(Arc::new(store), "u1").await.unwrap();
    let ids = notes
        .iter()
        .map(|note| note.id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["new", "old", "pending"]);
}

#[tokio::test]
async fn first_snapshot_surfaces_subscription_failure() {
    let store = MemoryStore::new();
    store.fail_subscriptions_with("permission denied").unwrap();

    let error = first_snapshot(Arc::new(store), "u1").await.unwrap_err();
    assert!(error.to_string().contains("permission denied"));
}

#[tokio::test]
async fn save_editor_creates_then_updates() {
    let store = MemoryStore::new();
    let author = identity("u1");

    let mut editor = Editor::new();
    editor.new_draft();
    editor.set_content(text_to_markup("Milk"));
    let note_id = save_editor(&mut editor, &store, &author).await.unwrap();
    assert_eq!(editor.status().message(), Some("Draft saved"));

    let created = store.get(&note_id).await.unwrap().unwrap();
    assert_eq!(created.title, "Untitled");
    assert_eq!(created.content, "Milk");
    assert_eq!(created.uid, "u1");

    let mut editor = Editor::new();
    editor.select(&created);
    editor.set_title(text_to_markup("Groceries"));
    let updated_id = save_editor(&mut editor, &store, &author).await.unwrap();
    assert_eq!(updated_id, note_id);
    assert_eq!(editor.status().message(), Some("Note updated"));
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(
        store.get(&note_id).await.unwrap().unwrap().title,
        "Groceries"
    );
}

#[tokio::test]
async fn save_editor_rejects_blank_draft() {
    let store = MemoryStore::new();
    let mut editor = Editor::new();
    editor.new_draft();
    editor.set_title("<div><br></div>");

    let result = save_editor(&mut editor, &store, &identity("u1")).await;
    assert!(matches!(result, Err(CliError::EmptyContent)));
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn save_editor_reports_store_failure() {
    let store = MemoryStore::new();
    store.fail_writes_with("quota exceeded").unwrap();
    let mut editor = Editor::new();
    editor.new_draft();
    editor.set_content("Milk");

    match save_editor(&mut editor, &store, &identity("u1")).await {
        Err(CliError::SaveFailed(message)) => assert!(message.contains("quota exceeded")),
        other => panic!("expected save failure, got {other:?}"),
    }
}

#[test]
fn parse_show_target_accepts_links_and_ids() {
    let route = parse_show_target("https://notes.example.com/?note=abc&mode=read").unwrap();
    assert_eq!(route.requested_id(), "abc");

    let route = parse_show_target(" abc ").unwrap();
    assert_eq!(route.requested_id(), "abc");

    assert!(matches!(
        parse_show_target("https://notes.example.com/?note=abc"),
        Err(CliError::NoteNotFound(_))
    ));
    assert!(matches!(parse_show_target("  "), Err(CliError::EmptyNoteId)));
}

#[test]
fn merge_profile_values_prefers_flags_then_env_then_existing() {
    let mut profile = CliProfile {
        firebase_api_key: Some("old-key".to_string()),
        firebase_project_id: Some("old-project".to_string()),
        notes_collection: Some("journal".to_string()),
        ..Default::default()
    };

    merge_profile_values(
        &mut profile,
        ProfileValues {
            api_key: Some(" new-key ".to_string()),
            share_base_url: Some("https://notes.example.com/".to_string()),
            ..Default::default()
        },
        |name| (name == "JOTTER_FIREBASE_PROJECT_ID").then(|| "env-project".to_string()),
    );

    assert_eq!(profile.firebase_api_key.as_deref(), Some("new-key"));
    assert_eq!(profile.firebase_project_id.as_deref(), Some("env-project"));
    assert_eq!(profile.notes_collection.as_deref(), Some("journal"));
    assert_eq!(profile.firestore_database, None);
    assert_eq!(
        profile.share_base_url.as_deref(),
        Some("https://notes.example.com")
    );
    assert!(missing_fields(&profile).is_empty());
}

#[test]
fn missing_fields_lists_firebase_keys() {
    assert_eq!(
        missing_fields(&CliProfile::default()),
        vec!["api_key", "project_id"]
    );
}

#[test]
fn completions_use_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("jotter"));
}

#[tokio::test]
async fn saved_note_visible_to_owner_only() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = Editor::new();
    editor.new_draft();
    editor.set_title("Groceries");
    editor.set_content("Milk");
    save_editor(&mut editor, store.as_ref(), &identity("u1"))
        .await
        .unwrap();

    let dyn_store: Arc<dyn DocumentStore> = store;
    assert_eq!(first_snapshot(dyn_store.clone(), "u1").await.unwrap().len(), 1);
    assert!(first_snapshot(dyn_store, "u2").await.unwrap().is_empty());
}
