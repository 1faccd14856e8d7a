//! End-to-end flow: seal on write, opaque triple at rest, open on read.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rusqlite::Connection;
use tempfile::tempdir;

use mindvault_core::crypto::{FieldCipher, NONCE_LENGTH, TAG_LENGTH};
use mindvault_core::journal::Mood;
use mindvault_core::storage::SqliteJournalStore;
use mindvault_core::{Emotion, EntryUpdate, Journal};

fn configured_key() -> String {
    let raw: [u8; 32] = core::array::from_fn(|i| (i * 7) as u8);
    STANDARD.encode(raw)
}

fn journal_at(path: &std::path::Path, key: &str) -> Journal<SqliteJournalStore> {
    let store = SqliteJournalStore::open(path).expect("store");
    let cipher = FieldCipher::from_config(Some(key)).expect("cipher");
    Journal::new(store, cipher)
}

#[test]
fn test_plaintext_never_reaches_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("journal.db");
    let mut journal = journal_at(&path, &configured_key());

    let text = "I felt anxious today";
    let receipt = journal
        .create(
            text,
            vec!["work".to_string()],
            vec![],
            Some(Mood {
                emotion: Emotion::Anxious,
                stress: 70,
            }),
        )
        .expect("create");

    // Inspect the raw row through a second connection.
    let conn = Connection::open(&path).expect("raw open");
    let (content_enc, nonce, auth_tag): (String, String, String) = conn
        .query_row(
            "SELECT content_enc, nonce, auth_tag FROM entries WHERE id = ?",
            [receipt.id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("row");

    let ciphertext = STANDARD.decode(&content_enc).expect("ciphertext base64");
    assert_ne!(ciphertext.as_slice(), text.as_bytes());
    assert_eq!(STANDARD.decode(&nonce).expect("nonce base64").len(), NONCE_LENGTH);
    assert_eq!(STANDARD.decode(&auth_tag).expect("tag base64").len(), TAG_LENGTH);

    // And the read path still recovers the original text.
    let view = journal.entry(&receipt.id).expect("get").expect("present");
    assert_eq!(view.content, text);
}

#[test]
fn test_reopen_with_same_key_reads_entries() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("journal.db");
    let key = configured_key();

    let id = {
        let mut journal = journal_at(&path, &key);
        journal
            .create("persisted across restart", vec![], vec![], None)
            .expect("create")
            .id
    };

    let journal = journal_at(&path, &key);
    let view = journal.entry(&id).expect("get").expect("present");
    assert_eq!(view.content, "persisted across restart");
}

#[test]
fn test_key_change_degrades_to_blank_content() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("journal.db");

    let id = {
        let mut journal = journal_at(&path, &configured_key());
        journal
            .create("sealed under the old key", vec!["keep".to_string()], vec![], None)
            .expect("create")
            .id
    };

    // A rotated key cannot open old records; the read path degrades them
    // instead of failing.
    let other_key = STANDARD.encode([0x5Au8; 32]);
    let journal = journal_at(&path, &other_key);
    let view = journal.entry(&id).expect("get").expect("present");
    assert_eq!(view.content, "");
    assert_eq!(view.tags, vec!["keep".to_string()]);
}

#[test]
fn test_batch_of_five_with_one_corrupted_row() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("journal.db");
    let key = configured_key();
    let mut journal = journal_at(&path, &key);

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            journal
                .create(&format!("batch entry {}", i), vec![], vec![], None)
                .expect("create")
                .id,
        );
    }

    // Corrupt one record's tag in place, behind the store's back.
    let conn = Connection::open(&path).expect("raw open");
    conn.execute(
        "UPDATE entries SET auth_tag = ? WHERE id = ?",
        (STANDARD.encode([0u8; 16]), ids[1].to_string()),
    )
    .expect("corrupt");

    let views = journal.list(None).expect("list");
    assert_eq!(views.len(), 5);

    let blank: Vec<_> = views.iter().filter(|view| view.content.is_empty()).collect();
    assert_eq!(blank.len(), 1);
    assert_eq!(blank[0].id, ids[1]);

    for view in views.iter().filter(|view| view.id != ids[1]) {
        assert!(view.content.starts_with("batch entry "));
    }
}

#[test]
fn test_edit_discards_previous_triple() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("journal.db");
    let mut journal = journal_at(&path, &configured_key());

    let id = journal.create("v1", vec![], vec![], None).expect("create").id;

    let conn = Connection::open(&path).expect("raw open");
    let read_triple = |conn: &Connection| -> (String, String, String) {
        conn.query_row(
            "SELECT content_enc, nonce, auth_tag FROM entries WHERE id = ?",
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("row")
    };

    let before = read_triple(&conn);
    journal
        .edit(
            &id,
            EntryUpdate {
                text: Some("v2".to_string()),
                ..Default::default()
            },
        )
        .expect("edit");
    let after = read_triple(&conn);

    assert_ne!(before.0, after.0);
    assert_ne!(before.1, after.1);
    assert_ne!(before.2, after.2);

    let view = journal.entry(&id).expect("get").expect("present");
    assert_eq!(view.content, "v2");
}
