use std::sync::Arc;
use svault_cipher::{KeySource, decrypt, encrypt};
use svault_vault::{EntryFields, FieldCodec, MemoryStore, VaultError, VaultService};

const PASSPHRASE: &str = "default-key-change-in-production";

fn service() -> VaultService {
    VaultService::new(Arc::new(MemoryStore::new()))
}

fn fields(title: &str, username: &str, password: &str) -> EntryFields {
    EntryFields {
        title: Some(title.to_owned()),
        username: Some(username.to_owned()),
        password: Some(password.to_owned()),
        ..EntryFields::default()
    }
}

#[tokio::test]
async fn create_defaults_optional_fields() {
    let entry = service()
        .create_entry(
            "alice",
            EntryFields {
                title: Some("t".to_owned()),
                password: Some("p".to_owned()),
                ..EntryFields::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(entry.owner_id, "alice");
    assert_eq!(entry.username, "");
    assert_eq!(entry.url, "");
    assert_eq!(entry.notes, "");
    assert_eq!(entry.id.len(), 12);
    assert_eq!(entry.created_at, entry.updated_at);
}

#[tokio::test]
async fn create_requires_title_and_password() {
    let service = service();

    let err = service.create_entry("alice", fields("", "", "x")).await.unwrap_err();
    assert!(matches!(err, VaultError::Validation { .. }));

    let err = service.create_entry("alice", fields("t", "", "")).await.unwrap_err();
    assert!(matches!(err, VaultError::Validation { .. }));

    assert!(service.list_entries("alice", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn other_owners_get_not_found_everywhere() {
    let service = service();
    let entry = service.create_entry("alice", fields("Bank", "", "blob")).await.unwrap();

    let get = service.get_entry("bob", &entry.id).await.unwrap_err();
    let update = service
        .update_entry("bob", &entry.id, EntryFields { title: Some("pwned".to_owned()), ..EntryFields::default() })
        .await
        .unwrap_err();
    let delete = service.delete_entry("bob", &entry.id).await.unwrap_err();
    let missing = service.get_entry("alice", "doesNotExist").await.unwrap_err();

    for err in [get, update, delete, missing] {
        assert!(err.is_not_found(), "{err}");
        assert_eq!(err.to_string(), VaultError::not_found().to_string());
    }

    let still = service.get_entry("alice", &entry.id).await.unwrap();
    assert_eq!(still.title, "Bank");
    assert!(service.list_entries("bob", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let service = service();
    for id in ["", "../etc", "migration:abc", "a b"] {
        assert!(service.delete_entry("alice", id).await.unwrap_err().is_not_found());
    }
}

#[tokio::test]
async fn record_prefixed_ids_address_the_same_entry() {
    let service = service();
    let entry = service.create_entry("alice", fields("t", "", "p")).await.unwrap();

    let found = service.get_entry("alice", &format!("vault:{}", entry.id)).await.unwrap();
    assert_eq!(found, entry);
}

#[tokio::test]
async fn clearing_notes_leaves_everything_else() {
    let service = service();
    let created = service
        .create_entry(
            "alice",
            EntryFields {
                url: Some("https://bank.example".to_owned()),
                notes: Some("blob-notes".to_owned()),
                ..fields("Bank", "blob-user", "blob-pass")
            },
        )
        .await
        .unwrap();

    let updated = service
        .update_entry("alice", &created.id, EntryFields { notes: Some(String::new()), ..EntryFields::default() })
        .await
        .unwrap();

    assert_eq!(updated.notes, "");
    assert_eq!(updated.title, "Bank");
    assert_eq!(updated.username, "blob-user");
    assert_eq!(updated.password, "blob-pass");
    assert_eq!(updated.url, "https://bank.example");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn empty_title_and_password_do_not_overwrite() {
    let service = service();
    let created = service.create_entry("alice", fields("Bank", "u", "p")).await.unwrap();

    let updated = service
        .update_entry(
            "alice",
            &created.id,
            EntryFields {
                title: Some(String::new()),
                password: Some(String::new()),
                username: Some(String::new()),
                ..EntryFields::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Bank");
    assert_eq!(updated.password, "p");
    assert_eq!(updated.username, "");
}

#[tokio::test]
async fn delete_removes_only_once() {
    let service = service();
    let entry = service.create_entry("alice", fields("t", "", "p")).await.unwrap();

    service.delete_entry("alice", &entry.id).await.unwrap();
    assert!(service.delete_entry("alice", &entry.id).await.unwrap_err().is_not_found());
    assert!(service.get_entry("alice", &entry.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_is_newest_first_and_searches_titles() {
    let service = service();
    for title in ["Work GMail", "Bank", "gmail personal"] {
        service.create_entry("alice", fields(title, "", "p")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(3)).await;
    }
    service.create_entry("bob", fields("bob gmail", "", "p")).await.unwrap();

    let all = service.list_entries("alice", None).await.unwrap();
    let titles: Vec<_> = all.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["gmail personal", "Bank", "Work GMail"]);

    let found = service.list_entries("alice", Some("GMAIL")).await.unwrap();
    let titles: Vec<_> = found.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["gmail personal", "Work GMail"]);

    assert_eq!(service.list_entries("alice", Some("   ")).await.unwrap().len(), 3);
}

#[tokio::test]
async fn ciphertext_usernames_rarely_match_plaintext_search() {
    let service = service();
    let blob = encrypt("alice@gmail.com", PASSPHRASE).unwrap();
    service.create_entry("alice", fields("Mail", &blob, "p")).await.unwrap();

    assert!(service.list_entries("alice", Some("gmail")).await.unwrap().is_empty());

    let tail = &blob[blob.len() - 6..blob.len() - 2];
    assert_eq!(service.list_entries("alice", Some(tail)).await.unwrap().len(), 1);

    let title_only = VaultService::new(Arc::new(MemoryStore::new())).search_username(false);
    title_only.create_entry("alice", fields("Mail", &blob, "p")).await.unwrap();
    assert!(title_only.list_entries("alice", Some(tail)).await.unwrap().is_empty());
}

#[tokio::test]
async fn client_mode_stores_blobs_verbatim() {
    let service = service();
    let blob = encrypt("hunter2", PASSPHRASE).unwrap();

    let entry = service.create_entry("alice", fields("t", "", &blob)).await.unwrap();
    assert_eq!(entry.password, blob);
    assert!(!service.encrypts_on_server());
}

#[tokio::test]
async fn server_mode_encrypts_at_rest_and_searches_plaintext() {
    let store = Arc::new(MemoryStore::new());
    let codec = FieldCodec::new(KeySource::fixed(PASSPHRASE).unwrap());
    let server = VaultService::new(store.clone()).with_codec(codec);
    let raw = VaultService::new(store);

    let created = server.create_entry("alice", fields("Mail", "alice@gmail.com", "hunter2")).await.unwrap();
    assert_eq!(created.password, "hunter2");
    assert_eq!(created.username, "alice@gmail.com");

    let at_rest = raw.get_entry("alice", &created.id).await.unwrap();
    assert_ne!(at_rest.password, "hunter2");
    assert_eq!(decrypt(&at_rest.password, PASSPHRASE).unwrap(), "hunter2");
    assert_eq!(decrypt(&at_rest.username, PASSPHRASE).unwrap(), "alice@gmail.com");
    assert_eq!(at_rest.notes, "");

    let found = server.list_entries("alice", Some("GMAIL.com")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].password, "hunter2");

    let updated = server
        .update_entry("alice", &created.id, EntryFields { password: Some("n3w".to_owned()), ..EntryFields::default() })
        .await
        .unwrap();
    assert_eq!(updated.password, "n3w");
    let at_rest = raw.get_entry("alice", &created.id).await.unwrap();
    assert_eq!(decrypt(&at_rest.password, PASSPHRASE).unwrap(), "n3w");
}

#[tokio::test]
async fn concurrent_updates_are_last_write_wins() {
    let service = service();
    let entry = service.create_entry("alice", fields("t", "", "p")).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            let id = entry.id.clone();
            tokio::spawn(async move {
                service
                    .update_entry("alice", &id, EntryFields { notes: Some(format!("n{i}")), ..EntryFields::default() })
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let last = service.get_entry("alice", &entry.id).await.unwrap();
    assert!(last.notes.starts_with('n'));
    assert_eq!(service.list_entries("alice", None).await.unwrap().len(), 1);
}
