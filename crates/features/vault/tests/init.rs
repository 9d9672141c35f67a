use svault_domain::config::{EncryptionMode, KeyMode, StoreKind, VaultConfig};
use svault_vault::{Vault, VaultError, init};

#[test]
fn memory_store_needs_no_database() {
    let config = VaultConfig { store: StoreKind::Memory, ..VaultConfig::default() };
    let slice = init(&config, None).expect("init should succeed");

    assert_eq!(slice.id, std::any::TypeId::of::<Vault>());
    assert_eq!(slice.name(), "Vault");
    let vault = slice.downcast::<Vault>().expect("vault slice");
    assert!(!vault.service.encrypts_on_server());
}

#[test]
fn database_store_requires_a_connection() {
    let err = init(&VaultConfig::default(), None).unwrap_err();
    assert!(matches!(err, VaultError::Config { .. }));
}

#[test]
fn server_encryption_wires_the_codec() {
    let mut config = VaultConfig {
        store: StoreKind::Memory,
        encryption: EncryptionMode::Server,
        ..VaultConfig::default()
    };
    let slice = init(&config, None).unwrap();
    assert!(slice.downcast::<Vault>().unwrap().service.encrypts_on_server());

    config.keys.mode = KeyMode::PerOwner;
    assert!(matches!(init(&config, None), Err(VaultError::Config { .. })));

    config.keys.master_secret = Some("master".to_owned());
    assert!(init(&config, None).is_ok());

    config.keys.master_secret = Some(String::new());
    assert!(matches!(init(&config, None), Err(VaultError::Cipher { .. })));
}
