//! Blobs recorded with an independent OpenSSL-compatible implementation.

use hex_literal::hex;

pub const DEFAULT_PASSPHRASE: &str = "default-key-change-in-production";
pub const FIXED_SALT: [u8; 8] = hex!("0011223344556677");

#[derive(Debug)]
pub struct Fixture {
    pub passphrase: &'static str,
    pub plaintext: &'static str,
    pub salt: [u8; 8],
    pub blob: &'static str,
}

pub const FIXTURES: &[Fixture] = &[
    Fixture {
        passphrase: DEFAULT_PASSPHRASE,
        plaintext: "hello",
        salt: FIXED_SALT,
        blob: "U2FsdGVkX18AESIzRFVmd1frKN6SodxdehbEpB2ih84=",
    },
    Fixture {
        passphrase: "correct-horse",
        plaintext: "The quick brown fox jumps over the lazy dog",
        salt: hex!("a1b2c3d4e5f60718"),
        blob: "U2FsdGVkX1+hssPU5fYHGJg7iTpoMaZoAv02/OeJJGLBxtQilQVS4Uhw+WPTNExXf7+zyqJJ53DzhsDc0oIm5A==",
    },
    Fixture {
        passphrase: DEFAULT_PASSPHRASE,
        plaintext: "",
        salt: FIXED_SALT,
        blob: "U2FsdGVkX18AESIzRFVmd0jAQ9HFV94nCS8TrZcd0Is=",
    },
    Fixture {
        passphrase: DEFAULT_PASSPHRASE,
        plaintext: "pässwörd ✓",
        salt: FIXED_SALT,
        blob: "U2FsdGVkX18AESIzRFVmd+K8IdjIGK6CGzADizxNOeM=",
    },
];

/// The `hello` fixture decrypted with this passphrase ends in an invalid pad byte.
pub const WRONG_PASSPHRASE: &str = "wrong-passphrase";
