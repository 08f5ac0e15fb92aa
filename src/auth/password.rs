const SALT_LEN: usize = 16;
const SCHEME: &str = "blake3";

/// `blake3$<salt hex>$<digest hex>`
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    format!("{SCHEME}${}${}", hex::encode(salt), salted(&salt, password).to_hex())
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(salt), Some(digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let (Ok(salt), Ok(expected)) = (hex::decode(salt), blake3::Hash::from_hex(digest)) else {
        return false;
    };

    // blake3::Hash equality is constant-time
    salted(&salt, password) == expected
}

/// 40 hex chars, the same shape as the keys handed out on login.
pub fn new_token_key() -> String {
    hex::encode(rand::random::<[u8; 20]>())
}

fn salted(salt: &[u8], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}
