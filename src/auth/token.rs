use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{self, RngCore};

/// Opaque single-use credential for the password-reset flow. Matched exactly
/// against the stored column, so it carries no structure at all.
pub fn generate_reset_token() -> String {
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }
}
