//! # Digest de Passwords
//! src/jobs/digest.rs
//!
//! `base64(SHA-512(password))` con el alfabeto estándar y padding. Los
//! clientes recalculan este mismo valor para verificar las respuestas, así
//! que el par algoritmo/codificación no puede cambiar.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha512};

/// Largo en caracteres de un digest codificado (64 bytes → 88 chars)
pub const ENCODED_DIGEST_LEN: usize = 88;

/// Calcula el digest codificado de un password
///
/// # Ejemplo
/// ```
/// use hasher_server::jobs::digest::{hash_password, ENCODED_DIGEST_LEN};
///
/// let digest = hash_password("angryMonkey");
/// assert_eq!(digest.len(), ENCODED_DIGEST_LEN);
/// assert!(digest.starts_with("ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q=="));
/// ```
pub fn hash_password(password: &str) -> String {
    let digest = Sha512::digest(password.as_bytes());
    STANDARD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            hash_password("angryMonkey"),
            "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q=="
        );
    }

    #[test]
    fn test_empty_password() {
        // SHA-512 de la cadena vacía
        assert_eq!(
            hash_password(""),
            "z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXcg/SpIdNs6c5H0NE8XYXysP+DGNKHfuwvY7kxvUdBeoGlODJ6+SfaPg=="
        );
    }

    #[test]
    fn test_length_and_padding() {
        let digest = hash_password("angryMonkey0");
        assert_eq!(digest.len(), ENCODED_DIGEST_LEN);
        assert!(digest.ends_with("=="));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(hash_password("abc"), hash_password("abc"));
        assert_ne!(hash_password("abc"), hash_password("abd"));
    }
}
