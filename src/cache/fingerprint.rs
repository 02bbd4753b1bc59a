//! Content fingerprinting for change detection
//!
//! Fingerprints are XXH3-64 hashes of file content, rendered as fixed-width
//! hex strings. They are used solely to decide whether a cached extraction
//! is still valid; they carry no security properties.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a stable fingerprint for file content
pub fn fingerprint(content: &str) -> String {
    format!("{:016x}", xxh3_64(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint("fn main() {}");
        let b = fingerprint("fn main() {}");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_content() {
        let a = fingerprint("fn main() {}");
        let b = fingerprint("fn main() { }");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_shape() {
        let f = fingerprint("");
        assert_eq!(f.len(), 16);
        assert!(f.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
