//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key for a request.
///
/// The key is a SHA-256 hash of the method, the path and its query
/// parameters sorted by name, so `?b=2&a=1` and `?a=1&b=2` share an entry.
pub fn request_key(method: &str, path: &str) -> String {
    let mut hasher = Sha256::new();

    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, q),
        None => (path, ""),
    };

    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"|");
    hasher.update(path.as_bytes());
    hasher.update(b"|");

    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    params.sort();

    for (k, v) in params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}

/// Short stable directory name for a generation's blob files
pub fn generation_dir(generation: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(generation.as_bytes()));
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_deterministic() {
        let key1 = request_key("GET", "/api/asn/15169.json");
        let key2 = request_key("get", "/api/asn/15169.json");
        assert_eq!(key1, key2);
        assert_eq!(key1.len(), 64);
    }

    #[test]
    fn test_request_key_query_order_independent() {
        let key1 = request_key("GET", "/index.html?v=2&lang=en");
        let key2 = request_key("GET", "/index.html?lang=en&v=2");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_request_key_different_paths() {
        let key1 = request_key("GET", "/api/asn/1.json");
        let key2 = request_key("GET", "/api/asn/2.json");
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_request_key_query_matters() {
        let key1 = request_key("GET", "/index.html");
        let key2 = request_key("GET", "/index.html?v=2");
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_generation_dir_stable() {
        assert_eq!(generation_dir("netmirror-v1"), generation_dir("netmirror-v1"));
        assert_ne!(generation_dir("netmirror-v1"), generation_dir("netmirror-v2"));
        assert_eq!(generation_dir("netmirror-v1").len(), 16);
    }
}
