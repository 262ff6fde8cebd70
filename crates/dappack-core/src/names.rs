//! Derived resource names
//!
//! Image and container names are pure functions of a dapp's uid. The fixed
//! prefixes keep distinct uids mapped to distinct names and make dappack's
//! artifacts recognizable in engine listings. Nothing here is ever stored;
//! the names are recomputed on every call.

/// Well-known host every service URL points at
pub const SERVICE_HOST: &str = "localhost";

/// Image repository name for a dapp
pub fn image_name(uid: &str) -> String {
    format!("dappack/{}", uid)
}

/// Container name for a dapp
pub fn container_name(uid: &str) -> String {
    format!("dappack__{}", uid)
}

/// Local URL the dapp is reachable at once running
pub fn service_url(http_port: u16) -> String {
    format!("http://{}:{}", SERVICE_HOST, http_port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_stable() {
        assert_eq!(image_name("uniswap-interface"), "dappack/uniswap-interface");
        assert_eq!(
            container_name("uniswap-interface"),
            "dappack__uniswap-interface"
        );
        assert_eq!(image_name("abc"), image_name("abc"));
        assert_eq!(container_name("abc"), container_name("abc"));
    }

    #[test]
    fn test_adjacent_uids_never_collide() {
        assert_ne!(image_name("abc"), image_name("abc_"));
        assert_ne!(container_name("abc"), container_name("abc_"));
        assert_ne!(image_name("a-b"), image_name("a_b"));
        assert_ne!(container_name("a-b"), container_name("a_b"));
    }

    #[test]
    fn test_service_url() {
        assert_eq!(service_url(3000), "http://localhost:3000");
    }
}
