/// Request information for authentication.
///
/// `headers` keeps the order the request carried them in, with names as the transport
/// presented them. Lookups through [`AuthRequest::header`] ignore case the way HTTP does;
/// the trusted-prefix match in the identity factory does not.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub headers: Vec<(String, String)>,
}

impl AuthRequest {
    pub fn new(headers: Vec<(String, String)>) -> Self {
        Self { headers }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = AuthRequest::from_pairs([("X-Identity-Status", "Confirmed")]);

        assert_eq!(request.header("x-identity-status"), Some("Confirmed"));
        assert_eq!(request.header("X-IDENTITY-STATUS"), Some("Confirmed"));
        assert_eq!(request.header("X-Roles"), None);
    }

    #[test]
    fn test_header_returns_first_value() {
        let request = AuthRequest::from_pairs([("X-Roles", "a"), ("X-Roles", "b")]);
        assert_eq!(request.header("X-Roles"), Some("a"));
    }

    #[test]
    fn test_default_is_empty() {
        let request = AuthRequest::default();
        assert!(request.headers.is_empty());
        assert_eq!(request.header("anything"), None);
    }
}
