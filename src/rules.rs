use crate::admission::Admission;
use crate::models::ModifiedRequest;

#[derive(Debug, Clone, PartialEq)]
enum Pattern {
    Exact(String),
    Prefix(String), // "eth*" -> "eth"
}

impl Pattern {
    fn parse(raw: &str) -> Self {
        match raw.strip_suffix('*') {
            Some(prefix) => Pattern::Prefix(prefix.to_string()),
            None => Pattern::Exact(raw.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => path == exact,
            Pattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Allow-list of method patterns. Case-sensitive; an empty list admits nothing.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    patterns: Vec<Pattern>,
}

impl RuleMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| Pattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn match_any_rule(&self, call: &ModifiedRequest) -> bool {
        self.patterns.iter().any(|p| p.matches(&call.path))
    }
}

impl Admission for RuleMatcher {
    fn admits(&self, call: &ModifiedRequest) -> bool {
        self.match_any_rule(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(path: &str) -> ModifiedRequest {
        ModifiedRequest {
            path: path.into(),
            remote_addr: "1.2.3.4".into(),
            id: None,
        }
    }

    #[test]
    fn prefix_wildcard_matches() {
        let matcher = RuleMatcher::new(["eth*", "net_*"]);
        assert!(matcher.match_any_rule(&call("eth_getBalance")));
        assert!(matcher.match_any_rule(&call("eth")));
        assert!(matcher.match_any_rule(&call("net_version")));
        assert!(!matcher.match_any_rule(&call("net")));
        assert!(!matcher.match_any_rule(&call("web3_clientVersion")));
    }

    #[test]
    fn exact_pattern_requires_exact_match() {
        let matcher = RuleMatcher::new(["eth_call"]);
        assert!(matcher.match_any_rule(&call("eth_call")));
        assert!(!matcher.match_any_rule(&call("eth_callMany")));
        assert!(!matcher.match_any_rule(&call("eth_cal")));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let matcher = RuleMatcher::new(["eth*"]);
        assert!(!matcher.match_any_rule(&call("ETH_call")));
        assert!(!matcher.match_any_rule(&call("Eth_call")));
    }

    #[test]
    fn empty_pattern_set_fails_closed() {
        let matcher = RuleMatcher::new(Vec::<String>::new());
        assert!(!matcher.match_any_rule(&call("eth_call")));
        assert!(!matcher.match_any_rule(&call("")));
    }

    #[test]
    fn lone_wildcard_matches_everything() {
        let matcher = RuleMatcher::new(["*"]);
        assert!(matcher.match_any_rule(&call("anything")));
        assert!(matcher.match_any_rule(&call("/raw/path")));
    }

    #[test]
    fn pattern_order_is_irrelevant() {
        let a = RuleMatcher::new(["net_*", "eth_call", "debug*"]);
        let b = RuleMatcher::new(["debug*", "eth_call", "net_*"]);
        for path in ["net_peerCount", "eth_call", "debug_trace", "eth_send", ""] {
            assert_eq!(a.match_any_rule(&call(path)), b.match_any_rule(&call(path)));
        }
    }
}
