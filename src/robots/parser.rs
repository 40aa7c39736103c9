//! Robots.txt parser implementation
//!
//! Line-oriented parsing into per-agent rule groups, with prefix and `*`
//! wildcard path matching. Rule selection follows the modern longest-match
//! interpretation: the most specific matching pattern decides, and an Allow
//! pattern overrides a Disallow pattern of equal length.

use regex::Regex;

/// A block of directives for one or more user agents
#[derive(Debug, Clone, Default)]
pub struct RuleGroup {
    /// User agent tokens this group applies to (lowercased; `*` matches all)
    pub user_agents: Vec<String>,

    /// Allow path patterns, in file order
    pub allow: Vec<String>,

    /// Disallow path patterns, in file order
    pub disallow: Vec<String>,

    /// Crawl-delay converted from seconds to milliseconds
    pub crawl_delay_ms: Option<u64>,
}

/// Parsed robots.txt rules for one host
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    groups: Vec<RuleGroup>,
}

impl RuleSet {
    /// Parses raw robots.txt content into rule groups
    ///
    /// Directives are grouped under the most recent run of `User-agent:`
    /// lines; consecutive `User-agent:` lines share one group. Blank lines,
    /// `#` comments, and directives appearing before any `User-agent:` line
    /// are ignored. Unknown directives are skipped. Parsing never fails: a
    /// garbage file simply yields no groups, which allows everything.
    pub fn parse(content: &str) -> Self {
        let mut groups: Vec<RuleGroup> = Vec::new();
        let mut current: Option<RuleGroup> = None;
        let mut last_was_agent = false;

        for raw_line in content.lines() {
            // Strip comments and surrounding whitespace
            let line = match raw_line.split_once('#') {
                Some((before, _)) => before.trim(),
                None => raw_line.trim(),
            };

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // A User-agent line after directives closes the previous group
                    if !last_was_agent {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                        current = Some(RuleGroup::default());
                    }
                    if let Some(group) = current.as_mut() {
                        group.user_agents.push(value.to_lowercase());
                    }
                    last_was_agent = true;
                }
                "allow" => {
                    last_was_agent = false;
                    if let Some(group) = current.as_mut() {
                        if !value.is_empty() {
                            group.allow.push(value.to_string());
                        }
                    }
                }
                "disallow" => {
                    last_was_agent = false;
                    // An empty Disallow value means "allow everything"
                    if let Some(group) = current.as_mut() {
                        if !value.is_empty() {
                            group.disallow.push(value.to_string());
                        }
                    }
                }
                "crawl-delay" => {
                    last_was_agent = false;
                    if let Some(group) = current.as_mut() {
                        if let Ok(seconds) = value.parse::<f64>() {
                            if seconds >= 0.0 {
                                group.crawl_delay_ms = Some((seconds * 1000.0) as u64);
                            }
                        }
                    }
                }
                _ => {
                    last_was_agent = false;
                }
            }
        }

        if let Some(group) = current.take() {
            groups.push(group);
        }

        Self { groups }
    }

    /// Creates a permissive rule set that allows everything
    ///
    /// Used when robots.txt cannot be fetched: a missing or broken file is
    /// "no restrictions", never a hard failure.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks if a URL path is allowed for the given user agent token
    ///
    /// Selects the group whose agent list contains the token
    /// (case-insensitive), falling back to the `*` group; no matching group
    /// allows the path. Within a group, the longest matching pattern wins,
    /// with Allow beating Disallow on equal length.
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        let Some(group) = self.group_for(user_agent) else {
            return true;
        };

        let best_disallow = best_match_len(&group.disallow, path);
        let Some(disallow_len) = best_disallow else {
            return true;
        };

        match best_match_len(&group.allow, path) {
            Some(allow_len) => allow_len >= disallow_len,
            None => false,
        }
    }

    /// Gets the crawl delay for a user agent token, in milliseconds
    pub fn crawl_delay_ms(&self, user_agent: &str) -> Option<u64> {
        self.group_for(user_agent)?.crawl_delay_ms
    }

    /// Selects the rule group for a user agent token
    ///
    /// A group naming the token exactly (case-insensitive) is preferred
    /// over the wildcard `*` group.
    fn group_for(&self, user_agent: &str) -> Option<&RuleGroup> {
        let token = user_agent.to_lowercase();

        self.groups
            .iter()
            .find(|g| g.user_agents.iter().any(|ua| *ua == token))
            .or_else(|| {
                self.groups
                    .iter()
                    .find(|g| g.user_agents.iter().any(|ua| ua == "*"))
            })
    }
}

/// Returns the length of the longest pattern in `patterns` matching `path`
fn best_match_len(patterns: &[String], path: &str) -> Option<usize> {
    patterns
        .iter()
        .filter_map(|p| match_len(p, path))
        .max()
}

/// Matches a single robots.txt path pattern against a URL path
///
/// Exact match and plain prefix match are handled directly; a pattern
/// containing `*` is expanded to a prefix-anchored regex. Pattern length is
/// used as the specificity measure for longest-match comparison. Any
/// internal matching error counts as "no match" so evaluation stays
/// fail-open.
fn match_len(pattern: &str, path: &str) -> Option<usize> {
    if pattern.is_empty() {
        return None;
    }

    if pattern.contains('*') {
        let anchored = format!(
            "^{}",
            pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*")
        );
        match Regex::new(&anchored) {
            Ok(re) if re.is_match(path) => Some(pattern.len()),
            _ => None,
        }
    } else if path == pattern || path.starts_with(pattern) {
        Some(pattern.len())
    } else {
        None
    }
}
