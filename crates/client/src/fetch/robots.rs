//! Simplified robots.txt evaluation.
//!
//! Rules are parsed fresh for each fetch that asks for a robots check.
//! Only `User-agent`, `Allow` and `Disallow` are understood; anything that
//! cannot be retrieved or parsed means "no restrictions".

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Timeout for retrieving robots.txt.
pub const ROBOTS_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum size of robots.txt to accept (512KB).
const MAX_ROBOTS_SIZE: usize = 512 * 1024;

/// Allow/disallow prefixes that apply to one user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    pub disallow: Vec<String>,
    pub allow: Vec<String>,
}

/// Rules of one `User-agent` record while scanning.
#[derive(Default)]
struct Record {
    agents: Vec<String>,
    rules: RobotsRules,
    has_rules: bool,
}

impl Record {
    fn applies_to(&self, user_agent: &str) -> bool {
        self.agents.iter().any(|agent| agent == "*" || user_agent.contains(agent.as_str()))
    }
}

impl RobotsRules {
    /// Parse robots.txt text, keeping the rules of the last record that
    /// applies to `user_agent`.
    ///
    /// A record applies when one of its agents is `*` or a substring of
    /// `user_agent` (case-insensitive). An empty `Disallow:` clears the
    /// disallow rules gathered so far in that record.
    pub fn parse(text: &str, user_agent: &str) -> Self {
        let user_agent = user_agent.to_lowercase();
        let mut kept = RobotsRules::default();
        let mut current: Option<Record> = None;

        for raw in text.lines() {
            let line = raw.split('#').next().unwrap_or("").trim();
            let Some((field, value)) = line.split_once(':') else { continue };
            let field = field.trim().to_lowercase();
            let value = value.trim();

            match field.as_str() {
                "user-agent" => {
                    let starts_new = current.as_ref().is_none_or(|r| r.has_rules);
                    if starts_new {
                        if let Some(done) = current.take()
                            && done.applies_to(&user_agent)
                        {
                            kept = done.rules;
                        }
                        current = Some(Record::default());
                    }
                    if let Some(record) = current.as_mut() {
                        record.agents.push(value.to_lowercase());
                    }
                }
                "disallow" => {
                    let Some(record) = current.as_mut() else { continue };
                    record.has_rules = true;
                    if value.is_empty() {
                        record.rules.disallow.clear();
                    } else {
                        record.rules.disallow.push(value.to_string());
                    }
                }
                "allow" => {
                    let Some(record) = current.as_mut() else { continue };
                    record.has_rules = true;
                    if !value.is_empty() {
                        record.rules.allow.push(value.to_string());
                    }
                }
                _ => {}
            }
        }

        if let Some(done) = current
            && done.applies_to(&user_agent)
        {
            kept = done.rules;
        }

        kept
    }

    /// Whether `path` may be fetched.
    ///
    /// A path is blocked when a disallow rule matches and no allow rule does.
    pub fn is_allowed(&self, path: &str) -> bool {
        let disallowed = self.disallow.iter().any(|rule| rule_matches(rule, path));
        if !disallowed {
            return true;
        }

        self.allow.iter().any(|rule| rule_matches(rule, path))
    }
}

/// Exact, prefix, or `*`-suffixed prefix match.
fn rule_matches(rule: &str, path: &str) -> bool {
    let prefix = rule.strip_suffix('*').unwrap_or(rule);
    path == rule || path.starts_with(prefix)
}

/// `<origin>/robots.txt` for the given URL.
pub fn robots_url(url: &Url) -> Option<Url> {
    let mut robots = url.clone();
    url.host_str()?;
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    Some(robots)
}

/// Retrieve robots.txt for the origin of `url`.
///
/// Returns `None` on any failure (network error, non-2xx, timeout,
/// oversized or unreadable body), which callers treat as "allow all".
pub async fn fetch_robots_txt(http: &Client, url: &Url, user_agent: &str) -> Option<String> {
    let robots_url = robots_url(url)?;

    let response = match http
        .get(robots_url.as_str())
        .header(reqwest::header::USER_AGENT, user_agent)
        .timeout(ROBOTS_TIMEOUT)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("robots.txt unavailable for {}: {}", robots_url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("robots.txt returned {} for {}, allowing all", response.status(), robots_url);
        return None;
    }

    let bytes = response.bytes().await.ok()?;
    if bytes.len() > MAX_ROBOTS_SIZE {
        tracing::warn!("robots.txt too large for {} ({} bytes), ignoring", robots_url, bytes.len());
        return None;
    }

    Some(String::from_utf8_lossy(&bytes).into_owned())
}
