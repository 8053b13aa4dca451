//! Validation schema: every constant the validator checks against.
//!
//! [`Schema::default`] is the current card format. Callers that need a
//! different format (tests, a future schema version) build their own value
//! and pass it to [`Validator::new`](crate::validator::Validator::new).

use std::sync::LazyLock;

use regex::Regex;

/// Expected value of the `schema_version` field.
pub const SCHEMA_VERSION: &str = "1";

/// Scalar fields that must be present and non-blank.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "title", "bio"];

/// Maximum character counts of the narrative fields.
pub const MAX_LENGTHS: [(&str, usize); 6] = [
    ("name", 100),
    ("title", 200),
    ("bio", 500),
    ("dna", 300),
    ("about", 2000),
    ("private_note", 300),
];

/// Maximum number of `interests`.
pub const MAX_INTERESTS: usize = 10;

/// Sub-fields each entry of an array-of-object field must carry.
pub const ITEM_REQUIREMENTS: [(&str, &[&str]); 2] = [
    ("projects", &["name"]),
    ("experience", &["role", "company"]),
];

/// Markup and script patterns rejected anywhere in a card, checked in order.
pub const DANGEROUS_PATTERNS: [&str; 5] = [
    // any tag opening: <script, <img, <svg, <style ...
    r"<[a-zA-Z]",
    // inline event handlers: onclick=, onerror= ...
    r"(?i)on[a-z0-9_]+\s*=",
    r"(?i)javascript\s*:",
    r"(?i)data\s*:\s*text/html",
    r"(?i)vbscript\s*:",
];

/// Origin file names: `@<user>.yaml` or `@<user>.yml`.
pub const ORIGIN_PATTERN: &str = r"^@(.+)\.ya?ml$";

/// GitHub profile URLs; the capture is the username.
pub const PROFILE_URL_PATTERN: &str = r"^https?://github\.com/([A-Za-z0-9_-]+)/?$";

static DANGEROUS_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DANGEROUS_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("built-in dangerous pattern"))
        .collect()
});

static ORIGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ORIGIN_PATTERN).expect("built-in origin pattern"));

static PROFILE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PROFILE_URL_PATTERN).expect("built-in profile url pattern"));

/// The card schema.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Required value of `schema_version`.
    pub version: String,
    pub required_fields: Vec<String>,
    /// Map of technology categories.
    pub stack_field: String,
    /// Map of link label to URL.
    pub links_field: String,
    /// Link every card must have; also the identity source.
    pub required_link: String,
    /// Prefix every non-blank link must start with.
    pub secure_url_prefix: String,
    /// `(field, max chars)`, checked in order.
    pub max_lengths: Vec<(String, usize)>,
    /// `(list field, max items)`.
    pub list_limits: Vec<(String, usize)>,
    /// `(list field, required sub-fields)`.
    pub item_requirements: Vec<(String, Vec<String>)>,
    pub dangerous_patterns: Vec<Regex>,
    /// Matches the origin file name; group 1 is the username.
    pub origin_pattern: Regex,
    /// Matches the required link; group 1 is the username.
    pub profile_url_pattern: Regex,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            required_fields: REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            stack_field: "stack".to_string(),
            links_field: "links".to_string(),
            required_link: "github".to_string(),
            secure_url_prefix: "https://".to_string(),
            max_lengths: MAX_LENGTHS
                .iter()
                .map(|(field, max)| (field.to_string(), *max))
                .collect(),
            list_limits: vec![("interests".to_string(), MAX_INTERESTS)],
            item_requirements: ITEM_REQUIREMENTS
                .iter()
                .map(|(field, subs)| {
                    (
                        field.to_string(),
                        subs.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
            dangerous_patterns: DANGEROUS_REGEXES.clone(),
            origin_pattern: ORIGIN_RE.clone(),
            profile_url_pattern: PROFILE_URL_RE.clone(),
        }
    }
}

impl Schema {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_required_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.required_fields.contains(&field) {
            self.required_fields.push(field);
        }
        self
    }

    /// Set (or add) the maximum character count of a field.
    pub fn with_max_length(mut self, field: impl Into<String>, max: usize) -> Self {
        set_entry(&mut self.max_lengths, field.into(), max);
        self
    }

    /// Set (or add) the maximum item count of a list field.
    pub fn with_list_limit(mut self, field: impl Into<String>, max: usize) -> Self {
        set_entry(&mut self.list_limits, field.into(), max);
        self
    }

    /// Set (or add) the required sub-fields of an array-of-object field.
    pub fn with_item_requirement<I, S>(mut self, field: impl Into<String>, subs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subs = subs.into_iter().map(Into::into).collect();
        set_entry(&mut self.item_requirements, field.into(), subs);
        self
    }

    /// Append a dangerous-content pattern.
    pub fn with_dangerous_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.dangerous_patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn max_length(&self, field: &str) -> Option<usize> {
        self.max_lengths
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, max)| *max)
    }

    /// Username encoded in an origin such as `cards/@alice.yaml`.
    pub fn origin_user<'o>(&self, origin: &'o str) -> Option<&'o str> {
        let base = origin.rsplit(['/', '\\']).next().unwrap_or(origin);
        self.origin_pattern
            .captures(base)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Username encoded in a profile URL such as `https://github.com/alice`.
    pub fn profile_url_user<'u>(&self, url: &'u str) -> Option<&'u str> {
        self.profile_url_pattern
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// The first dangerous pattern `text` matches.
    pub fn dangerous_match(&self, text: &str) -> Option<&Regex> {
        self.dangerous_patterns.iter().find(|re| re.is_match(text))
    }
}

fn set_entry<T>(entries: &mut Vec<(String, T)>, key: String, value: T) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_user_ignores_directories() {
        let schema = Schema::default();
        assert_eq!(schema.origin_user("cards/@alice.yaml"), Some("alice"));
        assert_eq!(schema.origin_user("@bob.yml"), Some("bob"));
        assert_eq!(schema.origin_user(r"C:\cards\@carol.yaml"), Some("carol"));
        assert_eq!(schema.origin_user("cards/alice.yaml"), None);
        assert_eq!(schema.origin_user("@alice.json"), None);
    }

    #[test]
    fn test_profile_url_user() {
        let schema = Schema::default();
        assert_eq!(schema.profile_url_user("https://github.com/alice"), Some("alice"));
        assert_eq!(schema.profile_url_user("https://github.com/a-l_1/"), Some("a-l_1"));
        assert_eq!(schema.profile_url_user("https://github.com/alice/repo"), None);
        assert_eq!(schema.profile_url_user("https://gitlab.com/alice"), None);
    }

    #[test]
    fn test_overrides_replace_in_place() {
        let schema = Schema::default()
            .with_max_length("bio", 10)
            .with_max_length("tagline", 40)
            .with_list_limit("interests", 3);
        assert_eq!(schema.max_length("bio"), Some(10));
        assert_eq!(schema.max_length("tagline"), Some(40));
        assert_eq!(schema.max_lengths.len(), MAX_LENGTHS.len() + 1);
        assert_eq!(schema.list_limits, vec![("interests".to_string(), 3)]);
    }

    #[test]
    fn test_dangerous_patterns_in_order() {
        let schema = Schema::default();
        let hit = schema.dangerous_match("<img onerror=alert(1)>").unwrap();
        assert_eq!(hit.as_str(), DANGEROUS_PATTERNS[0]);
        let hit = schema.dangerous_match("a onClick = x").unwrap();
        assert_eq!(hit.as_str(), DANGEROUS_PATTERNS[1]);
        assert!(schema.dangerous_match("JavaScript: void").is_some());
        assert!(schema.dangerous_match("data: text/html;base64").is_some());
        assert!(schema.dangerous_match("I love <3 coding").is_none());
    }
}
