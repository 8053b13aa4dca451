//! Integration tests for schema validation and card admission

use devcard_core::{
    admit, parse, validate, validate_report, AdmissionError, Card, ErrorCode, Schema, Validator,
};

const VALID: &str = "\
schema_version: \"1\"
name: Alice Example
title: Systems Engineer
bio: Builds parsers.
stack:
  languages: [rust, go]
  tools:
    - docker
    - git
links:
  github: https://github.com/alice
  website: https://alice.dev
interests: [compilers, music]
projects:
  - name: devcard
    description: Profile cards
    status: active
experience:
  - role: Engineer
    company: Acme
    period: 2020-2024
";

const ORIGIN: &str = "cards/@alice.yaml";

fn codes(input: &str, origin: &str) -> Vec<ErrorCode> {
    validate(&parse(input), origin)
        .into_iter()
        .map(|e| e.code)
        .collect()
}

fn messages(input: &str, origin: &str) -> Vec<String> {
    validate(&parse(input), origin)
        .into_iter()
        .map(|e| e.message)
        .collect()
}

// ============================================================================
// Baseline Tests
// ============================================================================

#[test]
fn test_valid_card_passes() {
    assert_eq!(messages(VALID, ORIGIN), Vec::<String>::new());
}

#[test]
fn test_empty_document_reports_everything_in_order() {
    assert_eq!(
        codes("", "@nobody.yaml"),
        vec![
            ErrorCode::SchemaVersion,
            ErrorCode::MissingField,
            ErrorCode::MissingField,
            ErrorCode::MissingField,
            ErrorCode::InvalidStack,
            ErrorCode::MissingLinks,
        ]
    );
    assert_eq!(
        messages("", "@nobody.yaml"),
        vec![
            "schema_version must be \"1\", got \"(missing)\"",
            "Required field \"name\" is missing or empty",
            "Required field \"title\" is missing or empty",
            "Required field \"bio\" is missing or empty",
            "Required field \"stack\" must be a map with at least one category",
            "Required field \"links.github\" is missing (no links section)",
        ]
    );
}

#[test]
fn test_errors_accumulate_across_rules() {
    let input = VALID
        .replace("schema_version: \"1\"", "schema_version: 2")
        .replace("title: Systems Engineer", "title: \"  \"")
        .replace("website: https://alice.dev", "website: http://alice.dev");
    assert_eq!(
        codes(&input, ORIGIN),
        vec![
            ErrorCode::SchemaVersion,
            ErrorCode::MissingField,
            ErrorCode::InsecureLink,
        ]
    );
}

#[test]
fn test_report_serializes_with_codes() {
    let report = validate_report(&parse("name: Ada\n"), "@ada.yaml");
    assert!(!report.valid);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["errors"][0]["code"], "schema_version");
    assert_eq!(
        json["errors"][1]["message"],
        "Required field \"title\" is missing or empty"
    );

    let report = validate_report(&parse(VALID), ORIGIN);
    assert!(report.valid);
    assert!(report.messages().is_empty());
}

// ============================================================================
// Version and Required Field Tests
// ============================================================================

#[test]
fn test_schema_version_must_be_exact_string() {
    let input = VALID.replace("schema_version: \"1\"", "schema_version: 1.0");
    assert_eq!(
        messages(&input, ORIGIN),
        vec!["schema_version must be \"1\", got \"1.0\""]
    );

    let input = VALID.replace("schema_version: \"1\"", "schema_version: 1");
    assert!(messages(&input, ORIGIN).is_empty());
}

#[test]
fn test_required_field_must_be_scalar() {
    let input = VALID.replace("bio: Builds parsers.", "bio:\n  - one\n  - two");
    assert_eq!(codes(&input, ORIGIN), vec![ErrorCode::MissingField]);
}

// ============================================================================
// Stack Tests
// ============================================================================

#[test]
fn test_stack_scalar_is_invalid() {
    let input = "schema_version: 1\nname: A\ntitle: T\nbio: B\nstack: rust\nlinks:\n  github: https://github.com/alice\n";
    assert_eq!(codes(input, ORIGIN), vec![ErrorCode::InvalidStack]);
}

#[test]
fn test_stack_with_only_blocked_keys_is_empty() {
    let input = "schema_version: 1\nname: A\ntitle: T\nbio: B\nstack:\n  __proto__: x\nlinks:\n  github: https://github.com/alice\n";
    assert_eq!(
        messages(input, ORIGIN),
        vec!["\"stack\" must contain at least one category"]
    );
}

#[test]
fn test_stack_nested_map_and_no_technology() {
    let input = "schema_version: 1\nname: A\ntitle: T\nbio: B\nstack:\n  tools:\n    editor: vim\n  languages: []\nlinks:\n  github: https://github.com/alice\n";
    assert_eq!(
        messages(input, ORIGIN),
        vec![
            "stack.tools must be a string or array, not an object",
            "\"stack\" categories must contain at least one technology",
        ]
    );
}

#[test]
fn test_stack_scalar_category_counts_as_technology() {
    let input = VALID.replace(
        "  languages: [rust, go]\n  tools:\n    - docker\n    - git\n",
        "  languages: rust\n",
    );
    assert!(messages(&input, ORIGIN).is_empty());
}

// ============================================================================
// Link and Identity Tests
// ============================================================================

#[test]
fn test_identity_mismatch() {
    assert_eq!(
        messages(VALID, "cards/@bob.yaml"),
        vec!["Username mismatch: filename says \"bob\" but links.github points to \"alice\""]
    );
}

#[test]
fn test_identity_case_insensitive() {
    assert!(messages(VALID, "cards/@Alice.yml").is_empty());
}

#[test]
fn test_identity_skipped_for_unrecognized_origin() {
    assert!(messages(VALID, "cards/bob.yaml").is_empty());
    assert!(messages(VALID, "<stdin>").is_empty());
}

#[test]
fn test_unparseable_profile_url() {
    let input = VALID.replace("https://github.com/alice", "https://github.com/alice/repo");
    assert_eq!(
        messages(&input, ORIGIN),
        vec!["Could not extract username from links.github URL: \"https://github.com/alice/repo\""]
    );
}

#[test]
fn test_missing_required_link() {
    let input = VALID.replace("  github: https://github.com/alice\n", "");
    assert_eq!(
        messages(&input, ORIGIN),
        vec!["Required field \"links.github\" is missing or empty"]
    );

    let input = VALID.replace("github: https://github.com/alice", "github: \"\"");
    assert_eq!(codes(&input, ORIGIN), vec![ErrorCode::MissingRequiredLink]);
}

#[test]
fn test_insecure_and_nested_links() {
    let input = VALID.replace(
        "  website: https://alice.dev\n",
        "  website: http://alice.dev\n  blog:\n    url: https://blog.dev\n  empty: \"\"\n",
    );
    assert_eq!(
        messages(&input, ORIGIN),
        vec![
            "links.website must start with https:// (got \"http://alice.dev\")",
            "links.blog must be a string URL, not an object",
        ]
    );
}

// ============================================================================
// Length and List Tests
// ============================================================================

#[test]
fn test_length_limit_boundary() {
    let at_max = VALID.replace("Builds parsers.", &"a".repeat(500));
    assert!(messages(&at_max, ORIGIN).is_empty());

    let over = VALID.replace("Builds parsers.", &"a".repeat(501));
    assert_eq!(
        messages(&over, ORIGIN),
        vec!["\"bio\" exceeds max length of 500 (got 501)"]
    );
}

#[test]
fn test_length_counts_characters_not_bytes() {
    let input = VALID.replace("Alice Example", &"é".repeat(100));
    assert!(messages(&input, ORIGIN).is_empty());
}

#[test]
fn test_length_applies_to_folded_blocks() {
    let body = "word ".repeat(70);
    let input = format!("{}dna: >\n  {}\n  {}\n", VALID, body, body);
    assert_eq!(codes(&input, ORIGIN), vec![ErrorCode::TooLong]);
}

#[test]
fn test_too_many_interests() {
    let list = (0..11).map(|i| format!("i{}", i)).collect::<Vec<_>>().join(", ");
    let input = VALID.replace("[compilers, music]", &format!("[{}]", list));
    assert_eq!(
        messages(&input, ORIGIN),
        vec!["\"interests\" has 11 items (max 10)"]
    );
}

#[test]
fn test_interests_must_be_a_list() {
    let input = VALID.replace("[compilers, music]", "compilers");
    assert_eq!(messages(&input, ORIGIN), vec!["\"interests\" must be an array"]);
}

#[test]
fn test_item_required_fields() {
    let input = VALID
        .replace(
            "    status: active\n",
            "    status: active\n  - description: nameless\n  - just text\n",
        )
        .replace("    company: Acme\n", "");
    assert_eq!(
        messages(&input, ORIGIN),
        vec![
            "projects[1] is missing required field \"name\"",
            "projects[2] is missing required field \"name\"",
            "experience[0] is missing required field \"company\"",
        ]
    );
}

#[test]
fn test_projects_must_be_a_list() {
    let input = VALID.replace(
        "projects:\n  - name: devcard\n    description: Profile cards\n    status: active\n",
        "projects: devcard\n",
    );
    assert_eq!(codes(&input, ORIGIN), vec![ErrorCode::NotAList]);
}

// ============================================================================
// Content Scan Tests
// ============================================================================

#[test]
fn test_dangerous_markup_rejected() {
    let input = VALID.replace("Builds parsers.", "<img onerror=alert(1)>");
    let errors = validate(&parse(&input), ORIGIN);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::DangerousContent);
    assert_eq!(
        errors[0].message,
        "Dangerous content detected: \"<img onerror=alert(1)>...\" matches <[a-zA-Z]"
    );
}

#[test]
fn test_event_handler_rejected() {
    let input = VALID.replace("Builds parsers.", "x onload = y");
    let errors = validate(&parse(&input), ORIGIN);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Dangerous content detected: \"x onload = y...\" matches (?i)on[a-z0-9_]+\\s*="
    );
}

#[test]
fn test_vbscript_rejected() {
    let input = VALID.replace("Builds parsers.", "VBScript: msgbox");
    assert_eq!(codes(&input, ORIGIN), vec![ErrorCode::DangerousContent]);
}

#[test]
fn test_heart_is_not_markup() {
    let input = VALID.replace("Builds parsers.", "I love <3 coding");
    assert!(messages(&input, ORIGIN).is_empty());
}

#[test]
fn test_dangerous_content_found_at_depth() {
    let input = VALID
        .replace("Profile cards", "\"javascript:alert(1)\"")
        .replace("[compilers, music]", "[compilers, \"data: text/html,x\"]");
    assert_eq!(
        codes(&input, ORIGIN),
        vec![ErrorCode::DangerousContent, ErrorCode::DangerousContent]
    );
}

#[test]
fn test_dangerous_snippet_truncated() {
    let long = format!("<script>{}", "x".repeat(600));
    let input = VALID.replace("Builds parsers.", &long);
    let errors = validate(&parse(&input), ORIGIN);
    let expected: String = long.chars().take(80).collect();
    let prefix = format!("Dangerous content detected: \"{}...\"", expected);
    assert!(errors[1].message.starts_with(&prefix));
    assert_eq!(errors[0].code, ErrorCode::TooLong);
}

// ============================================================================
// Schema Override Tests
// ============================================================================

#[test]
fn test_custom_schema() {
    let schema = Schema::default()
        .with_version("2")
        .with_required_field("location")
        .with_max_length("title", 5)
        .with_list_limit("interests", 1)
        .with_item_requirement("projects", ["name", "url"]);
    let validator = Validator::new(schema);
    let input = VALID.replace("schema_version: \"1\"", "schema_version: \"2\"");

    let errors = validator.validate(&parse(&input), ORIGIN);
    let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![
            ErrorCode::MissingField,
            ErrorCode::TooLong,
            ErrorCode::TooManyItems,
            ErrorCode::ItemMissingField,
        ]
    );
    assert_eq!(errors[3].message, "projects[0] is missing required field \"url\"");
}

#[test]
fn test_custom_dangerous_pattern() {
    let validator = Validator::new(
        Schema::default()
            .with_dangerous_pattern(r"(?i)expression\s*\(")
            .unwrap(),
    );
    let input = VALID.replace("Builds parsers.", "width: expression(alert(1))");
    let errors = validator.validate(&parse(&input), ORIGIN);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::DangerousContent);

    assert!(Schema::default().with_dangerous_pattern("(unclosed").is_err());
}

// ============================================================================
// Card and Admission Tests
// ============================================================================

#[test]
fn test_admit_valid_card() {
    let doc = parse(VALID);
    let card = admit(&doc, ORIGIN, &Validator::default()).unwrap();
    assert_eq!(card.name, "Alice Example");
    assert_eq!(card.stack.len(), 2);
    assert_eq!(card.stack[1].name, "tools");
    assert_eq!(card.stack[1].items, vec!["docker", "git"]);
    assert_eq!(card.links[0].label, "github");
    assert_eq!(card.interests, vec!["compilers", "music"]);
    assert_eq!(card.projects[0].status, "active");
    assert_eq!(card.projects[0].url, "");
    assert_eq!(card.experience[0].period, "2020-2024");
    assert!(!card.has_take());
}

#[test]
fn test_admit_reports_unsafe_content_first() {
    let input = VALID
        .replace("title: Systems Engineer\n", "")
        .replace("Builds parsers.", "<svg onload=x>");
    let doc = parse(&input);
    match admit(&doc, ORIGIN, &Validator::default()) {
        Err(AdmissionError::UnsafeContent(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].code, ErrorCode::DangerousContent);
        }
        other => panic!("expected unsafe content, got {:?}", other),
    }
}

#[test]
fn test_admit_invalid_card() {
    let input = VALID.replace("title: Systems Engineer\n", "");
    let doc = parse(&input);
    let err = admit(&doc, ORIGIN, &Validator::default()).unwrap_err();
    assert!(matches!(err, AdmissionError::Invalid(_)));
    assert_eq!(err.errors().len(), 1);
    assert_eq!(err.to_string(), "card failed validation with 1 error(s)");
}

#[test]
fn test_card_defaults_for_sparse_document() {
    let doc = parse(
        "name: Ada\nstack: rust\nlinks:\n  github:\n    nested: x\n  blank: \"\"\nabout: |\n  Long form.\n",
    );
    let card = Card::from_document(&doc);
    assert_eq!(card.name, "Ada");
    assert_eq!(card.title, "");
    assert!(card.stack.is_empty());
    assert!(card.links.is_empty());
    assert!(card.projects.is_empty());
    assert!(card.has_take());
}
