//! Parsers for the free-form multi-line action inputs.

use indexmap::IndexMap;

/// Permission scope to access level, e.g. `actions` -> `read`.
///
/// Iteration order follows the last occurrence of each scope in the input.
pub type Permissions = IndexMap<String, String>;

/// Parse a comma and/or newline separated list such as `allowed_tools`.
///
/// Everything after a `#` on a line is a comment. There is no escape for a
/// literal `#`, so tokens cannot contain one.
pub fn parse_multiline_input(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `scope: level` lines into a permissions map.
///
/// Lines without a colon are ignored. Only the first colon separates key
/// from value. A repeated scope replaces the earlier entry.
pub fn parse_additional_permissions(text: &str) -> Permissions {
    let mut permissions = Permissions::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        permissions.shift_remove(key);
        permissions.insert(key.to_string(), value.trim().to_string());
    }

    permissions
}

/// `true` only for a case-insensitive `"true"`; unset or anything else is `false`.
pub fn parse_bool_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_multiline_empty() {
        assert!(parse_multiline_input("").is_empty());
    }

    #[test]
    fn test_parse_multiline_mixed_commas_and_newlines() {
        let tools =
            parse_multiline_input("Bash(bun install),Bash(bun test:*)\nBash(bun typecheck)");
        assert_eq!(
            tools,
            vec!["Bash(bun install)", "Bash(bun test:*)", "Bash(bun typecheck)"]
        );
    }

    #[test]
    fn test_parse_multiline_strips_comments() {
        let input = "\
# leading comment line
Edit, Read # trailing, Write
  # indented comment
Grep";
        assert_eq!(parse_multiline_input(input), vec!["Edit", "Read", "Grep"]);
    }

    #[test]
    fn test_parse_multiline_keeps_duplicates_in_order() {
        let tools = parse_multiline_input("Read\nEdit,Read\n\n,, ,\nRead");
        assert_eq!(tools, vec!["Read", "Edit", "Read", "Read"]);
    }

    #[test]
    fn test_parse_multiline_hash_inside_token_is_cut() {
        // No escaping: the fragment stops at the first '#'.
        assert_eq!(parse_multiline_input("Bash(echo a#b)"), vec!["Bash(echo a"]);
    }

    #[test]
    fn test_parse_multiline_crlf() {
        assert_eq!(parse_multiline_input("Edit\r\nRead\r\n"), vec!["Edit", "Read"]);
    }

    #[test]
    fn test_parse_permissions_basic() {
        let perms = parse_additional_permissions("actions: read\ncontents: write");
        assert_eq!(perms.len(), 2);
        assert_eq!(perms["actions"], "read");
        assert_eq!(perms["contents"], "write");
    }

    #[test]
    fn test_parse_permissions_last_write_wins() {
        let perms = parse_additional_permissions("a:1\na:2");
        assert_eq!(perms.len(), 1);
        assert_eq!(perms["a"], "2");
    }

    #[test]
    fn test_parse_permissions_order_of_last_occurrence() {
        let perms = parse_additional_permissions("a: 1\nb: 2\na: 3");
        let keys: Vec<&str> = perms.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(perms["a"], "3");
    }

    #[test]
    fn test_parse_permissions_splits_on_first_colon() {
        let perms = parse_additional_permissions("url: https://example.com:8080");
        assert_eq!(perms["url"], "https://example.com:8080");
    }

    #[test]
    fn test_parse_permissions_skips_lines_without_colon() {
        let input = "\
Grant extra scopes below
  actions :  read
this line is ignored
: orphan value
pull-requests: write
";
        let perms = parse_additional_permissions(input);
        assert_eq!(perms.len(), 2);
        assert_eq!(perms["actions"], "read");
        assert_eq!(perms["pull-requests"], "write");
    }

    #[test]
    fn test_parse_permissions_empty() {
        assert!(parse_additional_permissions("").is_empty());
        assert!(parse_additional_permissions("\n   \n").is_empty());
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("true"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some("True"), true)]
    #[case(Some("false"), false)]
    #[case(Some(""), false)]
    #[case(Some("yes"), false)]
    #[case(Some("1"), false)]
    #[case(Some(" true"), false)]
    fn test_parse_bool_flag(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_bool_flag(value), expected);
    }
}
