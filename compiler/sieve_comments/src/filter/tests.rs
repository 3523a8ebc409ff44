use super::*;
use pretty_assertions::assert_eq;

fn remove_all(text: &str) -> String {
    filter_str(text, CommentPolicy::RemoveAll, false)
}

fn remove_directives(text: &str) -> String {
    filter_str(text, CommentPolicy::RemoveDirectives, false)
}

// === Keep ===

#[test]
fn test_keep_is_identity() {
    let text = "a // b\n/* c */ \"//\"\n";
    assert_eq!(filter_str(text, CommentPolicy::Keep, false), text);
}

// === RemoveAll ===

#[test]
fn test_remove_line_comment_keeps_newline() {
    assert_eq!(remove_all("int a; // note\nint b;\n"), "int a; \nint b;\n");
}

#[test]
fn test_remove_block_comment() {
    assert_eq!(remove_all("a /* x */b\n"), "a b\n");
    assert_eq!(remove_all("a /* one\ntwo */ b\n"), "a  b\n");
}

#[test]
fn test_block_comment_with_many_stars() {
    assert_eq!(remove_all("/** doc **/x/***/y\n"), "xy\n");
    assert_eq!(remove_all("/* a * b */c"), "c");
}

#[test]
fn test_comment_as_final_token() {
    assert_eq!(remove_all("x // tail"), "x ");
    assert_eq!(remove_all("x /* tail */"), "x ");
    assert_eq!(remove_all("x /* never closed"), "x ");
}

#[test]
fn test_lone_slash_survives() {
    assert_eq!(remove_all("a / b\n"), "a / b\n");
    assert_eq!(remove_all("a /"), "a /");
    assert_eq!(remove_all("x/\"y\"\n"), "x/\"y\"\n");
}

#[test]
fn test_url_in_string_is_not_a_comment() {
    let text = "String u = \"http://x\"; // gone\n";
    assert_eq!(remove_all(text), "String u = \"http://x\"; \n");
    assert_eq!(remove_directives(text), text);
}

#[test]
fn test_escaped_quote_in_string() {
    assert_eq!(remove_all("s = \"a\\\"//b\"; // c\n"), "s = \"a\\\"//b\"; \n");
}

#[test]
fn test_quote_inside_char_literal() {
    let text = "if (c == '\"') { u = \"http://a\"; } // x\n";
    assert_eq!(remove_all(text), "if (c == '\"') { u = \"http://a\"; } \n");
    assert_eq!(remove_directives(text), text);
}

#[test]
fn test_escaped_char_literal() {
    assert_eq!(remove_all("c = '\\''; s = \"//\"; // x\n"), "c = '\\''; s = \"//\"; \n");
    assert_eq!(remove_all("c = '/'; /* x */\n"), "c = '/'; \n");
}

#[test]
fn test_block_opener_in_string() {
    assert_eq!(remove_all("\"/*\" x /* y */\n"), "\"/*\" x \n");
}

#[test]
fn test_newline_ends_unterminated_string() {
    assert_eq!(remove_all("\"open\n// gone\n"), "\"open\n\n");
}

#[test]
fn test_crlf_line_endings() {
    assert_eq!(remove_all("a // x\r\nb\r\n"), "a \r\nb\r\n");
}

// === RemoveDirectives ===

#[test]
fn test_remove_directive_carriers() {
    let text = "//#if X\ncode(); //$ raw\n//> //#endif\n";
    assert_eq!(remove_directives(text), "\ncode(); \n\n");
}

#[test]
fn test_ordinary_comments_survive() {
    let text = "// plain\n/* block //# */\nx // note\n//\n";
    assert_eq!(remove_directives(text), text);
}

#[test]
fn test_whitespace_before_carrier() {
    let text = "//  #if X\n";
    assert_eq!(remove_directives(text), text);
    assert_eq!(
        filter_str(text, CommentPolicy::RemoveDirectives, true),
        "\n"
    );
    assert_eq!(
        filter_str("//   plain\n", CommentPolicy::RemoveDirectives, true),
        "//   plain\n"
    );
}

#[test]
fn test_candidate_at_end_of_input() {
    assert_eq!(filter_str("x //  ", CommentPolicy::RemoveDirectives, true), "x //  ");
}

// === Chunking and streaming ===

#[test]
fn test_chunk_boundaries_do_not_matter() {
    let text = "a /* b */ \"c//\" // d\n//#e\n";
    let whole = remove_all(text);

    let mut filter = CommentFilter::new(CommentPolicy::RemoveAll);
    let mut out = String::new();
    for c in text.chars() {
        filter.feed(c.encode_utf8(&mut [0; 4]), &mut out);
    }
    filter.finish(&mut out);
    assert_eq!(out, whole);
}

#[test]
fn test_filter_stream() {
    let input = "a // x\n/* y */b\n";
    let mut output = Vec::new();
    filter_stream(input.as_bytes(), &mut output, CommentPolicy::RemoveAll, false).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "a \nb\n");

    let mut output = Vec::new();
    filter_stream(input.as_bytes(), &mut output, CommentPolicy::Keep, false).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), input);
}

// === Policy names ===

#[test]
fn test_policy_names() {
    assert_eq!("keep".parse::<CommentPolicy>(), Ok(CommentPolicy::Keep));
    assert_eq!("REMOVE".parse::<CommentPolicy>(), Ok(CommentPolicy::RemoveAll));
    assert_eq!(
        "remove-directives".parse::<CommentPolicy>(),
        Ok(CommentPolicy::RemoveDirectives)
    );
    assert_eq!(
        "strip".parse::<CommentPolicy>(),
        Err(crate::UnknownPolicy("strip".to_string()))
    );
    assert_eq!(CommentPolicy::RemoveDirectives.to_string(), "remove-directives");
}

// === Property tests ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_filter {
    use super::{remove_all, remove_directives};
    use proptest::prelude::*;

    fn source_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                Just('/'),
                Just('*'),
                Just('"'),
                Just('\''),
                Just('\\'),
                Just('\n'),
                Just('#'),
                Just('$'),
                Just(' '),
                Just('a'),
            ],
            0..128,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #[test]
        fn remove_all_is_idempotent(text in source_text()) {
            let once = remove_all(&text);
            let twice = remove_all(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn removal_preserves_line_count_of_line_comments(
            lines in proptest::collection::vec("[a-z ]{0,8}(//[a-z#$ ]{0,8})?", 0..16)
        ) {
            let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
            prop_assert_eq!(remove_all(&text).lines().count(), lines.len());
            prop_assert_eq!(remove_directives(&text).lines().count(), lines.len());
        }

        #[test]
        fn quoted_urls_survive(host in "[a-z]{1,8}") {
            let text = format!("u = \"http://{host}\";\n");
            prop_assert_eq!(remove_all(&text), text.clone());
            prop_assert_eq!(remove_directives(&text), text);
        }
    }
}
