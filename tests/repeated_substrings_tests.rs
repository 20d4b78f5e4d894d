use doc_cleaner::{remove_repeated_substrings, Document, DocumentCleaner};

#[test]
fn removes_header_and_footer_repeated_across_pages() {
    let cleaner = DocumentCleaner {
        remove_empty_lines: false,
        remove_extra_whitespaces: false,
        remove_repeated_substrings: true,
        ..Default::default()
    };

    let text = "First Page\u{000C}This is a header.\n        Page  of\n        2\n        4\n        Lorem ipsum dolor sit amet\n        This is a footer number 1\n        This is footer number 2\u{000C}This is a header.\n        Page  of\n        3\n        4\n        Sid ut perspiciatis unde\n        This is a footer number 1\n        This is footer number 2\u{000C}This is a header.\n        Page  of\n        4\n        4\n        Sed do eiusmod tempor.\n        This is a footer number 1\n        This is footer number 2";

    let expected = "First Page\u{000C} 2\n        4\n        Lorem ipsum dolor sit amet\u{000C} 3\n        4\n        Sid ut perspiciatis unde\u{000C} 4\n        4\n        Sed do eiusmod tempor.";

    let result = cleaner.run(&[Document::new(text)]).expect("clean ok");
    assert_eq!(result.documents[0].content.as_deref(), Some(expected));
}

#[test]
fn two_pages_have_no_candidates_and_pass_through() {
    let text = "Header\nPage one body\u{000C}Header\nPage two body";
    assert_eq!(remove_repeated_substrings(text), text);
}

#[test]
fn single_page_passes_through() {
    let text = "Just one page with no form feeds at all.";
    assert_eq!(remove_repeated_substrings(text), text);
}

#[test]
fn page_number_only_lines_are_kept() {
    // Numeric page markers differ from page to page, so the exact-match
    // heuristic leaves them alone.
    let text = "cover\u{000C}1\nalpha body text here\u{000C}2\nbeta body text here\u{000C}3\ngamma body text here\u{000C}end";
    let cleaned = remove_repeated_substrings(text);
    assert!(cleaned.contains("1\n"));
    assert!(cleaned.contains("2\n"));
    assert!(cleaned.contains("3\n"));
}
