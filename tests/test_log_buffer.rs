//! Log buffer unit tests

use deployerd::deploy::log_buffer::{LogBuffer, DEFAULT_TAIL_LINES};

#[test]
fn test_tail_returns_last_n_lines() {
    let mut buf = LogBuffer::new();
    buf.append("a\nb\nc\n");

    assert_eq!(buf.tail(2), vec!["b", "c"]);
    assert_eq!(buf.tail(3), vec!["a", "b", "c"]);
    assert_eq!(buf.tail(100), vec!["a", "b", "c"]);
}

#[test]
fn test_full_contents_preserved() {
    let mut buf = LogBuffer::new();
    buf.append("a\nb\nc\n");

    assert_eq!(buf.contents(), "a\nb\nc\n");
}

#[test]
fn test_trailing_newline_produces_no_empty_line() {
    let mut buf = LogBuffer::new();
    buf.append("only\n");

    assert_eq!(buf.tail(DEFAULT_TAIL_LINES), vec!["only"]);
}

#[test]
fn test_no_trailing_newline() {
    let mut buf = LogBuffer::new();
    buf.append("a\nb");

    assert_eq!(buf.tail(DEFAULT_TAIL_LINES), vec!["a", "b"]);
}

#[test]
fn test_embedded_newlines_in_one_append() {
    let mut buf = LogBuffer::new();
    buf.append("first\nsecond\n");
    buf.append("third\n");

    assert_eq!(buf.tail(2), vec!["second", "third"]);
}

#[test]
fn test_empty_buffer() {
    let buf = LogBuffer::new();

    assert!(buf.is_empty());
    assert!(buf.tail(DEFAULT_TAIL_LINES).is_empty());
    assert_eq!(buf.tail_text(DEFAULT_TAIL_LINES), "");
}

#[test]
fn test_clear() {
    let mut buf = LogBuffer::new();
    buf.append("a\nb\n");
    buf.clear();

    assert!(buf.is_empty());
    assert_eq!(buf.contents(), "");
}

#[test]
fn test_truncate_to_tail_keeps_last_lines() {
    let mut buf = LogBuffer::new();
    for i in 0..10 {
        buf.append(&format!("line {}\n", i));
    }

    buf.truncate_to_tail(DEFAULT_TAIL_LINES);

    let lines = buf.tail(100);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "line 5");
    assert_eq!(lines[4], "line 9");
}

#[test]
fn test_truncate_shorter_than_limit_is_noop() {
    let mut buf = LogBuffer::new();
    buf.append("a\nb\n");

    buf.truncate_to_tail(DEFAULT_TAIL_LINES);

    assert_eq!(buf.tail(100), vec!["a", "b"]);
}

#[test]
fn test_replace_with_line() {
    let mut buf = LogBuffer::new();
    buf.append("lots\nof\nold\noutput\n");

    buf.replace_with_line("Deployment finished successfully.");

    assert_eq!(buf.contents(), "Deployment finished successfully.\n");
    assert_eq!(buf.tail(DEFAULT_TAIL_LINES), vec!["Deployment finished successfully."]);
}

#[test]
fn test_from_contents_restores_blob() {
    let buf = LogBuffer::from_contents("a\nb\n".to_string());

    assert_eq!(buf.tail(1), vec!["b"]);
    assert_eq!(buf.contents(), "a\nb\n");
}
