//! Tests for LineMap.

use crate::position::LineMap;

#[test]
fn test_line_of_offsets() {
    let map = LineMap::build("<?php\nclass A {}\n\nconst X = 1;\n");
    assert_eq!(map.line_of(0), 1);
    assert_eq!(map.line_of(5), 1);
    assert_eq!(map.line_of(6), 2);
    assert_eq!(map.line_of(16), 2);
    assert_eq!(map.line_of(17), 3);
    assert_eq!(map.line_of(18), 4);
    assert_eq!(map.line_of(19), 4);
}

#[test]
fn test_crlf_and_lone_cr() {
    let map = LineMap::build("a\r\nb\rc");
    assert_eq!(map.line_count(), 3);
    assert_eq!(map.line_of(3), 2);
    assert_eq!(map.line_of(5), 3);
}

#[test]
fn test_line_start() {
    let map = LineMap::build("ab\ncd\n");
    assert_eq!(map.line_start(1), Some(0));
    assert_eq!(map.line_start(2), Some(3));
    assert_eq!(map.line_start(0), None);
    assert_eq!(map.line_start(9), None);
}
