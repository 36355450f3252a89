use astroscan::text::{char_prefix, has_digit_in_prefix, is_uppercase_line, normalize_space, split_lines};

#[test]
fn test_normalize_space_collapses_runs() {
    assert_eq!(normalize_space("  dark\tmatter \n halo  "), "dark matter halo");
    assert_eq!(normalize_space(""), "");
}

#[test]
fn test_char_prefix_is_boundary_safe() {
    assert_eq!(char_prefix("¹Jane Doe", 3), "¹Ja");
    assert_eq!(char_prefix("abc", 10), "abc");
}

#[test]
fn test_is_uppercase_line() {
    assert!(is_uppercase_line("MNRAS 000, 1-12 (2023)"));
    assert!(!is_uppercase_line("Draft version March 2023"));
    assert!(!is_uppercase_line("2023-01-01"));
}

#[test]
fn test_has_digit_in_prefix() {
    assert!(has_digit_in_prefix("Jane¹ Doe", 5));
    assert!(!has_digit_in_prefix("Jane Doe1", 5));
}

#[test]
fn test_split_lines_keeps_blank_lines() {
    assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
}
