use astroscan::paper::{extract, labeled, DocumentFormat};
use astroscan::text::split_lines;

#[test]
fn test_labeled_fields_are_extracted() {
    let raw = "Title: X\nAuthors: A, B\nCategory: C\nAbstract: D";
    let metadata = extract(raw);

    assert_eq!(metadata.title, "X");
    assert_eq!(metadata.authors, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(metadata.category, "C");
    assert_eq!(metadata.abstract_text, "D");
}

#[test]
fn test_labeled_fields_are_trimmed() {
    let raw = "  Title:   Dwarf Galaxy Survey  \n\tAuthors:  Jane Doe ,John Smith,  , \nCategory:  astro-ph.GA \nAbstract:   We survey dwarfs.   \n";
    let metadata = extract(raw);

    assert_eq!(metadata.title, "Dwarf Galaxy Survey");
    assert_eq!(metadata.authors, vec!["Jane Doe", "John Smith"]);
    assert_eq!(metadata.category, "astro-ph.GA");
    assert_eq!(metadata.abstract_text, "We survey dwarfs.");
}

#[test]
fn test_labeled_abstract_runs_to_end_of_text() {
    let raw = "Title: Multi-line\nAbstract:\nFirst line of the abstract.\nSecond line of the abstract.\n";
    let metadata = extract(raw);

    assert_eq!(
        metadata.abstract_text,
        "First line of the abstract.\nSecond line of the abstract."
    );
}

#[test]
fn test_labeled_without_abstract_marker() {
    let metadata = extract("Title: Only a title\nAuthors: Solo Author");
    assert_eq!(metadata.title, "Only a title");
    assert_eq!(metadata.authors, vec!["Solo Author"]);
    assert_eq!(metadata.abstract_text, "");
}

#[test]
fn test_labeled_authors_do_not_split_on_apostrophes() {
    assert_eq!(
        labeled::split_authors(" Conor O'Brien, Mary-Jane Watson "),
        vec!["Conor O'Brien", "Mary-Jane Watson"]
    );
}

#[test]
fn test_labeled_detection_wins_even_when_mostly_empty() {
    let raw = "Title:\nABSTRACT\nThis would be an abstract in raw text.\n1 INTRODUCTION\n";
    let lines = split_lines(raw);
    assert_eq!(DocumentFormat::detect(&lines), DocumentFormat::Labeled);

    let metadata = extract(raw);
    assert_eq!(metadata.title, "");
    assert_eq!(metadata.abstract_text, "");
}

#[test]
fn test_title_label_after_line_twenty_is_ignored() {
    let mut raw = "\n".repeat(21);
    raw.push_str("Title: Fake\nAuthors: A, B\nCategory: C\n");
    let lines = split_lines(&raw);
    assert_eq!(DocumentFormat::detect(&lines), DocumentFormat::Heuristic);

    let metadata = extract(&raw);
    assert_ne!(metadata.title, "Fake");
    assert!(metadata.authors.is_empty());
    assert_ne!(metadata.category, "C");
}

#[test]
fn test_title_label_on_line_twenty_is_detected() {
    let mut raw = "\n".repeat(19);
    raw.push_str("  Title: Late Label\n");
    let lines = split_lines(&raw);
    assert_eq!(DocumentFormat::detect(&lines), DocumentFormat::Labeled);
    assert_eq!(extract(&raw).title, "Late Label");
}
