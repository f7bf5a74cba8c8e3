//! Row sanitizer: silent cleanup of messy host data before tree building

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::row::{FieldSelectors, Row};

/// Keep rows that can take part in a tree.
///
/// A row survives when its identifier is non-empty and its parent is either
/// empty or names one of the non-empty identifiers of the input. Dropped rows
/// are not errors. Input order is preserved.
#[instrument(level = "debug", skip(rows), fields(rows = rows.len()))]
pub fn sanitize_rows<'a>(rows: &'a [Row], selectors: &FieldSelectors) -> Vec<&'a Row> {
    let identified: Vec<&Row> = rows
        .iter()
        .filter(|r| !r.value(&selectors.id).is_empty())
        .collect();

    let ids: HashSet<String> = identified.iter().map(|r| r.text(&selectors.id)).collect();

    let kept: Vec<&Row> = identified
        .iter()
        .copied()
        .filter(|r| {
            let parent = r.value(&selectors.parent);
            parent.is_empty() || ids.contains(&parent.canonical())
        })
        .collect();

    debug!(
        "sanitize: {} rows, {} without identifier, {} orphaned",
        rows.len(),
        rows.len() - identified.len(),
        identified.len() - kept.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, parent: &str) -> Row {
        [("id", id), ("parent", parent), ("label", "")]
            .into_iter()
            .collect()
    }

    fn selectors() -> FieldSelectors {
        FieldSelectors::new("id", "parent", "label")
    }

    #[test]
    fn given_rows_without_identifier_when_sanitizing_then_drops_them() {
        let rows = vec![row("", ""), row("A", "")];
        let kept = sanitize_rows(&rows, &selectors());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text("id"), "A");
    }

    #[test]
    fn given_orphan_parent_when_sanitizing_then_drops_orphan() {
        let rows = vec![row("A", ""), row("B", "Z")];
        let kept = sanitize_rows(&rows, &selectors());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn given_child_of_dropped_orphan_when_sanitizing_then_keeps_it() {
        // B is dropped, but C's parent was present in the identified set.
        let rows = vec![row("A", ""), row("B", "Z"), row("C", "B")];
        let kept: Vec<String> = sanitize_rows(&rows, &selectors())
            .iter()
            .map(|r| r.text("id"))
            .collect();
        assert_eq!(kept, vec!["A", "C"]);
    }

    #[test]
    fn given_numeric_parent_when_sanitizing_then_matches_text_identifier() {
        let mut child = Row::new();
        child.insert("id", "2");
        child.insert("parent", 1_i64);
        let rows = vec![row("1", ""), child];
        assert_eq!(sanitize_rows(&rows, &selectors()).len(), 2);
    }
}
