//! Cross references between records, people and glossary terms.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::markup::{tokenize, Span};
use crate::models::Record;

/// Per-id statistics over one loaded record set.
///
/// Every record's content is tokenized once when the index is built; the
/// index is tied to that snapshot (`is_for`), so a reloaded record set
/// needs a new index.
#[derive(Debug)]
pub struct CrossReferenceIndex {
    records: Arc<Vec<Record>>,
    authored: HashMap<String, Vec<usize>>,
    participated: HashMap<String, Vec<usize>>,
    term_related: HashMap<String, Vec<usize>>,
}

impl CrossReferenceIndex {
    pub fn new(records: Arc<Vec<Record>>) -> Self {
        let mut authored: HashMap<String, Vec<usize>> = HashMap::new();
        let mut participated: HashMap<String, Vec<usize>> = HashMap::new();
        let mut term_related: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            if !record.author.is_empty() {
                authored.entry(record.author.clone()).or_default().push(i);
            }

            // A record counts once per id however often it mentions it
            let mut people = HashSet::new();
            let mut terms = HashSet::new();
            for span in tokenize(&record.content) {
                match span {
                    Span::PersonRef { id, .. } => {
                        people.insert(id);
                    }
                    Span::TermRef { id, .. } => {
                        terms.insert(id);
                    }
                    _ => {}
                }
            }
            for id in people {
                participated.entry(id.to_string()).or_default().push(i);
            }
            for id in terms {
                term_related.entry(id.to_string()).or_default().push(i);
            }
        }

        Self {
            records,
            authored,
            participated,
            term_related,
        }
    }

    /// True if this index was built from exactly `records`.
    pub fn is_for(&self, records: &Arc<Vec<Record>>) -> bool {
        Arc::ptr_eq(&self.records, records)
    }

    pub fn records(&self) -> &Arc<Vec<Record>> {
        &self.records
    }

    pub fn count_authored(&self, person_id: &str) -> usize {
        self.authored.get(person_id).map_or(0, Vec::len)
    }

    /// Records whose content mentions `person_id` with a person tag.
    pub fn count_participated(&self, person_id: &str) -> usize {
        self.participated.get(person_id).map_or(0, Vec::len)
    }

    pub fn authored_by(&self, person_id: &str) -> Vec<&Record> {
        self.select(self.authored.get(person_id))
    }

    pub fn participated_in(&self, person_id: &str) -> Vec<&Record> {
        self.select(self.participated.get(person_id))
    }

    /// Records whose content mentions `term_id` with a term tag.
    pub fn related_to_term(&self, term_id: &str) -> Vec<&Record> {
        self.select(self.term_related.get(term_id))
    }

    fn select(&self, positions: Option<&Vec<usize>>) -> Vec<&Record> {
        positions
            .map(|positions| positions.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, author: &str, content: &str) -> Record {
        Record {
            id: id.to_string(),
            date: "2024-01-01".to_string(),
            time: None,
            order: None,
            author: author.to_string(),
            content: content.to_string(),
            importance: Default::default(),
            image: None,
            attachments: vec![],
        }
    }

    fn index() -> CrossReferenceIndex {
        CrossReferenceIndex::new(Arc::new(vec![
            record("R001", "p1", "hello"),
            record("R002", "p2", "[[p1|Alice]] said hi to [[p1|her]]self"),
            record("R003", "p2", "[[p10|Tenth]] used {{t1|slang}}"),
            record("R004", "p3", "{{t10|other}} and [[REDACT|p1]]"),
        ]))
    }

    #[test]
    fn test_counts() {
        let xref = index();
        assert_eq!(xref.count_authored("p1"), 1);
        assert_eq!(xref.count_authored("p2"), 2);
        assert_eq!(xref.count_authored("nobody"), 0);
        assert_eq!(xref.count_participated("p1"), 1);
        assert_eq!(xref.count_participated("p10"), 1);
    }

    #[test]
    fn test_id_boundaries_are_exact() {
        let xref = index();
        let ids: Vec<_> = xref.participated_in("p1").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["R002"]);
        assert_eq!(xref.count_participated("p"), 0);

        let related: Vec<_> = xref.related_to_term("t1").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(related, ["R003"]);
    }

    #[test]
    fn test_stray_carets_and_underscores_keep_references() {
        let xref = CrossReferenceIndex::new(Arc::new(vec![
            record("R001", "p2", "a_b met [[stu_02|Bo]]"),
            record("R002", "p2", "2^10 with [[p1|Alice]] ^_^"),
            record("R003", "p2", "x^2 [[p1|A]] and _{{t1|slang}}_"),
        ]));
        assert_eq!(xref.count_participated("stu_02"), 1);
        assert_eq!(xref.count_participated("p1"), 2);
        assert_eq!(xref.related_to_term("t1").len(), 1);
    }

    #[test]
    fn test_authored_keeps_record_order() {
        let xref = index();
        let ids: Vec<_> = xref.authored_by("p2").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["R002", "R003"]);
    }

    #[test]
    fn test_snapshot_identity() {
        let records = Arc::new(vec![record("R001", "p1", "")]);
        let xref = CrossReferenceIndex::new(records.clone());
        assert!(xref.is_for(&records));
        assert!(!xref.is_for(&Arc::new(vec![record("R001", "p1", "")])));
    }
}
