//! Ordering, grouping and labelling shared by every front end.

use std::cmp::Ordering;

use tracing::warn;

use crate::markup::{Renderer, Span};
use crate::models::{GlossaryTerm, Person, Record, Role};
use crate::xref::CrossReferenceIndex;

/// Shown in place of an empty field.
pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggle(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    fn apply(&self, cmp: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    }
}

/// Case-insensitive comparison without allocation.
fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

// ============================================================================
// Records
// ============================================================================

/// Chronological order: date, then records with a time before those
/// without, then the order within the day, then the id number.
pub fn timeline_cmp(a: &Record, b: &Record) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| match (&a.time, &b.time) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| match (a.order, b.order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.sequence().cmp(&b.sequence()))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_records<'r, I>(records: I, order: SortOrder) -> Vec<&'r Record>
where
    I: IntoIterator<Item = &'r Record>,
{
    let mut sorted: Vec<&Record> = records.into_iter().collect();
    sorted.sort_by(|a, b| order.apply(timeline_cmp(a, b)));
    sorted
}

/// One-line summary shown above a record's content, e.g.
/// `2024-01-01 | 09:30 | by Alice | [image] [2 attachments]`.
pub fn record_meta<R: Renderer + ?Sized>(renderer: &R, record: &Record, people: &[Person]) -> String {
    let when = match (&record.time, record.order) {
        (Some(time), _) => time.clone(),
        (None, Some(order)) => format!("#{} of the day", order),
        (None, None) => "time unknown".to_string(),
    };

    let author = if record.author.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        person_reference(renderer, &record.author, people)
    };

    let mut meta = format!("{} | {} | by {}", record.date, when, author);
    if record.image.is_some() {
        meta.push_str(" | [image]");
    }
    match record.attachments.len() {
        0 => {}
        1 => meta.push_str(" | [1 attachment]"),
        n => meta.push_str(&format!(" | [{} attachments]", n)),
    }
    meta
}

// ============================================================================
// People
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeopleSortKey {
    #[default]
    Id,
    Participation,
    Authored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow<'p> {
    pub person: &'p Person,
    pub participated: usize,
    /// Only students author records; `None` for everyone else.
    pub authored: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGroup<'p> {
    pub role: Role,
    pub rows: Vec<PersonRow<'p>>,
}

/// People split into role groups (students, teachers, others), each group
/// sorted by `key`. Empty groups are left out.
pub fn group_people_by_role<'p>(
    people: &'p [Person],
    xref: &CrossReferenceIndex,
    key: PeopleSortKey,
    order: SortOrder,
) -> Vec<RoleGroup<'p>> {
    Role::ALL
        .iter()
        .filter_map(|&role| {
            let mut rows: Vec<PersonRow<'p>> = people
                .iter()
                .filter(|p| p.role == role)
                .map(|person| PersonRow {
                    person,
                    participated: xref.count_participated(&person.id),
                    authored: (role == Role::Student).then(|| xref.count_authored(&person.id)),
                })
                .collect();
            if rows.is_empty() {
                return None;
            }

            rows.sort_by(|a, b| {
                let cmp = match key {
                    PeopleSortKey::Id => a.person.id.cmp(&b.person.id),
                    PeopleSortKey::Participation => a.participated.cmp(&b.participated),
                    PeopleSortKey::Authored => a.authored.unwrap_or(0).cmp(&b.authored.unwrap_or(0)),
                };
                order.apply(cmp.then_with(|| a.person.id.cmp(&b.person.id)))
            });
            Some(RoleGroup { role, rows })
        })
        .collect()
}

/// A person tag labelled with the person's id. Ids with no matching
/// person fall back to the bare id.
pub fn person_reference<R: Renderer + ?Sized>(renderer: &R, id: &str, people: &[Person]) -> String {
    if people.iter().any(|p| p.id == id) {
        renderer.render(&[Span::PersonRef { id, label: id }])
    } else {
        warn!(person = id, "Unknown person referenced");
        id.to_string()
    }
}

// ============================================================================
// Glossary
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GlossarySortKey {
    #[default]
    Since,
    Id,
}

pub fn sort_glossary(terms: &[GlossaryTerm], key: GlossarySortKey, order: SortOrder) -> Vec<&GlossaryTerm> {
    let mut sorted: Vec<&GlossaryTerm> = terms.iter().collect();
    sorted.sort_by(|a, b| {
        let cmp = match key {
            GlossarySortKey::Since => a.since.cmp(&b.since),
            GlossarySortKey::Id => cmp_ignore_case(&a.id, &b.id),
        };
        order.apply(cmp)
    });
    sorted
}

/// The term's related people as person references, comma separated.
pub fn related_people<R: Renderer + ?Sized>(renderer: &R, term: &GlossaryTerm, people: &[Person]) -> String {
    if term.related_people.is_empty() {
        return PLACEHOLDER.to_string();
    }
    term.related_people
        .iter()
        .map(|id| person_reference(renderer, id, people))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        PLACEHOLDER
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{HtmlRenderer, PlainRenderer};
    use crate::models::Attachment;
    use std::sync::Arc;

    fn record(id: &str, date: &str, time: Option<&str>, order: Option<i64>) -> Record {
        Record {
            id: id.to_string(),
            date: date.to_string(),
            time: time.map(str::to_string),
            order,
            author: String::new(),
            content: String::new(),
            importance: Default::default(),
            image: None,
            attachments: Vec::new(),
        }
    }

    fn person(id: &str, role: Role) -> Person {
        Person {
            id: id.to_string(),
            role,
            alias: String::new(),
            bio: String::new(),
        }
    }

    fn term(id: &str, since: &str) -> GlossaryTerm {
        GlossaryTerm {
            id: id.to_string(),
            term: id.to_uppercase(),
            since: since.to_string(),
            definition: String::new(),
            related_people: Vec::new(),
        }
    }

    #[test]
    fn test_timeline_order() {
        let records = vec![
            record("R005", "2024-01-02", None, None),
            record("R004", "2024-01-01", None, Some(2)),
            record("R003", "2024-01-01", None, Some(1)),
            record("R002", "2024-01-01", Some("14:00"), None),
            record("R001", "2024-01-01", Some("09:30"), None),
        ];
        let ids: Vec<_> = sort_records(&records, SortOrder::Ascending)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, ["R001", "R002", "R003", "R004", "R005"]);

        let newest = sort_records(&records, SortOrder::Descending);
        assert_eq!(newest[0].id, "R005");
    }

    #[test]
    fn test_same_slot_falls_back_to_id_number() {
        let records = vec![
            record("R010", "2024-01-01", None, None),
            record("R9", "2024-01-01", None, None),
        ];
        let sorted = sort_records(&records, SortOrder::Ascending);
        assert_eq!(sorted[0].id, "R9");
    }

    #[test]
    fn test_record_meta() {
        let people = vec![person("p1", Role::Student)];
        let mut r = record("R001", "2024-01-01", Some("09:30"), None);
        r.author = "p1".to_string();
        assert_eq!(
            record_meta(&PlainRenderer, &r, &people),
            "2024-01-01 | 09:30 | by p1"
        );

        r.time = None;
        r.order = Some(3);
        r.image = Some("img/1.jpg".to_string());
        r.attachments = vec![Attachment {
            name: "notes".to_string(),
            file: "files/notes.pdf".to_string(),
        }];
        assert_eq!(
            record_meta(&PlainRenderer, &r, &people),
            "2024-01-01 | #3 of the day | by p1 | [image] | [1 attachment]"
        );

        r.order = None;
        r.author = String::new();
        assert!(record_meta(&PlainRenderer, &r, &people).starts_with("2024-01-01 | time unknown | by —"));
    }

    #[test]
    fn test_person_reference_falls_back_to_id() {
        let people = vec![person("p1", Role::Student)];
        let renderer = HtmlRenderer::new();
        assert_eq!(
            person_reference(&renderer, "p1", &people),
            r#"<span class="person-tag" data-id="p1" title="p1">p1</span>"#
        );
        assert_eq!(person_reference(&renderer, "ghost", &people), "ghost");
    }

    #[test]
    fn test_group_people_by_role() {
        let people = vec![
            person("t1", Role::Teacher),
            person("p2", Role::Student),
            person("p1", Role::Student),
            person("x1", Role::Other),
        ];
        let records = vec![
            Record {
                author: "p2".to_string(),
                content: "[[p1|A]] and [[t1|T]]".to_string(),
                ..record("R001", "2024-01-01", None, None)
            },
            Record {
                author: "p2".to_string(),
                content: "[[p1|A]]".to_string(),
                ..record("R002", "2024-01-02", None, None)
            },
        ];
        let xref = CrossReferenceIndex::new(Arc::new(records));

        let groups = group_people_by_role(&people, &xref, PeopleSortKey::Id, SortOrder::Ascending);
        let roles: Vec<_> = groups.iter().map(|g| g.role).collect();
        assert_eq!(roles, [Role::Student, Role::Teacher, Role::Other]);
        assert_eq!(groups[0].rows[0].person.id, "p1");
        assert_eq!(groups[0].rows[0].participated, 2);
        assert_eq!(groups[0].rows[1].authored, Some(2));
        assert_eq!(groups[1].rows[0].authored, None);

        let by_authored =
            group_people_by_role(&people, &xref, PeopleSortKey::Authored, SortOrder::Descending);
        assert_eq!(by_authored[0].rows[0].person.id, "p2");

        let by_participation =
            group_people_by_role(&people, &xref, PeopleSortKey::Participation, SortOrder::Descending);
        assert_eq!(by_participation[0].rows[0].person.id, "p1");
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let people = vec![person("t1", Role::Teacher)];
        let xref = CrossReferenceIndex::new(Arc::new(Vec::new()));
        let groups = group_people_by_role(&people, &xref, PeopleSortKey::Id, SortOrder::Ascending);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].role, Role::Teacher);
    }

    #[test]
    fn test_sort_glossary() {
        let terms = vec![term("beta", "2023-10-01"), term("Alpha", "2024-01-01"), term("gamma", "2023-09-01")];

        let by_since: Vec<_> = sort_glossary(&terms, GlossarySortKey::Since, SortOrder::Ascending)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(by_since, ["gamma", "beta", "Alpha"]);

        let by_id: Vec<_> = sort_glossary(&terms, GlossarySortKey::Id, SortOrder::Descending)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(by_id, ["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn test_related_people() {
        let people = vec![person("p1", Role::Student)];
        let mut t = term("t1", "2024-01-01");
        assert_eq!(related_people(&PlainRenderer, &t, &people), PLACEHOLDER);

        t.related_people = vec!["p1".to_string(), "p9".to_string()];
        assert_eq!(related_people(&PlainRenderer, &t, &people), "p1, p9");
    }

    #[test]
    fn test_sort_order_toggle() {
        assert_eq!(SortOrder::default().toggle(), SortOrder::Descending);
        assert_eq!(or_placeholder("  "), PLACEHOLDER);
        assert_eq!(or_placeholder("bio"), "bio");
    }
}
