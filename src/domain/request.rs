use std::collections::HashMap;

use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::sheets::row::Row;

/// Decision state of a license request row, as stored in the status column.
///
/// The sheet holds the Korean labels; the English names are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum RequestStatus {
    #[strum(to_string = "대기", serialize = "pending")]
    Pending,
    #[strum(to_string = "승인", serialize = "approved")]
    Approved,
    #[strum(to_string = "거절", serialize = "rejected")]
    Rejected,
}

impl RequestStatus {
    /// Parses a raw cell value. Blank or unknown labels are `None`.
    ///
    /// # Examples
    /// ```
    /// use license_approval::domain::request::RequestStatus;
    /// assert_eq!(RequestStatus::from_cell(" 대기 "), Some(RequestStatus::Pending));
    /// assert_eq!(RequestStatus::from_cell("Approved"), Some(RequestStatus::Approved));
    /// assert_eq!(RequestStatus::from_cell("보류"), None);
    /// ```
    pub fn from_cell(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Lowercase English name, used in URLs and logs.
    pub fn slug(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRow {
    pub group_id: String,
    pub sender: String,
    pub requested_at: String,
    pub name: String,
    pub primary_affiliation: String,
    pub secondary_affiliation: String,
    pub machine_id: String,
    pub status: Option<RequestStatus>,
    /// Physical row in the sheet at the time of the fetch that produced this record.
    pub position: Row,
}

impl RequestRow {
    pub fn is_pending(&self) -> bool {
        self.status == Some(RequestStatus::Pending)
    }
}

/// Pending rows sharing a request group id. Built per fetch, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestGroup {
    pub group_id: String,
    pub rows: Vec<RequestRow>,
}

impl RequestGroup {
    pub fn positions(&self) -> Vec<Row> {
        self.rows.iter().map(|row| row.position).collect()
    }

    pub fn sender(&self) -> &str {
        self.rows.first().map_or("", |row| row.sender.as_str())
    }

    pub fn requested_at(&self) -> &str {
        self.rows.first().map_or("", |row| row.requested_at.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keeps pending rows and groups them by `group_id`.
///
/// Groups come out in the order their id first appears among pending rows; rows keep
/// sheet order inside each group.
pub fn group_pending<'a, I>(rows: I) -> Vec<RequestGroup>
where
    I: IntoIterator<Item = &'a RequestRow>,
{
    let mut groups: Vec<RequestGroup> = Vec::new();
    let mut index_by_id: HashMap<&'a str, usize> = HashMap::new();

    for row in rows.into_iter().filter(|row| row.is_pending()) {
        match index_by_id.get(row.group_id.as_str()) {
            Some(&index) => groups[index].rows.push(row.clone()),
            None => {
                index_by_id.insert(row.group_id.as_str(), groups.len());
                groups.push(RequestGroup {
                    group_id: row.group_id.clone(),
                    rows: vec![row.clone()],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn row(index: usize, group_id: &str, status: Option<RequestStatus>, name: &str) -> RequestRow {
        RequestRow {
            group_id: group_id.to_string(),
            sender: format!("{group_id}@example.com"),
            requested_at: "2024-05-02 10:31:00".to_string(),
            name: name.to_string(),
            primary_affiliation: "Research".to_string(),
            secondary_affiliation: "Vision".to_string(),
            machine_id: format!("MID-{index:04}"),
            status,
            position: Row::for_record(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_status_labels() {
        assert_eq!(RequestStatus::Pending.to_string(), "대기");
        assert_eq!(RequestStatus::Approved.as_ref(), "승인");
        assert_eq!(RequestStatus::Rejected.to_string(), "거절");
    }

    #[test]
    fn test_status_parse_both_languages() {
        for status in RequestStatus::iter() {
            assert_eq!(RequestStatus::from_cell(status.as_ref()), Some(status));
            assert_eq!(RequestStatus::from_cell(status.slug()), Some(status));
        }
        assert_eq!(RequestStatus::from_cell("PENDING"), Some(RequestStatus::Pending));
        assert_eq!(RequestStatus::from_cell(""), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_pending_group_excludes_resolved() {
        let rows = vec![
            row(0, "m1", Some(RequestStatus::Pending), "A"),
            row(1, "m1", Some(RequestStatus::Pending), "B"),
            row(2, "m2", Some(RequestStatus::Approved), "C"),
        ];

        let groups = group_pending(&rows);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_id, "m1");
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].positions(), vec![Row::from_row(2), Row::from_row(3)]);
    }

    #[test]
    fn test_group_order_follows_first_pending_occurrence() {
        let rows = vec![
            row(0, "late", Some(RequestStatus::Approved), "X"),
            row(1, "b", Some(RequestStatus::Pending), "B1"),
            row(2, "a", Some(RequestStatus::Pending), "A1"),
            row(3, "late", Some(RequestStatus::Pending), "L1"),
            row(4, "b", Some(RequestStatus::Pending), "B2"),
        ];

        let ids: Vec<_> = group_pending(&rows)
            .into_iter()
            .map(|group| group.group_id)
            .collect();

        assert_eq!(ids, vec!["b", "a", "late"]);
    }

    #[test]
    fn test_grouping_is_exhaustive_and_disjoint() {
        let statuses = [
            Some(RequestStatus::Pending),
            None,
            Some(RequestStatus::Rejected),
            Some(RequestStatus::Pending),
            Some(RequestStatus::Approved),
        ];
        let rows: Vec<_> = (0..40)
            .map(|i| row(i, &format!("g{}", i % 7), statuses[i % statuses.len()], "n"))
            .collect();

        let groups = group_pending(&rows);

        let mut seen = HashSet::new();
        for group in &groups {
            for member in &group.rows {
                assert!(member.is_pending());
                assert_eq!(member.group_id, group.group_id);
                assert!(seen.insert(member.position), "row listed twice");
            }
        }
        let pending: HashSet<_> = rows
            .iter()
            .filter(|r| r.is_pending())
            .map(|r| r.position)
            .collect();
        assert_eq!(seen, pending);

        let ids: HashSet<_> = groups.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids.len(), groups.len());
    }

    #[test]
    fn test_no_pending_rows() {
        let rows = vec![
            row(0, "m1", Some(RequestStatus::Approved), "A"),
            row(1, "m2", None, "B"),
        ];
        assert!(group_pending(&rows).is_empty());
        assert!(group_pending(&Vec::<RequestRow>::new()).is_empty());
    }

    #[test]
    fn test_group_header_fields_come_from_first_row() {
        let mut first = row(3, "m9", Some(RequestStatus::Pending), "A");
        first.sender = "first@example.com".to_string();
        let second = row(4, "m9", Some(RequestStatus::Pending), "B");

        let groups = group_pending(&[first, second]);
        assert_eq!(groups[0].sender(), "first@example.com");
        assert_eq!(groups[0].requested_at(), "2024-05-02 10:31:00");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn status() -> impl Strategy<Value = Option<RequestStatus>> {
            prop_oneof![
                Just(None),
                Just(Some(RequestStatus::Pending)),
                Just(Some(RequestStatus::Approved)),
                Just(Some(RequestStatus::Rejected)),
            ]
        }

        fn rows() -> impl Strategy<Value = Vec<RequestRow>> {
            proptest::collection::vec(("[a-d]", status()), 0..64).prop_map(|cells| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(index, (group_id, status))| row(index, &group_id, status, "n"))
                    .collect()
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                rng_seed: proptest::test_runner::RngSeed::Fixed(0),
                failure_persistence: None,
                .. ProptestConfig::default()
            })]

            #[test]
            fn grouped_rows_are_pending_and_match_their_group(rows in rows()) {
                for group in group_pending(&rows) {
                    prop_assert!(!group.is_empty());
                    for member in &group.rows {
                        prop_assert!(member.is_pending());
                        prop_assert_eq!(&member.group_id, &group.group_id);
                    }
                }
            }

            #[test]
            fn grouping_is_exhaustive_and_disjoint(rows in rows()) {
                let groups = group_pending(&rows);

                let mut grouped: Vec<Row> = groups.iter().flat_map(|g| g.positions()).collect();
                let pending: Vec<Row> = rows.iter().filter(|r| r.is_pending()).map(|r| r.position).collect();
                grouped.sort();
                prop_assert_eq!(grouped, pending);

                let ids: HashSet<_> = groups.iter().map(|g| g.group_id.as_str()).collect();
                prop_assert_eq!(ids.len(), groups.len());
            }

            #[test]
            fn groups_follow_first_pending_occurrence(rows in rows()) {
                let mut expected: Vec<&str> = Vec::new();
                for row in rows.iter().filter(|r| r.is_pending()) {
                    if !expected.contains(&row.group_id.as_str()) {
                        expected.push(row.group_id.as_str());
                    }
                }

                let groups = group_pending(&rows);
                let actual: Vec<&str> = groups.iter().map(|g| g.group_id.as_str()).collect();
                prop_assert_eq!(actual, expected);

                for group in &groups {
                    let positions = group.positions();
                    prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
                }
            }
        }
    }
}
