//! Post-merge metadata.

use std::collections::HashSet;

use crate::normalize::CanonicalRecord;

/// Counts written next to the record collection. Distinctness is exact string
/// equality; empty values are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metadata {
    pub total: usize,
    pub unique_police_forces: usize,
    pub unique_localities: usize,
    pub unique_categories: usize,
}

pub fn summarize(records: &[CanonicalRecord]) -> Metadata {
    let mut forces = HashSet::new();
    let mut localities = HashSet::new();
    let mut categories = HashSet::new();

    for record in records {
        if !record.police_force.is_empty() {
            forces.insert(record.police_force.as_str());
        }
        if !record.locality.is_empty() {
            localities.insert(record.locality.as_str());
        }
        if !record.category.is_empty() {
            categories.insert(record.category.as_str());
        }
    }

    Metadata {
        total: records.len(),
        unique_police_forces: forces.len(),
        unique_localities: localities.len(),
        unique_categories: categories.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::raw::{RawRecord, RawValue};

    fn record_with_force(force: RawValue) -> CanonicalRecord {
        normalize(&RawRecord::from_pairs([("Police_Force", force)]), 0).record
    }

    #[test]
    fn test_distinct_forces_ignore_empty_and_null() {
        let records: Vec<CanonicalRecord> = [
            RawValue::from("X"),
            RawValue::from("X"),
            RawValue::from("Y"),
            RawValue::from(""),
            RawValue::Empty,
        ]
        .into_iter()
        .map(record_with_force)
        .collect();

        let meta = summarize(&records);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.unique_police_forces, 2);
        assert_eq!(meta.unique_localities, 0);
        assert_eq!(meta.unique_categories, 0);
    }

    #[test]
    fn test_case_and_whitespace_are_distinct() {
        let rows = [
            ("Leeds", "Retail"),
            ("leeds", "Retail"),
            ("Leeds ", "retail"),
        ];
        let records: Vec<CanonicalRecord> = rows
            .iter()
            .map(|(loc, cat)| {
                normalize(
                    &RawRecord::from_pairs([("locality", *loc), ("category_level1", *cat)]),
                    0,
                )
                .record
            })
            .collect();

        let meta = summarize(&records);
        assert_eq!(meta.unique_localities, 3);
        assert_eq!(meta.unique_categories, 2);
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(summarize(&[]), Metadata::default());
    }
}
