use std::collections::HashSet;

use crate::domain::ProductRecord;

/// Tracks seen product names, enforces the output cap, and keeps the
/// accepted records in first-seen order.
pub struct Accumulator {
    cap: usize,
    seen: HashSet<String>,
    records: Vec<ProductRecord>,
}

impl Accumulator {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Accept a record unless its name was already seen or the cap is
    /// reached. Appending and marking the name seen happen together, so no
    /// record is ever half-recorded.
    pub fn offer(&mut self, record: ProductRecord) -> bool {
        if self.is_full() || !self.seen.insert(record.name.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Whether a name was already collected this run. Exact match: case- and
    /// whitespace-sensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_accepts_new_names() {
        let mut acc = Accumulator::new(10);
        assert!(acc.offer(ProductRecord::new("Chai Masala")));
        assert!(acc.offer(ProductRecord::new("Ghee 1L")));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_offer_rejects_duplicate_names() {
        let mut acc = Accumulator::new(10);
        assert!(acc.offer(ProductRecord::new("Chai Masala")));
        assert!(!acc.offer(ProductRecord::new("Chai Masala")));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_dedup_is_case_and_whitespace_sensitive() {
        let mut acc = Accumulator::new(10);
        assert!(acc.offer(ProductRecord::new("Chai Masala")));
        assert!(acc.offer(ProductRecord::new("chai masala")));
        assert!(acc.offer(ProductRecord::new("Chai  Masala")));
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_cap_enforced() {
        let mut acc = Accumulator::new(2);
        assert!(acc.offer(ProductRecord::new("A")));
        assert!(acc.offer(ProductRecord::new("B")));
        assert!(acc.is_full());
        assert!(!acc.offer(ProductRecord::new("C")));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_records_keep_first_seen_order() {
        let mut acc = Accumulator::new(10);
        for name in ["Zucchini", "Atta", "Mango Pulp"] {
            acc.offer(ProductRecord::new(name));
        }
        let names: Vec<_> = acc.into_records().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Zucchini", "Atta", "Mango Pulp"]);
    }

    #[test]
    fn test_contains_tracks_offered_names() {
        let mut acc = Accumulator::new(10);
        acc.offer(ProductRecord::new("Dal Tadka"));
        assert!(acc.contains("Dal Tadka"));
        assert!(!acc.contains("Dal"));
    }
}
