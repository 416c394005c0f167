//! Filter query composition
//!
//! A query is zero or more predicates combined with logical AND. Field
//! equality, substring match and range membership are all plain closures
//! over the record type; the query just holds and ANDs them. An empty
//! query matches everything.
//!
//! Queries are deterministic: the same collection contents and the same
//! query always produce the same result sequence.

/// AND-composition of filter predicates over records of type `T`.
///
/// # Example
///
/// ```
/// use tabula_store::Query;
///
/// struct Tx { category: String, amount: f64 }
///
/// let q = Query::new()
///     .filter(|t: &Tx| t.category == "food")
///     .filter(|t: &Tx| t.amount > 10.0);
///
/// assert!(q.matches(&Tx { category: "food".into(), amount: 12.5 }));
/// assert!(!q.matches(&Tx { category: "rent".into(), amount: 12.5 }));
/// ```
pub struct Query<T> {
    predicates: Vec<Box<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> Query<T> {
    /// Create an empty query (matches every record).
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate; all predicates must hold for a record to match.
    pub fn filter(mut self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicates.push(Box::new(pred));
        self
    }

    /// Whether `record` satisfies every predicate.
    pub fn matches(&self, record: &T) -> bool {
        self.predicates.iter().all(|p| p(record))
    }

    /// Number of predicates in the query.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True when the query has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        name: String,
        qty: u32,
    }

    fn item(name: &str, qty: u32) -> Item {
        Item {
            name: name.to_string(),
            qty,
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let q: Query<Item> = Query::new();
        assert!(q.is_empty());
        assert!(q.matches(&item("anything", 0)));
    }

    #[test]
    fn test_single_predicate() {
        let q = Query::new().filter(|i: &Item| i.qty > 5);
        assert!(q.matches(&item("a", 6)));
        assert!(!q.matches(&item("a", 5)));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let q = Query::new()
            .filter(|i: &Item| i.name.contains("ap"))
            .filter(|i: &Item| i.qty >= 2);
        assert_eq!(q.len(), 2);

        assert!(q.matches(&item("apple", 3)));
        assert!(!q.matches(&item("apple", 1)));
        assert!(!q.matches(&item("pear", 3)));
    }

    #[test]
    fn test_range_predicate() {
        let q = Query::new().filter(|i: &Item| (2..=4).contains(&i.qty));
        assert!(q.matches(&item("a", 2)));
        assert!(q.matches(&item("a", 4)));
        assert!(!q.matches(&item("a", 5)));
    }
}
