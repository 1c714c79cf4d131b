//! Small builder over BSON filter documents.
//!
//! Repositories describe their lookups with [`QueryFilter`] (equality, range,
//! substring and membership predicates) and [`ListOptions`] (ordering and
//! paging) instead of hand-assembling `doc!` trees for every list endpoint.

use mongodb::{
    bson::{doc, Bson, Document},
    options::FindOptions,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    doc: Document,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    /// Equality predicate that is skipped when `value` is `None`.
    pub fn eq_opt<V: Into<Bson>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn ne(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.push_operator(field, "$ne", value.into());
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.push_operator(field, "$gte", value.into());
        self
    }

    pub fn lte(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.push_operator(field, "$lte", value.into());
        self
    }

    /// Inclusive range; either bound may be open.
    pub fn between<V: Into<Bson>>(self, field: &str, min: Option<V>, max: Option<V>) -> Self {
        let filter = match min {
            Some(min) => self.gte(field, min),
            None => self,
        };
        match max {
            Some(max) => filter.lte(field, max),
            None => filter,
        }
    }

    /// Case-insensitive substring match. The needle is matched literally.
    pub fn contains(mut self, field: &str, needle: &str) -> Self {
        let needle = needle.trim();
        if needle.is_empty() {
            return self;
        }
        self.doc.insert(field, contains_regex(needle));
        self
    }

    /// Substring match against any of `fields`.
    pub fn contains_any(mut self, fields: &[&str], needle: &str) -> Self {
        let needle = needle.trim();
        if needle.is_empty() || fields.is_empty() {
            return self;
        }
        let clauses: Vec<Bson> = fields
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(*field, contains_regex(needle));
                Bson::Document(clause)
            })
            .collect();
        self.doc.insert("$or", clauses);
        self
    }

    pub fn any_of<V: Into<Bson>>(mut self, field: &str, values: Vec<V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.push_operator(field, "$in", Bson::Array(values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    fn push_operator(&mut self, field: &str, operator: &str, value: Bson) {
        match self.doc.get_mut(field) {
            Some(Bson::Document(ops)) => {
                ops.insert(operator, value);
            }
            _ => {
                let mut ops = Document::new();
                ops.insert(operator, value);
                self.doc.insert(field, ops);
            }
        }
    }
}

impl From<QueryFilter> for Document {
    fn from(filter: QueryFilter) -> Self {
        filter.into_document()
    }
}

fn contains_regex(needle: &str) -> Document {
    doc! { "$regex": regex::escape(needle), "$options": "i" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort: Vec<(String, SortOrder)>,
    pub offset: i64,
    /// Zero means unbounded.
    pub limit: i64,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paged(offset: i64, limit: i64) -> Self {
        Self {
            sort: Vec::new(),
            offset: offset.max(0),
            limit: limit.max(0),
        }
    }

    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push((field.to_string(), order));
        self
    }

    pub fn sort_document(&self) -> Option<Document> {
        if self.sort.is_empty() {
            return None;
        }
        let mut sort = Document::new();
        for (field, order) in &self.sort {
            sort.insert(field.as_str(), order.direction());
        }
        Some(sort)
    }

    pub fn to_find_options(&self) -> FindOptions {
        FindOptions::builder()
            .sort(self.sort_document())
            .skip((self.offset > 0).then_some(self.offset as u64))
            .limit((self.limit > 0).then_some(self.limit))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_and_optional_equality() {
        let filter = QueryFilter::new()
            .eq("course_id", "c-1")
            .eq_opt::<&str>("category", None)
            .eq_opt("published", Some(true))
            .into_document();

        assert_eq!(filter, doc! { "course_id": "c-1", "published": true });
    }

    #[test]
    fn range_bounds_merge_on_one_field() {
        let filter = QueryFilter::new()
            .between("price", Some(10.0), Some(50.0))
            .into_document();

        assert_eq!(filter, doc! { "price": { "$gte": 10.0, "$lte": 50.0 } });
    }

    #[test]
    fn open_range_only_emits_present_bound() {
        let filter = QueryFilter::new()
            .between::<f64>("price", None, Some(20.0))
            .into_document();

        assert_eq!(filter, doc! { "price": { "$lte": 20.0 } });
    }

    #[test]
    fn contains_escapes_regex_metacharacters() {
        let filter = QueryFilter::new().contains("title", "C++ (intro)").into_document();

        assert_eq!(
            filter,
            doc! { "title": { "$regex": r"C\+\+ \(intro\)", "$options": "i" } }
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = QueryFilter::new()
            .contains("title", "   ")
            .contains_any(&["name", "email"], "");
        assert!(filter.is_empty());
    }

    #[test]
    fn contains_any_builds_or_clause() {
        let filter = QueryFilter::new()
            .contains_any(&["name", "email"], "ali")
            .into_document();

        let clauses = filter.get_array("$or").expect("or clause");
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn any_of_builds_in_clause() {
        let filter = QueryFilter::new()
            .eq("published", true)
            .any_of("category", vec!["visa", "language"])
            .into_document();

        assert_eq!(
            filter,
            doc! { "published": true, "category": { "$in": ["visa", "language"] } }
        );
    }

    #[test]
    fn list_options_build_sort_and_paging() {
        let options = ListOptions::paged(20, 10)
            .sort_by("pinned", SortOrder::Desc)
            .sort_by("created_at", SortOrder::Desc);

        assert_eq!(
            options.sort_document(),
            Some(doc! { "pinned": -1, "created_at": -1 })
        );

        let find = options.to_find_options();
        assert_eq!(find.skip, Some(20));
        assert_eq!(find.limit, Some(10));
    }

    #[test]
    fn unbounded_list_options_have_no_limit() {
        let find = ListOptions::new().to_find_options();
        assert_eq!(find.limit, None);
        assert_eq!(find.skip, None);
        assert_eq!(find.sort, None);
    }
}
