//! Typed filter predicates for book queries.
//!
//! A query is a list of `(field, operator, value)` predicates joined with AND.
//! The store adapter turns them into bound SQL parameters; nothing here ever
//! builds SQL from user input.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Isbn,
    Genre,
    PublishedYear,
}

impl BookField {
    pub fn column(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Isbn => "isbn",
            BookField::Genre => "genre",
            BookField::PublishedYear => "published_year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Case-sensitive substring match.
    Contains,
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: BookField,
    pub op: FilterOp,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilters {
    predicates: Vec<Predicate>,
}

impl BookFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    fn push(mut self, field: BookField, op: FilterOp, value: FilterValue) -> Self {
        self.predicates.push(Predicate { field, op, value });
        self
    }

    pub fn title_contains(self, title: impl Into<String>) -> Self {
        self.push(BookField::Title, FilterOp::Contains, FilterValue::Text(title.into()))
    }

    pub fn author_contains(self, author: impl Into<String>) -> Self {
        self.push(BookField::Author, FilterOp::Contains, FilterValue::Text(author.into()))
    }

    pub fn genre_contains(self, genre: impl Into<String>) -> Self {
        self.push(BookField::Genre, FilterOp::Contains, FilterValue::Text(genre.into()))
    }

    pub fn isbn_equals(self, isbn: impl Into<String>) -> Self {
        self.push(BookField::Isbn, FilterOp::Equals, FilterValue::Text(isbn.into()))
    }

    pub fn published_year_equals(self, year: i64) -> Self {
        self.push(BookField::PublishedYear, FilterOp::Equals, FilterValue::Integer(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_insertion_order() {
        let filters = BookFilters::new().title_contains("Old").published_year_equals(2023).isbn_equals("123");

        let fields: Vec<BookField> = filters.predicates().iter().map(|p| p.field).collect();
        assert_eq!(fields, vec![BookField::Title, BookField::PublishedYear, BookField::Isbn]);
        assert_eq!(filters.predicates()[0].op, FilterOp::Contains);
        assert_eq!(filters.predicates()[1].value, FilterValue::Integer(2023));
        assert_eq!(filters.predicates()[2].op, FilterOp::Equals);
    }

    #[test]
    fn empty_filters_impose_nothing() {
        assert!(BookFilters::new().is_empty());
        assert!(!BookFilters::new().genre_contains("Fiction").is_empty());
    }
}
