//! Lookup query construction.
//!
//! Filters become a list of predicates; each predicate pushes a column reference and a
//! bound parameter, never the user's text.

use sqlx::{Postgres, QueryBuilder};

const LOOKUP_BASE: &str = "SELECT c.id, c.first_name, c.last_name, p.phone, e.email \
     FROM clients c \
     JOIN phones p ON p.client_id = c.id \
     JOIN emails e ON e.client_id = c.id";

const LOOKUP_ORDER: &str = " ORDER BY c.id, p.phone, e.email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    FirstName,
    LastName,
    Phone,
    Email,
}

impl Column {
    pub fn qualified(self) -> &'static str {
        match self {
            Column::FirstName => "c.first_name",
            Column::LastName => "c.last_name",
            Column::Phone => "p.phone",
            Column::Email => "e.email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive pattern match; `%` and `_` are wildcards
    ILike,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::ILike => " ILIKE ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: Column,
    pub operator: Operator,
    pub value: String,
}

/// Optional lookup criteria, combined with AND
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl ClientFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, pattern: impl Into<String>) -> Self {
        self.first_name = Some(pattern.into());
        self
    }

    pub fn last_name(mut self, pattern: impl Into<String>) -> Self {
        self.last_name = Some(pattern.into());
        self
    }

    pub fn phone(mut self, pattern: impl Into<String>) -> Self {
        self.phone = Some(pattern.into());
        self
    }

    pub fn email(mut self, pattern: impl Into<String>) -> Self {
        self.email = Some(pattern.into());
        self
    }

    /// Supplied criteria in column order. Empty patterns are skipped.
    pub fn predicates(&self) -> Vec<Predicate> {
        [
            (Column::FirstName, &self.first_name),
            (Column::LastName, &self.last_name),
            (Column::Phone, &self.phone),
            (Column::Email, &self.email),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| Predicate {
                    column,
                    operator: Operator::ILike,
                    value: v.to_owned(),
                })
        })
        .collect()
    }
}

/// Build the joined lookup query for the given predicates.
pub fn lookup_query(predicates: &[Predicate]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(LOOKUP_BASE);

    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(predicate.column.qualified());
        builder.push(predicate.operator.as_sql());
        builder.push_bind(predicate.value.clone());
    }

    builder.push(LOOKUP_ORDER);
    builder
}
