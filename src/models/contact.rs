use std::fmt;

/// One row of a client lookup: a client paired with one of its phones and one of its emails
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

/// The two kinds of contact rows hanging off a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Phone,
    Email,
}

impl ContactKind {
    pub fn table(self) -> &'static str {
        match self {
            ContactKind::Phone => "phones",
            ContactKind::Email => "emails",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ContactKind::Phone => "phone",
            ContactKind::Email => "email",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
