#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

/// A client to be created, together with the contacts attached to it
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
}

impl NewClient {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phones: Vec::new(),
            emails: Vec::new(),
        }
    }

    pub fn with_phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = phones.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = emails.into_iter().map(Into::into).collect();
        self
    }
}

/// Which name columns an update touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameChange<'a> {
    Unchanged,
    First(&'a str),
    Last(&'a str),
    Both(&'a str, &'a str),
}

/// Partial update of a client.
///
/// Empty strings and empty lists count as "not given". Phones and emails, when given,
/// replace every existing row of that kind for the client.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    first_name: Option<String>,
    last_name: Option<String>,
    phones: Option<Vec<String>>,
    emails: Option<Vec<String>>,
}

impl ClientUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = Some(phones.into_iter().map(Into::into).collect());
        self
    }

    pub fn emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    pub fn name_change(&self) -> NameChange<'_> {
        let first = self.first_name.as_deref().filter(|s| !s.is_empty());
        let last = self.last_name.as_deref().filter(|s| !s.is_empty());

        match (first, last) {
            (Some(first), None) => NameChange::First(first),
            (None, Some(last)) => NameChange::Last(last),
            (Some(first), Some(last)) => NameChange::Both(first, last),
            (None, None) => NameChange::Unchanged,
        }
    }

    pub fn replacement_phones(&self) -> Option<&[String]> {
        self.phones.as_deref().filter(|p| !p.is_empty())
    }

    pub fn replacement_emails(&self) -> Option<&[String]> {
        self.emails.as_deref().filter(|e| !e.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name_change() == NameChange::Unchanged
            && self.replacement_phones().is_none()
            && self.replacement_emails().is_none()
    }
}
