pub mod filter;
pub mod schema;
mod statements;

use std::fmt;

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BookError, BookResult};
use crate::models::{Client, ClientUpdate, ContactKind, ContactRow, NameChange, NewClient};

pub use filter::ClientFilter;

/// How composite writes (create, update) are committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// One transaction per logical operation; any rejection rolls the whole thing back
    #[default]
    Atomic,
    /// The client row, the phone list and the email list each commit on their own.
    /// A rejected later step is reported and the earlier steps stay.
    PerStatement,
}

/// A piece of a composite write that can be rejected on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Names,
    Contacts(ContactKind),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Names => f.write_str("names"),
            Step::Contacts(kind) => write!(f, "{}s", kind),
        }
    }
}

/// A step the store refused while the rest of the operation went through
#[derive(Debug)]
pub struct Rejection {
    pub step: Step,
    pub error: BookError,
}

/// Steps that were rejected during a per-statement write. Always empty under
/// [`CommitPolicy::Atomic`], where a rejection fails the whole call instead.
#[derive(Debug, Default)]
pub struct ChangeReport {
    pub rejected: Vec<Rejection>,
}

impl ChangeReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Debug)]
pub struct CreatedClient {
    pub id: i32,
    pub report: ChangeReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedClient {
    pub phones: u64,
    pub emails: u64,
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
    policy: CommitPolicy,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> BookResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self::from_pool(pool, config.commit_policy))
    }

    pub fn from_pool(pool: PgPool, policy: CommitPolicy) -> Self {
        Self { pool, policy }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create the clients, phones and emails tables if they are missing.
    pub async fn create_schema(&self) -> BookResult<()> {
        schema::create(self.get_pool()).await?;
        info!("schema ready");
        Ok(())
    }

    // Client operations
    pub async fn create_client(&self, client: &NewClient) -> BookResult<CreatedClient> {
        let created = match self.policy {
            CommitPolicy::Atomic => self.create_client_atomic(client).await,
            CommitPolicy::PerStatement => self.create_client_per_statement(client).await,
        }
        .inspect_err(|err| log_failure("create client", None, err))?;

        info!(
            client_id = created.id,
            rejected = created.report.rejected.len(),
            "client created"
        );
        Ok(created)
    }

    async fn create_client_atomic(&self, client: &NewClient) -> BookResult<CreatedClient> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        // Insert the client and take its generated id
        let id = statements::insert_client(&mut *tx, &client.first_name, &client.last_name).await?;

        // Attach phones, then emails
        for (kind, values) in contact_lists(client) {
            if !values.is_empty() {
                statements::insert_contacts(&mut *tx, kind, id, values).await?;
            }
        }

        // Commit the transaction
        tx.commit().await?;

        Ok(CreatedClient {
            id,
            report: ChangeReport::default(),
        })
    }

    async fn create_client_per_statement(&self, client: &NewClient) -> BookResult<CreatedClient> {
        // The client row commits on its own; without an id there is nothing to attach
        let id = {
            let mut tx = self.pool.begin().await?;
            let id =
                statements::insert_client(&mut *tx, &client.first_name, &client.last_name).await?;
            tx.commit().await?;
            id
        };

        // Each contact list is its own unit; a refused list is reported, not fatal
        let mut report = ChangeReport::default();
        for (kind, values) in contact_lists(client) {
            if values.is_empty() {
                continue;
            }
            if let Err(err) = self.commit_contacts(kind, id, values, false).await {
                record_rejection(&mut report, id, Step::Contacts(kind), err)?;
            }
        }

        Ok(CreatedClient { id, report })
    }

    pub async fn get_client(&self, id: i32) -> BookResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, first_name, last_name FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(client)
    }

    /// Apply a partial update. Names change in place; phones and emails, when given,
    /// replace everything the client had. An update with nothing set does nothing.
    pub async fn update_client(&self, id: i32, update: &ClientUpdate) -> BookResult<ChangeReport> {
        if update.is_empty() {
            debug!(client_id = id, "update with no fields, nothing to do");
            return Ok(ChangeReport::default());
        }

        let report = match self.policy {
            CommitPolicy::Atomic => self.update_client_atomic(id, update).await,
            CommitPolicy::PerStatement => self.update_client_per_statement(id, update).await,
        }
        .inspect_err(|err| log_failure("update client", Some(id), err))?;

        info!(client_id = id, rejected = report.rejected.len(), "client updated");
        Ok(report)
    }

    async fn update_client_atomic(&self, id: i32, update: &ClientUpdate) -> BookResult<ChangeReport> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        // Lock the client row; an unknown id fails the same way whatever was given
        if !statements::lock_client(&mut *tx, id).await? {
            return Err(BookError::NotFound(id));
        }

        let names = update.name_change();
        if names != NameChange::Unchanged {
            statements::update_names(&mut *tx, id, names).await?;
        }

        // Replace phones and emails wholesale
        for (kind, values) in replacement_lists(update) {
            if let Some(values) = values {
                statements::replace_contacts(&mut *tx, kind, id, values).await?;
            }
        }

        // Commit the transaction
        tx.commit().await?;

        Ok(ChangeReport::default())
    }

    async fn update_client_per_statement(
        &self,
        id: i32,
        update: &ClientUpdate,
    ) -> BookResult<ChangeReport> {
        let mut report = ChangeReport::default();

        {
            let mut conn = self.pool.acquire().await?;

            // Check the client exists before any step commits
            if !statements::lock_client(&mut *conn, id).await? {
                return Err(BookError::NotFound(id));
            }

            let names = update.name_change();
            if names != NameChange::Unchanged {
                match statements::update_names(&mut *conn, id, names).await {
                    Ok(0) => return Err(BookError::NotFound(id)),
                    Ok(_) => {}
                    Err(err) => record_rejection(&mut report, id, Step::Names, err)?,
                }
            }
        }

        // Each replacement is its own unit
        for (kind, values) in replacement_lists(update) {
            if let Some(values) = values {
                if let Err(err) = self.commit_contacts(kind, id, values, true).await {
                    record_rejection(&mut report, id, Step::Contacts(kind), err)?;
                }
            }
        }

        Ok(report)
    }

    /// Insert (or replace) one contact list in its own transaction.
    async fn commit_contacts(
        &self,
        kind: ContactKind,
        id: i32,
        values: &[String],
        replace: bool,
    ) -> Result<u64, sqlx::Error> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        let inserted = if replace {
            statements::replace_contacts(&mut *tx, kind, id, values).await?
        } else {
            statements::insert_contacts(&mut *tx, kind, id, values).await?
        };

        tx.commit().await?;
        Ok(inserted)
    }

    /// Remove a client together with its phones and emails, dependents first.
    pub async fn delete_client(&self, id: i32) -> BookResult<DeletedClient> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        // Delete phones and emails first, nothing cascades
        let phones = statements::delete_contacts(&mut *tx, ContactKind::Phone, id).await?;
        let emails = statements::delete_contacts(&mut *tx, ContactKind::Email, id).await?;

        // Finally delete the client
        if statements::delete_client_row(&mut *tx, id).await? == 0 {
            return Err(BookError::NotFound(id));
        }

        // Commit the transaction
        tx.commit().await?;

        info!(client_id = id, phones, emails, "client deleted");
        Ok(DeletedClient { phones, emails })
    }

    // Phone operations
    pub async fn add_phone(&self, client_id: i32, phone: &str) -> BookResult<()> {
        self.add_contact(ContactKind::Phone, client_id, phone).await
    }

    /// Delete every phone of the client. Returns how many were removed.
    pub async fn delete_phones(&self, client_id: i32) -> BookResult<u64> {
        self.delete_contacts(ContactKind::Phone, client_id).await
    }

    pub async fn phones_of(&self, client_id: i32) -> BookResult<Vec<String>> {
        self.contacts_of(ContactKind::Phone, client_id).await
    }

    // Email operations
    pub async fn add_email(&self, client_id: i32, email: &str) -> BookResult<()> {
        self.add_contact(ContactKind::Email, client_id, email).await
    }

    pub async fn delete_emails(&self, client_id: i32) -> BookResult<u64> {
        self.delete_contacts(ContactKind::Email, client_id).await
    }

    pub async fn emails_of(&self, client_id: i32) -> BookResult<Vec<String>> {
        self.contacts_of(ContactKind::Email, client_id).await
    }

    async fn add_contact(&self, kind: ContactKind, client_id: i32, value: &str) -> BookResult<()> {
        let sql = format!(
            "INSERT INTO {} (client_id, {}) VALUES ($1, $2)",
            kind.table(),
            kind.column()
        );

        sqlx::query(&sql)
            .bind(client_id)
            .bind(value)
            .execute(self.get_pool())
            .await
            .map_err(BookError::from)
            .inspect_err(|err| log_failure("add contact", Some(client_id), err))?;

        info!(client_id, kind = %kind, "contact added");
        Ok(())
    }

    async fn delete_contacts(&self, kind: ContactKind, client_id: i32) -> BookResult<u64> {
        let mut conn = self.pool.acquire().await?;
        let removed = statements::delete_contacts(&mut *conn, kind, client_id).await?;

        info!(client_id, kind = %kind, removed, "contacts deleted");
        Ok(removed)
    }

    async fn contacts_of(&self, kind: ContactKind, client_id: i32) -> BookResult<Vec<String>> {
        let sql = format!(
            "SELECT {column} FROM {table} WHERE client_id = $1 ORDER BY {column}",
            column = kind.column(),
            table = kind.table()
        );

        let values = sqlx::query_scalar::<_, String>(&sql)
            .bind(client_id)
            .fetch_all(self.get_pool())
            .await?;

        Ok(values)
    }

    // Lookup
    /// One row per (phone, email) pair of every client matching all supplied filters.
    /// Clients without a phone or without an email never appear.
    pub async fn find_clients(&self, filter: &ClientFilter) -> BookResult<Vec<ContactRow>> {
        let predicates = filter.predicates();
        let mut query = filter::lookup_query(&predicates);
        debug!(sql = query.sql(), filters = predicates.len(), "client lookup");

        let rows = query
            .build_query_as::<ContactRow>()
            .fetch_all(self.get_pool())
            .await
            .map_err(BookError::from)
            .inspect_err(|err| log_failure("find clients", None, err))?;

        Ok(rows)
    }
}

fn contact_lists(client: &NewClient) -> [(ContactKind, &[String]); 2] {
    [
        (ContactKind::Phone, client.phones.as_slice()),
        (ContactKind::Email, client.emails.as_slice()),
    ]
}

fn replacement_lists(update: &ClientUpdate) -> [(ContactKind, Option<&[String]>); 2] {
    [
        (ContactKind::Phone, update.replacement_phones()),
        (ContactKind::Email, update.replacement_emails()),
    ]
}

/// Keep a failed step in the report. Only a lost connection aborts the call, since
/// earlier steps have already committed.
fn record_rejection(
    report: &mut ChangeReport,
    client_id: i32,
    step: Step,
    err: sqlx::Error,
) -> BookResult<()> {
    let error = BookError::from(err);
    if error.is_unavailable() {
        return Err(error);
    }

    warn!(client_id, step = %step, code = error.code(), "{}", error);
    report.rejected.push(Rejection { step, error });
    Ok(())
}

fn log_failure(operation: &str, client_id: Option<i32>, err: &BookError) {
    match err {
        BookError::Rejected { .. } | BookError::NotFound(_) => {
            warn!(operation, client_id, code = err.code(), "{}", err)
        }
        _ => tracing::error!(operation, client_id, "{}", err),
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> BookResult<Database> {
    let db = Database::new(config).await?;

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_is_the_default_policy() {
        assert_eq!(CommitPolicy::default(), CommitPolicy::Atomic);
    }

    #[test]
    fn steps_read_as_table_contents() {
        assert_eq!(Step::Names.to_string(), "names");
        assert_eq!(Step::Contacts(ContactKind::Phone).to_string(), "phones");
        assert_eq!(Step::Contacts(ContactKind::Email).to_string(), "emails");
    }

    #[test]
    fn creation_lists_phones_before_emails() {
        let client = NewClient::new("Алексей", "Осипов").with_emails(["osip.a@ya.ru"]);
        let lists = contact_lists(&client);

        assert_eq!(lists[0].0, ContactKind::Phone);
        assert!(lists[0].1.is_empty());
        assert_eq!(lists[1].1, ["osip.a@ya.ru".to_string()]);
    }

    #[test]
    fn report_without_rejections_is_complete() {
        let mut report = ChangeReport::default();
        assert!(report.is_complete());

        record_rejection(&mut report, 1, Step::Names, sqlx::Error::PoolTimedOut).unwrap_err();
        assert!(report.is_complete());
    }

    #[test]
    fn non_connection_failures_stay_in_the_report() {
        let mut report = ChangeReport::default();

        record_rejection(
            &mut report,
            1,
            Step::Contacts(ContactKind::Phone),
            sqlx::Error::RowNotFound,
        )
        .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.rejected[0].step, Step::Contacts(ContactKind::Phone));
    }
}
