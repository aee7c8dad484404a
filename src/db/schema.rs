//! Table definitions for the address book.
//!
//! Every format rule lives in a named check constraint, so malformed names, phones and
//! emails are refused by the store itself.

use sqlx::PgPool;

pub const CREATE_CLIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(40) NOT NULL,
    last_name VARCHAR(40) NOT NULL,
    CONSTRAINT proper_first_name CHECK (first_name ~ '^[A-Za-z\u0400-\u04FF]{2,}$'),
    CONSTRAINT proper_last_name CHECK (last_name ~ '^[A-Za-z\u0400-\u04FF]{2,}$')
)
"#;

pub const CREATE_PHONES: &str = r#"
CREATE TABLE IF NOT EXISTS phones (
    client_id INTEGER NOT NULL REFERENCES clients (id),
    phone VARCHAR(20) NOT NULL,
    PRIMARY KEY (client_id, phone),
    CONSTRAINT proper_phone CHECK (phone ~ '^[+]\d{3,}$')
)
"#;

pub const CREATE_EMAILS: &str = r#"
CREATE TABLE IF NOT EXISTS emails (
    client_id INTEGER NOT NULL REFERENCES clients (id),
    email VARCHAR(50) NOT NULL,
    PRIMARY KEY (client_id, email),
    CONSTRAINT proper_email CHECK (email ~* '^[A-Za-z0-9._+%-]+@[A-Za-z0-9.-]+[.][A-Za-z]+$')
)
"#;

/// Creation order; dependents come after `clients`.
pub const TABLES: [&str; 3] = [CREATE_CLIENTS, CREATE_PHONES, CREATE_EMAILS];

/// Create the three tables unless they already exist.
pub async fn create(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in TABLES {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
