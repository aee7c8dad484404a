//! Single statements shared by the mutators. Each takes a connection so the caller
//! decides whether it runs inside a larger transaction or commits on its own.

use sqlx::PgConnection;

use crate::models::{ContactKind, NameChange};

pub async fn insert_client(
    conn: &mut PgConnection,
    first_name: &str,
    last_name: &str,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO clients (first_name, last_name)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(first_name)
    .bind(last_name)
    .fetch_one(&mut *conn)
    .await
}

/// Whether the client exists. Inside a transaction the row stays locked until commit.
pub async fn lock_client(conn: &mut PgConnection, client_id: i32) -> Result<bool, sqlx::Error> {
    let found: Option<i32> = sqlx::query_scalar("SELECT id FROM clients WHERE id = $1 FOR UPDATE")
        .bind(client_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}

/// Insert a whole list in one statement; one bad value refuses the list.
pub async fn insert_contacts(
    conn: &mut PgConnection,
    kind: ContactKind,
    client_id: i32,
    values: &[String],
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (client_id, {}) SELECT $1, unnest($2::varchar[])",
        kind.table(),
        kind.column()
    );

    let result = sqlx::query(&sql)
        .bind(client_id)
        .bind(values)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_contacts(
    conn: &mut PgConnection,
    kind: ContactKind,
    client_id: i32,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE client_id = $1", kind.table());

    let result = sqlx::query(&sql)
        .bind(client_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Drop every contact of this kind, then insert the new list.
pub async fn replace_contacts(
    conn: &mut PgConnection,
    kind: ContactKind,
    client_id: i32,
    values: &[String],
) -> Result<u64, sqlx::Error> {
    delete_contacts(&mut *conn, kind, client_id).await?;
    insert_contacts(&mut *conn, kind, client_id, values).await
}

/// Returns the number of client rows touched; zero means the id is unknown.
pub async fn update_names(
    conn: &mut PgConnection,
    client_id: i32,
    change: NameChange<'_>,
) -> Result<u64, sqlx::Error> {
    let query = match change {
        NameChange::Unchanged => return Ok(0),
        NameChange::First(first_name) => {
            sqlx::query("UPDATE clients SET first_name = $1 WHERE id = $2").bind(first_name)
        }
        NameChange::Last(last_name) => {
            sqlx::query("UPDATE clients SET last_name = $1 WHERE id = $2").bind(last_name)
        }
        NameChange::Both(first_name, last_name) => {
            sqlx::query("UPDATE clients SET first_name = $1, last_name = $2 WHERE id = $3")
                .bind(first_name)
                .bind(last_name)
        }
    };

    let result = query.bind(client_id).execute(&mut *conn).await?;

    Ok(result.rows_affected())
}

pub async fn delete_client_row(conn: &mut PgConnection, client_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(client_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
