use clap::{Args, Parser, Subcommand};

use client_book::models::{ClientUpdate, NewClient};
use client_book::ClientFilter;

#[derive(Parser, Debug)]
#[command(name = "client-book", version, about = "Clients, their phones and emails in PostgreSQL")]
pub struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Commit each step of a create/update on its own instead of all at once
    #[arg(long, global = true)]
    pub per_statement: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the tables if they do not exist
    Init,
    /// Add a client with optional phones and emails
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long = "phone")]
        phones: Vec<String>,
        #[arg(long = "email")]
        emails: Vec<String>,
    },
    AddPhone { client_id: i32, phone: String },
    AddEmail { client_id: i32, email: String },
    /// Change names; given phones/emails replace all existing ones
    Update {
        client_id: i32,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long = "phone")]
        phones: Vec<String>,
        #[arg(long = "email")]
        emails: Vec<String>,
    },
    /// Remove every phone of a client
    DeletePhones { client_id: i32 },
    /// Remove every email of a client
    DeleteEmails { client_id: i32 },
    /// Remove a client with all its phones and emails
    Delete { client_id: i32 },
    /// Look clients up; patterns use % and _ and ignore case
    Find {
        #[command(flatten)]
        filter: FilterArgs,
        /// Show the results in an interactive list
        #[arg(long)]
        browse: bool,
    },
    /// Run the sample scenario against the configured database
    Demo,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub last: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> ClientFilter {
        let mut filter = ClientFilter::new();
        if let Some(first) = &self.first {
            filter = filter.first_name(first);
        }
        if let Some(last) = &self.last {
            filter = filter.last_name(last);
        }
        if let Some(phone) = &self.phone {
            filter = filter.phone(phone);
        }
        if let Some(email) = &self.email {
            filter = filter.email(email);
        }
        filter
    }
}

pub fn new_client(first: String, last: String, phones: Vec<String>, emails: Vec<String>) -> NewClient {
    NewClient::new(first, last).with_phones(phones).with_emails(emails)
}

pub fn client_update(
    first: Option<String>,
    last: Option<String>,
    phones: Vec<String>,
    emails: Vec<String>,
) -> ClientUpdate {
    let mut update = ClientUpdate::new().phones(phones).emails(emails);
    if let Some(first) = first {
        update = update.first_name(first);
    }
    if let Some(last) = last {
        update = update.last_name(last);
    }
    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_book::models::NameChange;

    #[test]
    fn add_collects_repeated_contacts() {
        let cli = Cli::try_parse_from([
            "client-book",
            "add",
            "--first",
            "Николай",
            "--last",
            "Староверов",
            "--phone",
            "+79050121420",
            "--phone",
            "+79261114455",
            "--email",
            "starov@jci.com",
        ])
        .unwrap();

        match cli.command {
            Command::Add { phones, emails, .. } => {
                assert_eq!(phones, vec!["+79050121420", "+79261114455"]);
                assert_eq!(emails, vec!["starov@jci.com"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn update_without_flags_is_empty() {
        let cli = Cli::try_parse_from(["client-book", "update", "9"]).unwrap();

        match cli.command {
            Command::Update {
                client_id,
                first,
                last,
                phones,
                emails,
            } => {
                assert_eq!(client_id, 9);
                assert!(client_update(first, last, phones, emails).is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn update_with_last_name_only() {
        let update = client_update(None, Some("Беляков".into()), vec![], vec![]);
        assert_eq!(update.name_change(), NameChange::Last("Беляков"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "client-book",
            "find",
            "--first",
            "%ник%",
            "--phone",
            "%926%",
            "--per-statement",
        ])
        .unwrap();

        assert!(cli.per_statement);
        match cli.command {
            Command::Find { filter, browse } => {
                assert!(!browse);
                assert_eq!(filter.to_filter().predicates().len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
