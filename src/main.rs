mod cli;
mod demo;
mod tracing_setup;
mod ui;

use std::io;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use client_book::db::{ChangeReport, CommitPolicy, Database};
use client_book::models::ContactRow;
use client_book::{config, db, ClientFilter};

use crate::cli::{Cli, Command};
use crate::ui::lookup::{handle_input, render_lookup, LookupAction, LookupState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.debug)?;

    let config = config::init()?;
    let mut db = db::init(&config).await?;
    if cli.per_statement {
        db = db.with_policy(CommitPolicy::PerStatement);
    }

    match cli.command {
        Command::Init => {
            db.create_schema().await?;
            println!("Tables are in place");
        }
        Command::Add {
            first,
            last,
            phones,
            emails,
        } => {
            let created = db
                .create_client(&cli::new_client(first, last, phones, emails))
                .await?;
            println!("Created client {}", created.id);
            print_report(&created.report);
        }
        Command::AddPhone { client_id, phone } => {
            db.add_phone(client_id, &phone).await?;
            println!("Added {phone} to client {client_id}");
        }
        Command::AddEmail { client_id, email } => {
            db.add_email(client_id, &email).await?;
            println!("Added {email} to client {client_id}");
        }
        Command::Update {
            client_id,
            first,
            last,
            phones,
            emails,
        } => {
            let update = cli::client_update(first, last, phones, emails);
            let report = db.update_client(client_id, &update).await?;
            println!("Updated client {client_id}");
            print_report(&report);
        }
        Command::DeletePhones { client_id } => {
            let removed = db.delete_phones(client_id).await?;
            println!("Removed {removed} phone(s) of client {client_id}");
        }
        Command::DeleteEmails { client_id } => {
            let removed = db.delete_emails(client_id).await?;
            println!("Removed {removed} email(s) of client {client_id}");
        }
        Command::Delete { client_id } => {
            let deleted = db.delete_client(client_id).await?;
            println!(
                "Deleted client {client_id} with {} phone(s) and {} email(s)",
                deleted.phones, deleted.emails
            );
        }
        Command::Find { filter, browse } => {
            let filter = filter.to_filter();
            if browse {
                browse_results(&db, &filter).await?;
            } else {
                print_rows(&db.find_clients(&filter).await?);
            }
        }
        Command::Demo => demo::run(&db).await?,
    }

    Ok(())
}

pub fn print_rows(rows: &[ContactRow]) {
    if rows.is_empty() {
        println!("No matching clients");
        return;
    }

    for row in rows {
        println!(
            "{:>5}  {:<15} {:<15} {:<20} {}",
            row.id, row.first_name, row.last_name, row.phone, row.email
        );
    }
}

pub fn print_report(report: &ChangeReport) {
    for rejection in &report.rejected {
        println!("  {} not saved: {}", rejection.step, rejection.error);
    }
}

async fn browse_results(db: &Database, filter: &ClientFilter) -> Result<()> {
    let mut state = LookupState::new(db.find_clients(filter).await?);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_browser(&mut terminal, db, filter, &mut state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_browser<B: Backend>(
    terminal: &mut Terminal<B>,
    db: &Database,
    filter: &ClientFilter,
    state: &mut LookupState,
) -> Result<()> {
    loop {
        terminal.draw(|f| render_lookup(f, state))?;

        match handle_input(state)? {
            Some(LookupAction::Back) => break,
            Some(LookupAction::Refresh) => {
                *state = LookupState::new(db.find_clients(filter).await?);
            }
            Some(LookupAction::DeleteClient(id)) => {
                db.delete_client(id).await?;
                *state = LookupState::new(db.find_clients(filter).await?);
            }
            None => {}
        }
    }

    Ok(())
}
