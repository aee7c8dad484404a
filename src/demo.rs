//! Sample session: a handful of clients, two of them malformed, then a lookup,
//! a replace-all phone update and deletions.

use anyhow::Result;
use tracing::info;

use client_book::models::{ClientUpdate, NewClient};
use client_book::{BookError, ClientFilter, Database};

use crate::{print_report, print_rows};

pub async fn run(db: &Database) -> Result<()> {
    db.create_schema().await?;

    let samples = [
        NewClient::new("Алексей", "Осипов")
            .with_phones(["+79054001824"])
            .with_emails(["osip.a@ya.ru"]),
        NewClient::new("@@@@Владимир", "Парнет"),
        NewClient::new("Владимир", "Беляков").with_emails(["bel@jci.com"]),
        NewClient::new("Ярослав", "Кудинов")
            .with_phones(["ytttttt"])
            .with_emails(["kud.ya@hts.ru"]),
        NewClient::new("Николай", "Староверов")
            .with_phones(["+79050121420", "+79261114455"])
            .with_emails(["starov@jci.com"]),
    ];

    let mut ids = Vec::with_capacity(samples.len());
    for sample in &samples {
        let name = format!("{} {}", sample.first_name, sample.last_name);
        match db.create_client(sample).await {
            Ok(created) => {
                println!("{name}: client {}", created.id);
                print_report(&created.report);
                ids.push(Some(created.id));
            }
            Err(err) if !err.is_unavailable() => {
                println!("{name}: not saved: {err}");
                ids.push(None);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let (osipov, belyakov) = (ids[0], ids[2]);

    if let Some(id) = belyakov {
        report_step("add phone", db.add_phone(id, "+7787277").await)?;
    }

    println!("Lookup first_name=%ник% phone=%926%:");
    let filter = ClientFilter::new().first_name("%ник%").phone("%926%");
    print_rows(&db.find_clients(&filter).await?);

    if let Some(id) = osipov {
        let update = ClientUpdate::new().phones(["+79156", "+791178"]);
        let report = db.update_client(id, &update).await?;
        print_report(&report);
        println!("Phones of client {id} now: {:?}", db.phones_of(id).await?);
    }

    if let Some(id) = belyakov {
        let removed = db.delete_phones(id).await?;
        println!("Removed {removed} phone(s) of client {id}");
    }

    if let Some(id) = osipov {
        let deleted = db.delete_client(id).await?;
        println!(
            "Deleted client {id} with {} phone(s) and {} email(s)",
            deleted.phones, deleted.emails
        );
    }

    info!("demo finished");
    Ok(())
}

fn report_step(step: &str, outcome: Result<(), BookError>) -> Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(err) if !err.is_unavailable() => {
            println!("{step}: {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
