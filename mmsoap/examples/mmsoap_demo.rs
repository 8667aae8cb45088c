//! Exemple d'utilisation du client MMSoap
//!
//! Les identifiants viennent de `MMSOAP_USER_ID` et `MMSOAP_PASSWORD`, les
//! options de connexion de `~/.mmsoap/config.yaml` et des variables
//! `MMSOAP_CONFIG__*`.
//!
//! Usage:
//! ```bash
//! cargo run --example mmsoap_demo -- check-user
//! cargo run --example mmsoap_demo -- send +61400000000 "Hello"
//! cargo run --example mmsoap_demo -- blocked
//! ```

use anyhow::{Context, bail};
use mmsoap::{MMSoap, SendOptions};
use mmwsdl::SequenceAdapter;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let user_id = env::var("MMSOAP_USER_ID").context("MMSOAP_USER_ID is not set")?;
    let password = env::var("MMSOAP_PASSWORD").context("MMSOAP_PASSWORD is not set")?;

    let mut client = MMSoap::from_config(&user_id, &password)?;

    let outcome = match command.as_str() {
        "check-user" => check_user(&mut client),
        "send" => {
            if args.len() < 3 {
                print_usage();
                bail!("send needs a number and a message");
            }
            send(&mut client, &args[1], &args[2..].join(" "))
        }
        "blocked" => blocked(&mut client),
        other => {
            print_usage();
            bail!("unknown command {other}");
        }
    };

    if outcome.is_err() {
        if let Some(request) = client.session().last_request() {
            eprintln!("\n--- Last request ---\n{request}");
        }
        if let Some(response) = client.session().last_response() {
            eprintln!("\n--- Last response ---\n{response}");
        }
    }

    outcome
}

fn check_user(client: &mut MMSoap) -> anyhow::Result<()> {
    let info = client.get_user_info()?;

    match info.account_details {
        Some(details) => {
            println!("✓ Compte vérifié");
            println!("  Type: {}", details.kind.as_deref().unwrap_or("?"));
            println!("  Crédit: {:?} / {:?}", details.credit_remaining, details.credit_limit);
        }
        None => println!("✓ Compte vérifié (aucun détail)"),
    }

    Ok(())
}

fn send(client: &mut MMSoap, to: &str, content: &str) -> anyhow::Result<()> {
    let options = SendOptions {
        delivery_report: true,
        ..Default::default()
    };
    let result = client.send_message(to, content, &options)?;

    println!(
        "✓ Envoyés: {}, programmés: {}, échecs: {}",
        result.sent.unwrap_or(0),
        result.scheduled.unwrap_or(0),
        result.failed.unwrap_or(0)
    );

    Ok(())
}

fn blocked(client: &mut MMSoap) -> anyhow::Result<()> {
    let result = client.get_blocked_numbers()?;
    let recipients = result.recipients.unwrap_or_default();
    if recipients.count() <= 0 {
        println!("Aucun numéro bloqué");
        return Ok(());
    }

    println!(
        "{} numéro(s) bloqué(s), {} affiché(s)",
        result.found.unwrap_or(0),
        recipients.count()
    );

    let mut cursor = recipients.cursor();
    while let Some(recipient) = cursor.current() {
        println!("  {}. {}", cursor.current_key() + 1, recipient.number);
        cursor.advance();
    }

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: mmsoap_demo <check-user | send <number> <message> | blocked>");
}
