use anyhow::Result;
use colored::Colorize;

use broadcast_client::{GroupDirectory, SessionContext};

pub async fn list(directory: &GroupDirectory) -> Result<()> {
    let accounts = directory.accounts().await?;
    if accounts.is_empty() {
        println!("no accounts configured");
        return Ok(());
    }
    for account in accounts {
        let marker = if account.authorized {
            "authorized".green()
        } else {
            "not logged in".red()
        };
        println!("{:<20} {}", account.account, marker);
    }
    Ok(())
}

pub async fn auth_status(directory: &GroupDirectory, session: &SessionContext) -> Result<()> {
    anyhow::ensure!(
        !session.account().is_empty(),
        "no active account; run set-account first"
    );
    let status = directory.auth_status(session.account()).await?;
    if status.authorized {
        println!("{} is {}", session.account().bold(), "authorized".green());
    } else {
        println!("{} is {}", session.account().bold(), "not logged in".red());
    }
    Ok(())
}
