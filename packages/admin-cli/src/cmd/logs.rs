use anyhow::Result;
use colored::Colorize;

use broadcast_client::GroupDirectory;

pub async fn show(directory: &GroupDirectory, limit: u32) -> Result<()> {
    let logs = directory.recent_logs(limit).await?;
    if logs.is_empty() {
        println!("no delivery logs");
        return Ok(());
    }
    for row in logs {
        let status = if row.status == "success" {
            row.status.green()
        } else {
            row.status.red()
        };
        let error = row.error.as_deref().unwrap_or("");
        println!(
            "{}  {:<24} {:<8} {}",
            row.created_at.dimmed(),
            row.group_title,
            status,
            error
        );
    }
    Ok(())
}
