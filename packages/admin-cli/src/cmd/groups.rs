use std::collections::BTreeSet;

use anyhow::Result;
use colored::Colorize;

use broadcast_client::{GroupDirectory, GroupInfo, GroupScope, SessionContext};

pub async fn list(
    directory: &GroupDirectory,
    session: &mut SessionContext,
    all: bool,
    refresh: bool,
) -> Result<()> {
    if all {
        session.set_scope(GroupScope::All);
    }

    // Paint the cached snapshot first; the live result below supersedes it.
    if !refresh {
        if let Some(cached) = directory.cached(&session.list_key()) {
            println!("{}", "cached:".dimmed());
            render(&cached, &session.selection().into_iter().collect());
            println!();
        }
    }

    let groups = directory.fetch(session, refresh).await?;
    println!("{} ({} items)", "live:".dimmed(), groups.len());
    render(&groups, &session.selection().into_iter().collect());
    Ok(())
}

fn render(groups: &[GroupInfo], selected: &BTreeSet<i64>) {
    for group in groups {
        let badge = if group.is_channel && !group.is_megagroup {
            "channel".red()
        } else if group.is_megagroup {
            "supergroup".cyan()
        } else {
            "group".green()
        };
        let mark = if selected.contains(&group.id) { "*" } else { " " };
        let members = group
            .member_count
            .map(|n| format!(" ({})", n))
            .unwrap_or_default();
        let username = group
            .username
            .as_deref()
            .map(|u| format!(" @{}", u))
            .unwrap_or_default();
        let sendable = if group.sendable() { "" } else { "  [not sendable]" };
        println!(
            "{} {:<16} {:<32}{} [{}]{}{}",
            mark, group.id, group.title, members, badge, username, sendable
        );
    }
}

pub async fn clear_cache(directory: &GroupDirectory, session: &SessionContext) -> Result<()> {
    let account = Some(session.account()).filter(|a| !a.is_empty());
    directory.clear_server_cache(account).await?;
    println!("{}", "server cache cleared".green());
    Ok(())
}
