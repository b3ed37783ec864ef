use anyhow::Result;
use colored::Colorize;

use broadcast_client::SessionContext;

pub fn add(session: &mut SessionContext, ids: Vec<i64>) -> Result<()> {
    anyhow::ensure!(!ids.is_empty(), "pass at least one group id");
    session.select_many(ids);
    show(session)
}

pub fn remove(session: &mut SessionContext, ids: Vec<i64>) -> Result<()> {
    anyhow::ensure!(!ids.is_empty(), "pass at least one group id");
    for id in ids {
        session.deselect(id);
    }
    show(session)
}

pub fn show(session: &SessionContext) -> Result<()> {
    let selection = session.selection();
    if selection.is_empty() {
        println!("selection is empty");
    } else {
        println!(
            "{} selected: {}",
            selection.len().to_string().bold(),
            selection
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

pub fn clear(session: &mut SessionContext) -> Result<()> {
    session.clear_selection();
    println!("selection cleared");
    Ok(())
}
