use anyhow::Result;
use colored::Colorize;

use broadcast_client::{JobDispatcher, JobRequest, SessionContext, TaskStatus};

use crate::SendArgs;

fn build_job(session: &SessionContext, args: &SendArgs) -> JobRequest {
    let mut job = JobRequest::new(session.selection(), args.message.clone(), session.account());
    job.parse_mode = args.parse_mode.clone();
    job.disable_web_page_preview = !args.with_preview;
    job.delay_ms = args.delay_ms;
    job.rounds = args.rounds;
    job.round_interval_s = args.round_interval;
    job
}

fn print_snapshot(status: &TaskStatus) {
    let rounds = status
        .round_label()
        .map(|label| format!(" | round {}", label))
        .unwrap_or_default();
    println!(
        "total {} | sent {} | failed {}{}",
        status.total,
        status.success.to_string().green(),
        status.failed.to_string().red(),
        rounds
    );
}

pub async fn broadcast(
    dispatcher: &JobDispatcher,
    session: &SessionContext,
    args: SendArgs,
) -> Result<()> {
    let job = build_job(session, &args);
    println!(
        "sending to {} target(s) as {}...",
        job.group_ids.len(),
        session.account().bold()
    );
    let outcome = dispatcher.run(&job, print_snapshot).await?;
    println!(
        "{}: {} sent, {} failed",
        "done".green().bold(),
        outcome.success,
        outcome.failed
    );
    Ok(())
}

pub async fn test_send(
    dispatcher: &JobDispatcher,
    session: &SessionContext,
    args: SendArgs,
) -> Result<()> {
    let job = build_job(session, &args);
    println!(
        "test-sending to {} target(s), blocking until finished...",
        job.group_ids.len()
    );
    let outcome = dispatcher.submit_blocking(&job).await?;
    println!(
        "{}: total {}, {} sent, {} failed",
        "done".green().bold(),
        outcome.total,
        outcome.success,
        outcome.failed
    );
    Ok(())
}
