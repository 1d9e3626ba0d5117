//! Then steps for daily completion BDD scenarios.

use super::world::{CompletionWorld, run_async};
use chrono::NaiveDate;
use eyre::WrapErr;
use nudge::stats::domain::Statistics;
use nudge::task::{
    domain::{CompletionStatus, History},
    services::TaskServiceError,
};
use rstest_bdd_macros::then;

fn last_completion(world: &CompletionWorld) -> Result<&Result<History, TaskServiceError>, eyre::Report> {
    world
        .last_completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing completion result"))
}

fn last_statistics(world: &CompletionWorld) -> Result<&Statistics, eyre::Report> {
    world
        .last_statistics
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing statistics"))
}

#[then(r#"the completion is recorded on "{day}" for slot "{slot}""#)]
fn completion_recorded(
    world: &CompletionWorld,
    day: String,
    slot: String,
) -> Result<(), eyre::Report> {
    let expected_date =
        NaiveDate::parse_from_str(&day, "%Y-%m-%d").wrap_err("parse expected day")?;
    let record = match last_completion(world)? {
        Ok(record) => record,
        Err(err) => return Err(eyre::eyre!("expected a completion record, got {err}")),
    };

    if record.status() != CompletionStatus::Completed {
        return Err(eyre::eyre!("expected completed status, got {:?}", record.status()));
    }
    if record.date() != expected_date {
        return Err(eyre::eyre!("expected date {expected_date}, found {}", record.date()));
    }
    if record.scheduled_time().to_string() != slot {
        return Err(eyre::eyre!(
            "expected slot {slot}, found {}",
            record.scheduled_time()
        ));
    }
    Ok(())
}

#[then(r#""{title}" is among the tasks completed today"#)]
fn among_completed_today(world: &CompletionWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let completed = run_async(world.completion_service().completed_today(world.owner))
        .wrap_err("list tasks completed today")?;
    if !completed.contains(&task_id) {
        return Err(eyre::eyre!("{title:?} missing from {completed:?}"));
    }
    Ok(())
}

#[then("the completion is rejected as already completed")]
fn rejected_as_already_completed(world: &CompletionWorld) -> Result<(), eyre::Report> {
    let result = last_completion(world)?;
    if !matches!(result, Err(TaskServiceError::AlreadyCompleted { .. })) {
        return Err(eyre::eyre!("expected AlreadyCompleted error, got {result:?}"));
    }
    Ok(())
}

#[then("the completion is rejected as not authorized")]
fn rejected_as_not_authorized(world: &CompletionWorld) -> Result<(), eyre::Report> {
    let result = last_completion(world)?;
    if !matches!(result, Err(TaskServiceError::NotAuthorized(_))) {
        return Err(eyre::eyre!("expected NotAuthorized error, got {result:?}"));
    }
    Ok(())
}

#[then("the streak is {days:u32}")]
fn streak_is(world: &CompletionWorld, days: u32) -> Result<(), eyre::Report> {
    let stats = last_statistics(world)?;
    if stats.streak != days {
        return Err(eyre::eyre!("expected streak {days}, found {}", stats.streak));
    }
    Ok(())
}

#[then("the completion rate is {rate:u64}")]
fn completion_rate_is(world: &CompletionWorld, rate: u64) -> Result<(), eyre::Report> {
    let stats = last_statistics(world)?;
    if stats.completion_rate != rate {
        return Err(eyre::eyre!(
            "expected completion rate {rate}, found {}",
            stats.completion_rate
        ));
    }
    Ok(())
}
