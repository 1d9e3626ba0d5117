//! When steps for daily completion BDD scenarios.

use super::world::{CompletionWorld, run_async};
use nudge::task::{domain::UserId, services::MarkCompleteRequest};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"the user completes "{title}""#)]
fn user_completes(world: &mut CompletionWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let result = run_async(
        world
            .completion_service()
            .mark_complete(world.owner, task_id, MarkCompleteRequest::new()),
    );
    world.last_completion = Some(result);
    Ok(())
}

#[when(r#"another user completes "{title}""#)]
fn another_user_completes(world: &mut CompletionWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?.id();
    let result = run_async(
        world
            .completion_service()
            .mark_complete(UserId::new(), task_id, MarkCompleteRequest::new()),
    );
    world.last_completion = Some(result);
    Ok(())
}

#[when("the user requests statistics")]
fn user_requests_statistics(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let stats = run_async(world.statistics_service().statistics(world.owner))
        .wrap_err("compute statistics for scenario")?;
    world.last_statistics = Some(stats);
    Ok(())
}
