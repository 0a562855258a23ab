//! Title uniqueness enforced by `idx_tasks_title_unique`.

use std::sync::Arc;

use super::helpers::{PgWorld, pg_world};
use eyre::{Result, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use taskdesk::pagination::PaginationConfig;
use taskdesk::task::{
    domain::{CreateTaskCommand, NewTask, TaskSearchFilter, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskTransaction},
    services::{TaskLifecycleError, TaskLifecycleService},
};

fn command(title: &str) -> CreateTaskCommand {
    CreateTaskCommand::new(title, "Stored in PostgreSQL", "medium", "easy", UserId::new(2))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_insert_is_rejected_by_the_index(pg_world: Result<Option<PgWorld>>) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    let first = NewTask::pending(command("Index backed").validate()?, &DefaultClock);
    let second = first.clone();

    let result = world
        .repository
        .transaction(&world.ctx, move |tx: &mut dyn TaskTransaction| {
            tx.insert(first)?;
            tx.insert(second)
        })
        .await;

    ensure!(
        matches!(result, Err(TaskRepositoryError::DuplicateTitle(ref title)) if title == "Index backed"),
        "unexpected result: {result:?}"
    );
    let filter = TaskSearchFilter {
        title: Some("Index backed".to_owned()),
        ..TaskSearchFilter::default()
    };
    let page = world
        .repository
        .search(&world.ctx, &filter, PaginationConfig::default().window(1, 20))
        .await?;
    ensure!(page.total_count == 0, "the first insert must roll back with the second");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renaming_onto_a_taken_title_is_rejected(pg_world: Result<Option<PgWorld>>) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    world.service.create_task(&world.ctx, &command("Taken")).await?;
    let renamed = world.service.create_task(&world.ctx, &command("Free")).await?;
    let clash = NewTask::pending(command("Taken").validate()?, &DefaultClock)
        .into_task(renamed.id());

    let result = world
        .repository
        .transaction(&world.ctx, move |tx: &mut dyn TaskTransaction| tx.update(&clash))
        .await;

    ensure!(
        matches!(result, Err(TaskRepositoryError::DuplicateTitle(_))),
        "unexpected result: {result:?}"
    );
    let kept = world.service.get_task_by_id(&world.ctx, renamed.id()).await?;
    ensure!(kept.title() == "Free", "the failed rename must not persist");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creates_admit_one_title(pg_world: Result<Option<PgWorld>>) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    let service = Arc::new(TaskLifecycleService::new(
        Arc::clone(&world.repository),
        Arc::new(DefaultClock),
    ));
    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let racer = Arc::clone(&service);
            let ctx = world.ctx.clone();
            tokio::spawn(async move { racer.create_task(&ctx, &command("Contended")).await })
        })
        .collect();

    let mut created = 0;
    let mut rejected = 0;
    for attempt in attempts {
        match attempt.await? {
            Ok(_) => created += 1,
            Err(TaskLifecycleError::AlreadyExists { .. }) => rejected += 1,
            Err(other) => return Err(other.into()),
        }
    }

    ensure!(created == 1, "exactly one create may succeed, got {created}");
    ensure!(rejected == 7, "every other create must see the duplicate");
    Ok(())
}
