//! Search, status writes, approval, and rollback against `PostgreSQL`.

use super::helpers::{PgWorld, pg_world};
use eyre::{Result, bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use taskdesk::task::{
    domain::{
        ApproveTaskCommand, CreateTaskCommand, NewTask, SearchTaskQuery, SubmitTaskCommand,
        TaskDomainError, TaskId, TaskStatus, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskTransaction},
    services::TaskLifecycleError,
};

fn command(title: &str, owner: i64) -> CreateTaskCommand {
    CreateTaskCommand::new(title, "Stored in PostgreSQL", "high", "medium", UserId::new(owner))
}

fn title_query(title: &str, page: i64, per_page: i64) -> SearchTaskQuery {
    SearchTaskQuery {
        title: Some(title.to_owned()),
        page,
        per_page,
        ..SearchTaskQuery::default()
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_pages_newest_first_and_counts_all_matches(
    pg_world: Result<Option<PgWorld>>,
) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    for title in ["Alpha one", "Beta", "ALPHA two", "alpha three"] {
        world.service.create_task(&world.ctx, &command(title, 2)).await?;
    }

    let result = world
        .service
        .search_tasks(&world.ctx, &title_query("alpha", 2, 2))
        .await?;

    ensure!(result.total_count == 3, "three titles contain alpha");
    ensure!((result.page, result.per_page) == (2, 2), "window is echoed");
    let titles: Vec<&str> = result.tasks.iter().map(|task| task.title()).collect();
    ensure!(titles == ["Alpha one"], "oldest match lands on page two: {titles:?}");
    Ok(())
}

#[rstest]
#[case("%", 0)]
#[case("_", 1)]
#[case("e_2", 1)]
#[case("RATE", 1)]
#[tokio::test(flavor = "multi_thread")]
async fn title_search_treats_wildcards_literally(
    pg_world: Result<Option<PgWorld>>,
    #[case] needle: &str,
    #[case] expected: u64,
) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    for title in ["Rate limit", "Stage_2 rollout"] {
        world.service.create_task(&world.ctx, &command(title, 2)).await?;
    }

    let result = world
        .service
        .search_tasks(&world.ctx, &title_query(needle, 1, 20))
        .await?;

    ensure!(
        result.total_count == expected,
        "{needle:?} should match {expected}, got {}",
        result.total_count
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submit_then_approve_uses_the_stored_owner_role(
    pg_world: Result<Option<PgWorld>>,
) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    world.seed_user(2, "user")?;
    let task = world.service.create_task(&world.ctx, &command("Review me", 2)).await?;

    let submitted = world
        .service
        .submit_task(
            &world.ctx,
            SubmitTaskCommand {
                task_id: task.id(),
                user_id: UserId::new(2),
            },
        )
        .await?;
    ensure!(submitted.status() == TaskStatus::Reviewing, "submit moves to review");

    world
        .service
        .approve_task(
            &world.ctx,
            ApproveTaskCommand {
                task_id: task.id(),
                user_id: UserId::new(1),
            },
        )
        .await?;
    let stored = world.service.get_task_by_id(&world.ctx, task.id()).await?;
    ensure!(stored.status() == TaskStatus::Done, "approval is persisted");
    ensure!(stored.title() == "Review me", "status writes leave other columns alone");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn owner_without_a_role_cannot_be_approved(pg_world: Result<Option<PgWorld>>) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    let task = world.service.create_task(&world.ctx, &command("Orphaned", 5)).await?;
    world
        .service
        .submit_task(
            &world.ctx,
            SubmitTaskCommand {
                task_id: task.id(),
                user_id: UserId::new(5),
            },
        )
        .await?;

    let result = world
        .service
        .approve_task(
            &world.ctx,
            ApproveTaskCommand {
                task_id: task.id(),
                user_id: UserId::new(1),
            },
        )
        .await;

    let Err(TaskLifecycleError::Transition(TaskDomainError::OnlySuperuserCanApprove {
        owner_role,
        ..
    })) = &result
    else {
        bail!("expected approval to be refused, got {result:?}");
    };
    ensure!(owner_role.is_none(), "no role is on record for the owner");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_body_rolls_back_its_insert(pg_world: Result<Option<PgWorld>>) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    let task = NewTask::pending(command("Never stored", 2).validate()?, &DefaultClock);

    let result = world
        .repository
        .transaction(&world.ctx, move |tx: &mut dyn TaskTransaction| {
            let stored = tx.insert(task)?;
            tx.delete(TaskId::new(stored.id().value().saturating_add(100)))
        })
        .await;

    ensure!(
        matches!(result, Err(TaskRepositoryError::NotFound(_))),
        "deleting a missing row reports not found: {result:?}"
    );
    let search = world
        .service
        .search_tasks(&world.ctx, &title_query("Never stored", 1, 20))
        .await?;
    ensure!(search.total_count == 0, "the insert must roll back");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_write_to_missing_task_is_not_found(pg_world: Result<Option<PgWorld>>) -> Result<()> {
    let Some(world) = pg_world? else {
        return Ok(());
    };
    let missing = TaskId::new(404);

    let result = world
        .repository
        .transaction(&world.ctx, move |tx: &mut dyn TaskTransaction| {
            tx.update_status(missing, TaskStatus::Done, chrono::Utc::now())
        })
        .await;

    ensure!(
        matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == missing),
        "unexpected result: {result:?}"
    );
    ensure!(
        world.repository.find_by_id(&world.ctx, missing).await?.is_none(),
        "nothing is created by a failed status write"
    );
    Ok(())
}
