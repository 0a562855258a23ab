//! Transaction semantics of the in-memory task repository: rollback on
//! error, panic, cancellation, and deadline expiry.

use std::sync::Arc;
use std::time::Instant;

use super::helpers::{TaskWorld, create_command, world};
use eyre::{Result, bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use taskdesk::context::{OperationAborted, OperationContext};
use taskdesk::pagination::PaginationConfig;
use taskdesk::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{NewTask, TaskSearchFilter},
    ports::{TaskRepository, TaskRepositoryError, TaskTransaction},
};

fn pending(title: &str) -> Result<NewTask> {
    Ok(NewTask::pending(
        create_command(title, 3).validate()?,
        &DefaultClock,
    ))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_body_discards_earlier_writes(world: TaskWorld) -> Result<()> {
    let first = pending("First write")?;
    let second = pending("First write")?;

    let result = world
        .repository
        .transaction(&world.ctx, move |tx: &mut dyn TaskTransaction| {
            tx.insert(first)?;
            tx.insert(second)
        })
        .await;

    ensure!(
        matches!(result, Err(TaskRepositoryError::DuplicateTitle(_))),
        "unexpected result: {result:?}"
    );
    ensure!(world.repository.is_empty(), "no write may be committed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn panicking_body_leaves_committed_state_untouched() -> Result<()> {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let writer = Arc::clone(&repository);
    let task = pending("Doomed write")?;

    let joined = tokio::spawn(async move {
        writer
            .transaction(
                &OperationContext::background(),
                move |tx: &mut dyn TaskTransaction| -> Result<(), TaskRepositoryError> {
                    tx.insert(task)?;
                    panic!("body failed mid-transaction");
                },
            )
            .await
    })
    .await;

    ensure!(joined.is_err(), "panic must propagate to the caller");
    ensure!(repository.is_empty(), "no write may be committed");

    // The repository stays usable after the panic.
    let follow_up = pending("Follow-up write")?;
    repository
        .transaction(&OperationContext::background(), move |tx: &mut dyn TaskTransaction| {
            tx.insert(follow_up).map(|_| ())
        })
        .await?;
    ensure!(repository.len() == 1, "follow-up write must commit");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancellation_inside_body_rolls_back(world: TaskWorld) -> Result<()> {
    let ctx = OperationContext::background();
    let body_ctx = ctx.clone();
    let first = pending("Cancelled write")?;
    let second = pending("Never written")?;

    let result = world
        .repository
        .transaction(&ctx, move |tx: &mut dyn TaskTransaction| {
            tx.insert(first)?;
            body_ctx.cancel();
            tx.insert(second)
        })
        .await;

    ensure!(
        matches!(
            result,
            Err(TaskRepositoryError::Aborted(OperationAborted::Cancelled))
        ),
        "unexpected result: {result:?}"
    );
    ensure!(world.repository.is_empty(), "no write may be committed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expired_deadline_fails_reads_and_writes(world: TaskWorld) -> Result<()> {
    let expired = OperationContext::with_deadline(Instant::now());

    let read = world
        .repository
        .search(
            &expired,
            &TaskSearchFilter::default(),
            PaginationConfig::default().window(1, 20),
        )
        .await;
    let Err(TaskRepositoryError::Aborted(reason)) = read else {
        bail!("search past the deadline must abort, got {read:?}");
    };
    ensure!(
        reason == OperationAborted::DeadlineExceeded,
        "unexpected reason: {reason:?}"
    );

    let write = world
        .service
        .create_task(&expired, &create_command("Too late", 3))
        .await;
    ensure!(write.is_err(), "write past the deadline must fail");
    ensure!(world.repository.is_empty(), "no write may be committed");
    Ok(())
}
