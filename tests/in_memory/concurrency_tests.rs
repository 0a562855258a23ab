//! Contention tests: concurrent writers must not break title uniqueness or
//! apply a transition twice.

use std::sync::Arc;

use super::helpers::{TaskWorld, create_command, world};
use eyre::{Result, ensure};
use rstest::rstest;
use taskdesk::task::{
    domain::{SubmitTaskCommand, TaskStatus, UserId},
    services::TaskLifecycleError,
};

const WRITERS: usize = 8;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_with_same_title_admit_exactly_one(world: TaskWorld) -> Result<()> {
    let service = Arc::new(world.service);
    let mut handles = Vec::with_capacity(WRITERS);
    for _ in 0..WRITERS {
        let writer = Arc::clone(&service);
        let ctx = world.ctx.clone();
        handles.push(tokio::spawn(async move {
            writer
                .create_task(&ctx, &create_command("Contended title", 3))
                .await
        }));
    }

    let mut created = 0_usize;
    let mut conflicts = 0_usize;
    for handle in handles {
        match handle.await? {
            Ok(_) => created += 1,
            Err(TaskLifecycleError::AlreadyExists { .. }) => conflicts += 1,
            Err(other) => return Err(other.into()),
        }
    }

    ensure!(created == 1, "expected one success, got {created}");
    ensure!(conflicts == WRITERS - 1, "every other writer must conflict");
    ensure!(world.repository.len() == 1, "only one row may be stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_transition_once(world: TaskWorld) -> Result<()> {
    let created = world
        .service
        .create_task(&world.ctx, &create_command("Submit race", 3))
        .await?;
    let service = Arc::new(world.service);
    let mut handles = Vec::with_capacity(WRITERS);
    for _ in 0..WRITERS {
        let writer = Arc::clone(&service);
        let ctx = world.ctx.clone();
        let command = SubmitTaskCommand {
            task_id: created.id(),
            user_id: UserId::new(3),
        };
        handles.push(tokio::spawn(
            async move { writer.submit_task(&ctx, command).await },
        ));
    }

    let mut submitted = 0_usize;
    for handle in handles {
        if handle.await?.is_ok() {
            submitted += 1;
        }
    }

    let stored = service.get_task_by_id(&world.ctx, created.id()).await?;
    ensure!(submitted == 1, "exactly one submit may win, got {submitted}");
    ensure!(stored.status() == TaskStatus::Reviewing, "task must be reviewing");
    Ok(())
}
