//! End-to-end lifecycle scenarios against the in-memory repository.

use std::sync::Arc;

use super::helpers::{TaskWorld, world};
use eyre::{Result, bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use taskdesk::error::{ErrorKind, ServiceError};
use taskdesk::pagination::PaginationConfig;
use taskdesk::task::{
    domain::{
        ApproveTaskCommand, CreateTaskCommand, SearchTaskQuery, SubmitTaskCommand, Task,
        TaskDomainError, TaskId, TaskStatus, TaskValidationError, UpdateTaskCommand, UserId,
    },
    services::{TaskLifecycleError, TaskLifecycleService},
};

const OWNER: UserId = UserId::new(7);
const APPROVER: UserId = UserId::new(99);

fn billing_task() -> CreateTaskCommand {
    CreateTaskCommand::new(
        "Refactor billing",
        "Split into modules",
        "high",
        "medium",
        OWNER,
    )
}

async fn reviewing_billing_task(world: &TaskWorld) -> Result<Task> {
    let created = world.service.create_task(&world.ctx, &billing_task()).await?;
    Ok(world
        .service
        .submit_task(
            &world.ctx,
            SubmitTaskCommand {
                task_id: created.id(),
                user_id: OWNER,
            },
        )
        .await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scenario_a_duplicate_title_conflicts(world: TaskWorld) -> Result<()> {
    let created = world.service.create_task(&world.ctx, &billing_task()).await?;
    ensure!(created.status() == TaskStatus::Pending, "new task must be pending");

    let Err(err) = world.service.create_task(&world.ctx, &billing_task()).await else {
        bail!("second create with the same title must fail");
    };

    ensure!(err.kind() == ErrorKind::Conflict, "expected conflict, got {err:?}");
    ensure!(world.repository.len() == 1, "only one task may exist");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scenario_b_second_submit_is_not_pending(world: TaskWorld) -> Result<()> {
    let submitted = reviewing_billing_task(&world).await?;
    ensure!(
        submitted.status() == TaskStatus::Reviewing,
        "submitted task must be reviewing"
    );

    let repeat = world
        .service
        .submit_task(
            &world.ctx,
            SubmitTaskCommand {
                task_id: submitted.id(),
                user_id: OWNER,
            },
        )
        .await;

    ensure!(
        matches!(
            repeat,
            Err(TaskLifecycleError::Transition(
                TaskDomainError::TaskIsNotPending { .. }
            ))
        ),
        "unexpected result: {repeat:?}"
    );
    Ok(())
}

// Approval authority comes from the owner's role. A rule keyed on the
// caller would give the same answer here (hr cannot approve) but the
// opposite answer in the next test.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scenario_c_approval_uses_owner_role(world: TaskWorld) -> Result<()> {
    world.repository.set_user_role(OWNER, "manager");
    world.repository.set_user_role(APPROVER, "hr");
    let submitted = reviewing_billing_task(&world).await?;

    let result = world
        .service
        .approve_task(
            &world.ctx,
            ApproveTaskCommand {
                task_id: submitted.id(),
                user_id: APPROVER,
            },
        )
        .await;

    let Err(TaskLifecycleError::Transition(TaskDomainError::OnlySuperuserCanApprove {
        owner,
        owner_role,
        ..
    })) = result
    else {
        bail!("expected OnlySuperuserCanApprove, got {result:?}");
    };
    ensure!(owner == OWNER, "role must be resolved for the owner");
    ensure!(
        owner_role == Some(taskdesk::access::domain::Role::Manager),
        "owner role should be reported"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scenario_c_user_owned_task_is_approved_for_any_caller(world: TaskWorld) -> Result<()> {
    world.repository.set_user_role(OWNER, "user");
    world.repository.set_user_role(APPROVER, "hr");
    let submitted = reviewing_billing_task(&world).await?;

    // A caller-based rule would reject this hr caller.
    let approved = world
        .service
        .approve_task(
            &world.ctx,
            ApproveTaskCommand {
                task_id: submitted.id(),
                user_id: APPROVER,
            },
        )
        .await?;

    ensure!(approved.status() == TaskStatus::Done, "task should be done");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scenario_d_zero_id_update_fails_validation_before_store(world: TaskWorld) -> Result<()> {
    // A fired context would fail any store access; validation must win.
    world.ctx.cancel();
    let command = UpdateTaskCommand {
        id: TaskId::new(0),
        title: "Refactor billing".to_owned(),
        description: "Split into modules".to_owned(),
        priority: "high".to_owned(),
        difficulty: "medium".to_owned(),
        status: 1,
        user_id: OWNER,
    };

    let result = world.service.update_task(&world.ctx, &command).await;

    ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Validation(TaskValidationError::InvalidTitle))
        ),
        "unexpected result: {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scenario_e_search_defaults_and_total_count(world: TaskWorld) -> Result<()> {
    let service = TaskLifecycleService::with_pagination(
        Arc::clone(&world.repository),
        Arc::new(DefaultClock),
        PaginationConfig {
            page: 1,
            per_page: 2,
        },
    );
    for index in 0..5 {
        service
            .create_task(
                &world.ctx,
                &CreateTaskCommand::new(
                    format!("Billing step {index}"),
                    "Split into modules",
                    "low",
                    "easy",
                    OWNER,
                ),
            )
            .await?;
    }

    let result = service
        .search_tasks(
            &world.ctx,
            &SearchTaskQuery {
                page: 0,
                per_page: 0,
                ..SearchTaskQuery::default()
            },
        )
        .await?;

    ensure!(result.page == 1 && result.per_page == 2, "defaults not applied");
    ensure!(result.total_count == 5, "total must ignore the window");
    ensure!(result.tasks.len() == 2, "page must hold per_page rows");
    Ok(())
}
