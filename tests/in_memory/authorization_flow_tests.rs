//! Requests flowing through the authorization gate into the lifecycle.

use std::sync::Arc;

use super::helpers::{GateWorld, TaskWorld, create_command, gate_world, signed_request, world};
use eyre::{Result, bail, ensure};
use rstest::rstest;
use taskdesk::access::{
    domain::{Role, UserId},
    services::{AccessError, AuthorizationRequest, TaskRoute},
};
use taskdesk::activity::{domain::ActivitySearchQuery, services::ActivitySearchService};
use taskdesk::api::ApiError;
use taskdesk::task::domain::SubmitTaskCommand;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn superuser_creates_then_owner_submits(
    gate_world: GateWorld,
    world: TaskWorld,
) -> Result<()> {
    let create = signed_request(&gate_world.codec, 1, Role::Superuser, "POST", "/api/tasks")?;
    gate_world
        .gate
        .authorize(&create, &TaskRoute::Create.guards())
        .await?;
    let task = world
        .service
        .create_task(&world.ctx, &create_command("Gate flow", 3))
        .await?;

    let submit = signed_request(
        &gate_world.codec,
        3,
        Role::User,
        "PUT",
        "/api/tasks/submit",
    )?;
    let principal = gate_world
        .gate
        .authorize(&submit, &TaskRoute::Submit.guards())
        .await?;
    let submitted = world
        .service
        .submit_task(
            &world.ctx,
            SubmitTaskCommand {
                task_id: task.id(),
                user_id: principal.user_id(),
            },
        )
        .await?;

    ensure!(
        submitted.status() == taskdesk::task::domain::TaskStatus::Reviewing,
        "task should be reviewing"
    );
    ensure!(
        gate_world.activity.entries()?.len() == 2,
        "both requests should be recorded"
    );
    Ok(())
}

#[rstest]
#[case(Role::Admin, false)]
#[case(Role::Hr, false)]
#[case(Role::Manager, false)]
#[case(Role::User, false)]
#[case(Role::Superuser, true)]
#[tokio::test(flavor = "multi_thread")]
async fn only_superuser_passes_the_delete_route(
    gate_world: GateWorld,
    #[case] role: Role,
    #[case] admitted: bool,
) -> Result<()> {
    let request = signed_request(&gate_world.codec, 5, role, "DELETE", "/api/tasks/1")?;

    let result = gate_world
        .gate
        .authorize(&request, &TaskRoute::Delete.guards())
        .await;

    ensure!(result.is_ok() == admitted, "unexpected outcome for {role}");
    if let Err(err) = result {
        let api_error = ApiError::from(err);
        ensure!(api_error.status() == 403, "rejection must be forbidden");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn logout_revokes_the_token(gate_world: GateWorld) -> Result<()> {
    let request = signed_request(&gate_world.codec, 3, Role::User, "GET", "/api/tasks")?;
    gate_world
        .gate
        .authorize(&request, &TaskRoute::Search.guards())
        .await?;

    gate_world.gate.logout(&request).await?;
    let result = gate_world
        .gate
        .authorize(&request, &TaskRoute::Search.guards())
        .await;

    let Err(err) = result else {
        bail!("revoked token must be rejected");
    };
    ensure!(matches!(err, AccessError::Blacklisted), "unexpected error: {err:?}");
    ensure!(ApiError::from(err).status() == 401, "revocation is unauthenticated");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn token_signed_with_another_secret_is_rejected(gate_world: GateWorld) -> Result<()> {
    let foreign = taskdesk::access::adapters::HmacJwtCodec::new(b"another-secret");
    let request = signed_request(&foreign, 1, Role::Superuser, "GET", "/api/tasks")?;

    let result = gate_world
        .gate
        .authorize(&request, &TaskRoute::Search.guards())
        .await;

    ensure!(
        matches!(result, Err(AccessError::InvalidToken(_))),
        "unexpected result: {result:?}"
    );
    ensure!(
        gate_world.activity.entries()?.is_empty(),
        "unauthenticated requests are not recorded"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recorded_activity_is_searchable(gate_world: GateWorld) -> Result<()> {
    for (user, path) in [(3, "/api/tasks"), (4, "/api/tasks/9"), (3, "/api/tasks/9")] {
        let request = signed_request(&gate_world.codec, user, Role::User, "GET", path)?;
        gate_world
            .gate
            .authorize(&request, &TaskRoute::Get.guards())
            .await?;
    }
    let service = ActivitySearchService::new(Arc::new(gate_world.activity.clone()));
    let query = ActivitySearchQuery {
        user_id: Some(UserId::new(3)),
        ..ActivitySearchQuery::default()
    };

    let result = service.search(&query).await?;

    ensure!(result.total_count == 2, "two entries belong to user 3");
    let Some(newest) = result.activities.first() else {
        bail!("search should return entries");
    };
    ensure!(newest.action == "/api/tasks/9", "newest entry should come first");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_header_maps_to_unauthenticated(gate_world: GateWorld) -> Result<()> {
    let result = gate_world
        .gate
        .authorize(
            &AuthorizationRequest::new("GET", "/api/tasks"),
            &TaskRoute::Search.guards(),
        )
        .await;

    let Err(err) = result else {
        bail!("request without a token must fail");
    };
    let api_error = ApiError::from(err);
    ensure!(api_error.status() == 401, "expected 401");
    ensure!(api_error.code() == "auth.missing-token", "unexpected code");
    Ok(())
}
