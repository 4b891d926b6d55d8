use gp_core::codes;
use gp_core::duration::{parse_timeout, whole_minutes};
use gp_core::server::PLAN_PROFESSIONAL_REQUIRED;
use gp_core::{block_on, CommandError, Error, ServerClient, SupervisorClient};

const PLAN_UPGRADE_MESSAGE: &str =
    "Cannot extend workspace timeout for current plan, please upgrade your plan";

/// `gp timeout set <duration>`
pub fn set(duration: &str) -> Result<(), CommandError> {
    // Validate before touching the network
    let duration = parse_timeout(duration)?;

    block_on(async {
        let supervisor = SupervisorClient::from_env()?;
        let info = supervisor.workspace_info().await?;
        let scopes = vec![
            "function:setWorkspaceTimeout".to_string(),
            format!("resource:workspace::{}::get/update", info.workspace_id),
        ];
        let server = ServerClient::connect(&supervisor, &info, &scopes).await?;
        server
            .set_workspace_timeout(&info.workspace_id, duration)
            .await
    })?
    .map_err(|err| match err {
        Error::Rpc {
            code: PLAN_PROFESSIONAL_REQUIRED,
            ..
        } => CommandError::user(PLAN_UPGRADE_MESSAGE)
            .with_code(codes::TIMEOUT_PLAN_UPGRADE_REQUIRED),
        other => other.into(),
    })?;

    println!(
        "Workspace timeout has been set to {} minutes.",
        whole_minutes(duration)
    );
    Ok(())
}
