use gp_core::{block_on, CommandError, SupervisorClient};

use crate::output;

pub fn run(json: bool) -> Result<(), CommandError> {
    let info = block_on(async {
        let supervisor = SupervisorClient::from_env()?;
        supervisor.workspace_info().await
    })??;

    if json {
        let value = serde_json::to_value(&info).map_err(CommandError::from_cause)?;
        output::print_json(&value)?;
        return Ok(());
    }

    output::print_fields(&[
        ("Workspace ID", info.workspace_id.as_str()),
        ("Instance ID", info.instance_id.as_str()),
        ("Workspace URL", info.workspace_url.as_str()),
        ("Checkout location", info.checkout_location.as_str()),
        ("Host", info.gitpod_host.as_str()),
    ]);
    Ok(())
}
