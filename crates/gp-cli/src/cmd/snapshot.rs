use gp_core::server::{SNAPSHOT_FAILED, SNAPSHOT_NOT_FOUND};
use gp_core::{block_on, codes, CommandError, Error, ServerClient, SupervisorClient};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// `gp snapshot`: take a snapshot and print the URL it can be opened at
pub fn run() -> Result<(), CommandError> {
    let (host, snapshot_id) = block_on(async {
        let supervisor = SupervisorClient::from_env()?;
        let info = supervisor.workspace_info().await?;
        let scopes = vec![
            "function:takeSnapshot".to_string(),
            "function:waitForSnapshot".to_string(),
            format!("resource:workspace::{}::get/update", info.workspace_id),
        ];
        let server = ServerClient::connect(&supervisor, &info, &scopes).await?;
        let snapshot_id = server.snapshot(&info.workspace_id, POLL_INTERVAL).await?;
        Ok::<_, Error>((info.gitpod_host, snapshot_id))
    })?
    .map_err(|err| match err {
        Error::Rpc { code, .. } if code == SNAPSHOT_NOT_FOUND || code == SNAPSHOT_FAILED => {
            CommandError::system("snapshot failed")
                .with_cause(err)
                .with_code(codes::SNAPSHOT_FAILED)
        }
        other => other.into(),
    })?;

    println!("{host}/#snapshot/{snapshot_id}");
    Ok(())
}
