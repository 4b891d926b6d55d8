//! `gp env`: print, set and unset persistent environment variables

use gp_core::{
    block_on_timeout, parse_assignments, CommandError, ServerClient, SupervisorClient, UserEnvVar,
};
use std::time::Duration;

const ENV_TIMEOUT: Duration = Duration::from_secs(60);

pub struct EnvArgs {
    pub assignments: Vec<String>,
    pub export: bool,
    pub unset: bool,
}

pub fn run(args: EnvArgs) -> Result<(), CommandError> {
    if args.assignments.is_empty() {
        return print_all(args.export);
    }
    if args.unset {
        return unset(&args.assignments);
    }
    set(&args.assignments, args.export)
}

/// Supervisor-issued server connection scoped to this repository's variables
async fn connect() -> gp_core::Result<(ServerClient, String)> {
    let supervisor = SupervisorClient::from_env()?;
    let info = supervisor.workspace_info().await?;
    let pattern = info.repository_pattern()?;
    let scopes = vec![
        "function:getEnvVars".to_string(),
        "function:setEnvVar".to_string(),
        "function:deleteEnvVar".to_string(),
        format!("resource:envVar::{pattern}::create/get/update/delete"),
    ];
    let server = ServerClient::connect(&supervisor, &info, &scopes).await?;
    Ok((server, pattern))
}

fn print_all(export: bool) -> Result<(), CommandError> {
    let vars = block_on_timeout(ENV_TIMEOUT, async {
        let (server, _) = connect().await?;
        server.get_env_vars().await.map_err(|err| {
            CommandError::system("failed to fetch env vars from server").with_cause(err)
        })
    })??;

    for var in vars {
        println!("{}", var.render(export));
    }
    Ok(())
}

fn set(assignments: &[String], export: bool) -> Result<(), CommandError> {
    // Validate before touching the network
    let assignments = parse_assignments(assignments)?;

    block_on_timeout(ENV_TIMEOUT, async {
        let (server, pattern) = connect().await?;
        for assignment in assignments {
            let var = assignment.for_repository(&pattern);
            server.set_env_var(&var).await?;
            println!("{}", var.render(export));
        }
        Ok::<_, CommandError>(())
    })?
}

fn unset(names: &[String]) -> Result<(), CommandError> {
    block_on_timeout(ENV_TIMEOUT, async {
        let (server, pattern) = connect().await?;
        for name in names {
            let var = UserEnvVar::new(name.as_str(), "", pattern.as_str());
            server.delete_env_var(&var).await?;
        }
        Ok::<_, CommandError>(())
    })?
}
