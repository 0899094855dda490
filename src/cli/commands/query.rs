//! Query command - thin client for a running server.

use std::path::PathBuf;

use anyhow::Context;

use crate::server;

/// Arguments for the query command.
pub struct QueryArgs {
    pub pattern: String,
    pub socket: PathBuf,
    pub json: bool,
}

/// Run the query command.
pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let matches = server::query(&args.socket, &args.pattern)
        .await
        .with_context(|| format!("query {:?} failed", args.pattern))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        for path in &matches {
            println!("{path}");
        }
    }

    Ok(())
}
