use docfetch_lib::cli::{ResolvedCommand, parse_args, resolve_command, run_batch, run_check};
use docfetch_lib::error::DocFetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), DocFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::Run(params) => {
            run_batch(params).await?;
        }
        ResolvedCommand::Check(params) => {
            run_check(params).await?;
        }
    }

    Ok(())
}
