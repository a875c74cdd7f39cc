use anyhow::Context as _;
use clap::Parser;
use gcs_push::{
    cli::Args,
    gcs::{Gcs, SCOPES},
    report::{bytes_to_human, Reporter},
    storage::memory::MemoryStorage,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let dry_run = args.dry_run;
    let opts = args.into_options()?;
    let reporter = Reporter::new(opts.verbose);

    let summary = if dry_run {
        reporter.debug("dry run, nothing will be uploaded");
        gcs_push::run(&MemoryStorage::discarding(), &opts, &reporter)?
    } else {
        // Get a token for the default credentials on the system
        let auth_token = gcs_push::auth::bearer_token(SCOPES)
            .context("failed to resolve default credentials")?;
        log::debug!("credentials resolved");

        let storage = Gcs::new(auth_token)?;
        gcs_push::run(&storage, &opts, &reporter)
            .with_context(|| format!("failed to upload to bucket '{}'", opts.bucket))?
    };

    reporter.debug(format_args!(
        "uploaded {} objects ({}), skipped {} hidden entries",
        summary.uploaded.len(),
        bytes_to_human(summary.uploaded_bytes()),
        summary.hidden_skipped,
    ));

    if !summary.failures.is_empty() {
        anyhow::bail!("detected {} failures", summary.failures.len());
    }

    Ok(())
}
