use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gix_update_hook::{auth::Credential, enforce, RefUpdate};

/// Server-side `update` hook enforcing per-user, path-based access control.
///
/// Invoked by git with the repository as working context; credentials and
/// access rules arrive in the `GIT_UPDATE_AUTH` environment variable.
#[derive(Debug, Parser)]
#[clap(name = "gix-update-hook", version)]
struct Args {
    /// Full name of the reference being updated, e.g. `refs/heads/main`.
    ref_name: String,
    /// Object id the reference currently points to; all zeroes if the
    /// reference is being created.
    old_rev: String,
    /// Object id the reference shall point to; all zeroes if the reference
    /// is being deleted.
    new_rev: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            // Fail closed: any error rejects the update.
            eprintln!("fatal: {err:#}");
            std::process::exit(2);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let credential = Credential::from_env()?;
    let update = RefUpdate::parse(&args.ref_name, &args.old_rev, &args.new_rev)?;
    let repo = open_repository().context("failed to open the repository")?;

    let options = enforce::Options {
        max_show_violations: credential.max_show_violations,
    };
    let decision = enforce::evaluate(&repo, &update, &credential.acl, &options)?;
    eprintln!(
        "{}",
        decision.render(&credential.user, update.name(), options.max_show_violations)
    );
    Ok(decision.exit_code())
}

/// Open the repository the hook runs in: `GIT_DIR` when git provides it,
/// discovery from the working directory otherwise.
fn open_repository() -> anyhow::Result<gix::Repository> {
    match std::env::var_os("GIT_DIR") {
        Some(git_dir) => Ok(gix::open(PathBuf::from(git_dir))?),
        None => Ok(gix::discover(".")?),
    }
}
