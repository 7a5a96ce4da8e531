use colored::Colorize;
use log::info;

use unpackr::Config;
use unpackr::Result;
use unpackr::operations::{self, DependencyOutcome, Mode, UnpackRequest};
use unpackr::prompt::TerminalPrompter;

pub fn handle_unpack(
    repository: String,
    destination: String,
    branch: Option<String>,
    tag: Option<String>,
    install: Option<String>,
    config: &Config,
) -> Result<()> {
    let request = UnpackRequest {
        repository,
        destination: destination.into(),
        branch,
        tag,
        install_dependencies: install,
    };

    // An explicit installer skips the prompts
    let prompter = TerminalPrompter;
    let mode = if request.install_dependencies.is_some() {
        Mode::Programmatic
    } else {
        Mode::Interactive(&prompter)
    };

    let outcome = operations::unpack(&request, mode, config)?;

    if !outcome.failed_entries.is_empty() {
        println!(
            "{}",
            format!("{} manifest entries could not be unpacked", outcome.failed_entries.len()).yellow()
        );
    }

    match &outcome.dependencies {
        DependencyOutcome::Installed(specs) => {
            info!("handle_unpack: installed {}", specs.join(", "));
        }
        DependencyOutcome::InstallFailed(reason) => {
            info!("handle_unpack: install failed: {}", reason);
        }
        other => info!("handle_unpack: dependencies {:?}", other),
    }

    Ok(())
}
