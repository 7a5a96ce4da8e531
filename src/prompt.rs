use colored::Colorize;
use dialoguer::{MultiSelect, Select, theme::ColorfulTheme};

use crate::error::{Result, UnpackrError};
use crate::manifest::DependencyChoice;
use crate::operations::PackageManager;

/// Questions asked while deciding which dependencies to install.
/// The orchestrator always asks for dependencies before the package manager.
pub trait Prompter {
    /// Indices of the dependencies to install
    fn select_dependencies(&self, choices: &[DependencyChoice]) -> Result<Vec<usize>>;

    fn select_package_manager(&self) -> Result<PackageManager>;
}

/// Terminal prompts
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select_dependencies(&self, choices: &[DependencyChoice]) -> Result<Vec<usize>> {
        let labels: Vec<String> = choices
            .iter()
            .map(|choice| match choice.installed_note() {
                Some(note) => format!("{} {}", choice.label(), note.yellow()),
                None => choice.label(),
            })
            .collect();

        MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Please select the dependencies to install")
            .items(&labels)
            .interact()
            .map_err(|e| UnpackrError::PromptFailed(e.to_string()))
    }

    fn select_package_manager(&self) -> Result<PackageManager> {
        let labels: Vec<&str> = PackageManager::ALL.iter().map(|m| m.program()).collect();

        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Please select the required installation package manager")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| UnpackrError::PromptFailed(e.to_string()))?;

        PackageManager::ALL
            .get(index)
            .copied()
            .ok_or_else(|| UnpackrError::PromptFailed(format!("invalid selection {}", index)))
    }
}
