//
//  teamcity-client
//  cli/completion.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Shell completion commands

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};

use super::{Cli, GlobalOptions};

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionCommand {
    /// Target shell
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

impl CompletionCommand {
    pub async fn run(&self, _global: &GlobalOptions) -> Result<()> {
        let mut cmd = Cli::command();
        generate(
            Shell::from(self.shell),
            &mut cmd,
            crate::APP_NAME,
            &mut std::io::stdout(),
        );
        Ok(())
    }
}
