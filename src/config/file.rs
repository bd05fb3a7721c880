//
//  teamcity-client
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O Module
//!
//! Low-level reads and writes of the TOML configuration file.
//!
//! ## Notes
//!
//! - Write operations create parent directories
//! - On Unix the file is written with mode `0600`, since it may hold the access token

use std::path::Path;

use anyhow::Result;

/// Reads the configuration file into a string.
pub fn read_config_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Writes the configuration file, creating parent directories as needed.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Checks whether a configuration file exists.
pub fn config_exists(path: &Path) -> bool {
    path.exists()
}
