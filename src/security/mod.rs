//
//  teamcity-client
//  security/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Security
//!
//! Guards applied to everything the client sends:
//!
//! - [`sanitize`]: bounds untrusted parameter values (strings, keys, objects, arrays)
//! - [`endpoint`]: rejects malformed or dangerous paths and query strings before I/O
//!
//! Both are applied inside the transport, so no resource operation can bypass them.

pub mod endpoint;
pub mod sanitize;

pub use endpoint::validate_endpoint;
pub use sanitize::{sanitize_body, sanitize_params, sanitize_query};
