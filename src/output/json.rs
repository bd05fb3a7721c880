//
//  teamcity-client
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output Formatting
//!
//! | Function | Description | Use Case |
//! |----------|-------------|----------|
//! | [`write_json`] | Pretty-printed JSON | Human-readable output |
//! | [`write_json_compact`] | Minified JSON | Piping to other tools |

use std::io::Write;

use serde::Serialize;

pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_json_compact<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to_buffer() {
        let mut buf = Vec::new();
        write_json_to(&mut buf, &serde_json::json!({"ok": true})).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("\"ok\": true"));
    }
}
