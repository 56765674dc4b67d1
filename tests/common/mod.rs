#![allow(dead_code)]

pub mod file;

use assert_cmd::Command;
use std::path::Path;

pub const METADATA_DIR: &str = ".gitgood";

pub fn gitgood(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gitgood").expect("gitgood binary is built");
    cmd.current_dir(dir).env_remove("GITGOOD_DIR").env_remove("GITGOOD_LOG");
    cmd
}

pub fn git(dir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null");
    cmd
}

/// Comparisons against git are skipped where it is not installed
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

pub fn init_repository(dir: &Path) {
    gitgood(dir).arg("init").assert().success();
}

// Helper function to create hexdump representation
pub fn to_hexdump(data: &[u8]) -> String {
    let mut result = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(&format!("{:08x}: ", i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            result.push_str(&format!("{:02x} ", byte));
        }

        // Pad if less than 16 bytes
        for j in chunk.len()..16 {
            if j == 8 {
                result.push(' ');
            }
            result.push_str("   ");
        }

        result.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() {
                result.push(*byte as char);
            } else {
                result.push('.');
            }
        }
        result.push_str("|\n");
    }
    result
}

// Macro to compare index contents with hexdump output on failure
#[macro_export]
macro_rules! assert_index_eq {
    ($ours:expr, $git:expr) => {
        if $ours != $git {
            pretty_assertions::assert_eq!(
                common::to_hexdump($ours),
                common::to_hexdump($git),
                "\n=== INDEX CONTENTS DIFFER ===\ngitgood index ({} bytes) vs git index ({} bytes)",
                $ours.len(),
                $git.len()
            );
        }
    };
}
