//! `get-sysprof`: report versions of catadm and its components.

use serde::Serialize;

use super::Output;
use crate::error::Result;

#[derive(Serialize)]
struct SysProfile {
    version: &'static str,
    build: &'static str,
    os: &'static str,
    arch: &'static str,
    sqlite: &'static str,
    components: Vec<Component>,
}

#[derive(Serialize)]
struct Component {
    name: &'static str,
    role: &'static str,
}

const COMPONENTS: [Component; 5] = [
    Component { name: "rusqlite (bundled SQLite)", role: "catalog store" },
    Component { name: "roxmltree", role: "XML parsing" },
    Component { name: "quick-xml", role: "XML writing" },
    Component { name: "serde_json", role: "JSON parsing" },
    Component { name: "reqwest (rustls)", role: "HTTP client" },
];

fn profile() -> SysProfile {
    SysProfile {
        version: env!("CARGO_PKG_VERSION"),
        build: if cfg!(debug_assertions) { "dev" } else { "release" },
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        sqlite: rusqlite::version(),
        components: COMPONENTS.into(),
    }
}

/// Print the system profile.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(out: &Output) -> Result<()> {
    let profile = profile();
    if out.json {
        return out.emit_json(&profile);
    }

    println!("catadm system profile");
    println!("---------------------");
    println!("catadm version: {} ({})", profile.version, profile.build);
    println!("os: {} ({})", profile.os, profile.arch);
    println!("SQLite: {}", profile.sqlite);
    for c in &profile.components {
        println!("{}: {}", c.role, c.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_reports_sqlite_version() {
        let p = profile();
        assert!(p.sqlite.starts_with('3'));
        assert_eq!(p.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(p.components.len(), COMPONENTS.len());
    }
}
