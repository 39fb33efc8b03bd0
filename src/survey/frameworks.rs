use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Dependency-name fragments in `package.json` and the framework they indicate.
const NODE_PATTERNS: &[(&str, &str)] = &[
    ("react", "React"),
    ("hardhat", "Hardhat"),
    ("next", "Next.js"),
    ("vue", "Vue.js"),
    ("express", "Express"),
];

/// Fragments searched for anywhere in `requirements.txt`.
const PYTHON_PATTERNS: &[(&str, &str)] = &[("flask", "Flask"), ("django", "Django")];

/// Dependency tables are kept untyped so a mistyped one does not discard the other.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: Option<Value>,
    #[serde(default)]
    dev_dependencies: Option<Value>,
}

/// Adds frameworks named by the manifest at `path` to `found`.
///
/// Files other than `package.json` and `requirements.txt` are ignored, as are
/// manifests that cannot be read or parsed.
pub fn detect(path: &Path, found: &mut BTreeSet<String>) {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return;
    };

    match file_name {
        "package.json" => match read_package_manifest(path) {
            Some(manifest) => from_package_manifest(&manifest, found),
            None => debug!("Skipping unparsable manifest {}", path.display()),
        },
        "requirements.txt" => match std::fs::read_to_string(path) {
            Ok(text) => from_requirements(&text, found),
            Err(e) => debug!("Skipping unreadable {}: {e}", path.display()),
        },
        _ => {}
    }
}

fn read_package_manifest(path: &Path) -> Option<PackageManifest> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn from_package_manifest(manifest: &PackageManifest, found: &mut BTreeSet<String>) {
    let names = manifest
        .dependencies
        .iter()
        .chain(manifest.dev_dependencies.iter())
        .filter_map(Value::as_object)
        .flat_map(|deps| deps.keys());

    for name in names {
        let name = name.to_lowercase();
        for (fragment, framework) in NODE_PATTERNS {
            if name.contains(fragment) {
                found.insert((*framework).to_string());
            }
        }
    }
}

fn from_requirements(text: &str, found: &mut BTreeSet<String>) {
    let text = text.to_lowercase();
    for (fragment, framework) in PYTHON_PATTERNS {
        if text.contains(fragment) {
            found.insert((*framework).to_string());
        }
    }
}
