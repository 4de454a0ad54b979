//! Exposes the root `VERSION` file to the crate as `EML_GUARD_VERSION`.

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let version_file = Path::new(&manifest_dir).join("../../VERSION");
    println!("cargo:rerun-if-changed={}", version_file.display());

    let contents = fs::read_to_string(&version_file)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_file.display()));
    let version = contents.trim();

    let numeric_parts = version
        .split('.')
        .filter(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()))
        .count();
    assert!(
        numeric_parts == 3 && version.split('.').count() == 3,
        "VERSION must look like MAJOR.MINOR.PATCH, got '{version}'"
    );

    let package_version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    if package_version != version {
        println!(
            "cargo:warning=VERSION ({version}) differs from workspace package version ({package_version})"
        );
    }

    println!("cargo:rustc-env=EML_GUARD_VERSION={version}");
}
