//! Golden-file runner: every `fixtures/<name>.sql` is converted and compared with
//! `<name>.mysql` (expected output) or `<name>.err` (substring of the expected error).
//!
//! usage: dev-test-runner [FIXTURE_GLOB]
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;

use jackup::ConvertOptions;

enum Outcome {
    Pass,
    Fail(String),
}

fn run_fixture(source_path: &Path) -> Result<Outcome> {
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;
    let expected_out = source_path.with_extension("mysql");
    let expected_err = source_path.with_extension("err");

    // sequential and parallel must agree byte for byte
    let sequential = jackup::convert(&source, &ConvertOptions::default());
    let parallel = jackup::convert(&source, &ConvertOptions { parallel: true, ..Default::default() });
    match (&sequential, &parallel) {
        (Ok(a), Ok(b)) if a != b => return Ok(Outcome::Fail("parallel output differs".into())),
        (Ok(_), Err(_)) | (Err(_), Ok(_)) => return Ok(Outcome::Fail("parallel result differs".into())),
        _ => {}
    }

    if expected_out.exists() {
        let expected = std::fs::read_to_string(&expected_out)?;
        return Ok(match sequential {
            Ok(conversion) if conversion.mysql == expected => Outcome::Pass,
            Ok(conversion) => Outcome::Fail(format!("output mismatch, got:\n{}", conversion.mysql)),
            Err(error) => Outcome::Fail(format!("unexpected error: {error}")),
        });
    }
    if expected_err.exists() {
        let expected = std::fs::read_to_string(&expected_err)?;
        let expected = expected.trim();
        return Ok(match sequential {
            Err(error) if error.to_string().contains(expected) => Outcome::Pass,
            Err(error) => Outcome::Fail(format!("error mismatch, got: {error}")),
            Ok(_) => Outcome::Fail(format!("expected an error containing `{expected}`")),
        });
    }
    bail!("{} has neither a .mysql nor a .err companion", source_path.display())
}

fn main() -> Result<()> {
    let default_pattern = format!("{}/../fixtures/*.sql", env!("CARGO_MANIFEST_DIR"));
    let pattern = std::env::args().nth(1).unwrap_or(default_pattern);

    let mut fixtures = glob::glob(&pattern)?.collect::<Result<Vec<PathBuf>, _>>()?;
    fixtures.sort();
    if fixtures.is_empty() {
        bail!("no fixtures matched {pattern}");
    }

    let mut failed = 0usize;
    for fixture in &fixtures {
        let name = fixture.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        match run_fixture(fixture)? {
            Outcome::Pass => eprintln!("{} {name}", "✅ pass".green()),
            Outcome::Fail(reason) => {
                failed += 1;
                eprintln!("{} {name}: {reason}", "❌ fail".red());
            }
        }
    }

    eprintln!("{} fixtures, {} failed", fixtures.len(), failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
