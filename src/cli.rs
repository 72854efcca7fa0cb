//! Minimal CLI: Spanner DDL → (mysql | ir)
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::ir::DdStatements;
use crate::lower::{lower_to_mysql, ConvertOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert Cloud Spanner DDL into MySQL DDL, or dump the parsed schema as JSON
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert and print MySQL CREATE TABLE statements
    Mysql(MysqlOut),
    /// parse and print the intermediate representation as JSON
    Ir(IrOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin.
    /// Multiple inputs are read as one schema.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct MysqlOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// read a JSON IR document (as printed by `ir`) instead of DDL
    #[arg(long, default_value_t = false)]
    from_ir: bool,

    /// fail when anything would be dropped (STORING, NULL_FILTERED, ...)
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// convert tables in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// output .sql file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct IrOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// All inputs, in the order given, as `(label, contents)`.
    fn load_sources(&self) -> Result<Vec<(String, String)>> {
        let mut sources = Vec::new();
        for pattern in &self.input {
            if pattern == "-" {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("failed to read stdin")?;
                sources.push(("<stdin>".to_string(), source));
                continue;
            }
            for source_path in resolve_file_path_patterns([pattern])? {
                let label = source_path.to_string_lossy().to_string();
                let source = std::fs::read_to_string(&source_path)
                    .with_context(|| format!("failed to read source file ({label})"))?;
                sources.push((label, source));
            }
        }
        Ok(sources)
    }

    /// Parse every input into one schema. Files are joined with `;` so each may omit
    /// its final terminator.
    fn load_ddl(&self) -> Result<DdStatements> {
        let sources = self.load_sources()?;
        let labels = sources.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>().join(", ");
        let document = sources.iter().map(|(_, src)| src.as_str()).collect::<Vec<_>>().join("\n;\n");
        crate::parse::parse_ddl(&document).with_context(|| format!("failed to parse DDL ({labels})"))
    }

    fn load_ir(&self) -> Result<DdStatements> {
        let sources = self.load_sources()?;
        let [(label, source)] = sources.as_slice() else {
            bail!("--from-ir takes exactly one input, got {}", sources.len());
        };
        crate::path_de::load_ir(source).with_context(|| format!("failed to load IR ({label})"))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Mysql(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                // 1) build IR
                let ddl = if target.from_ir {
                    target.input_settings.load_ir()?
                } else {
                    target.input_settings.load_ddl()?
                };

                // 2) convert
                let options = ConvertOptions { strict: target.strict, parallel: target.parallel };
                let conversion = lower_to_mysql(&ddl, &options).context("conversion failed")?;
                for warning in &conversion.warnings {
                    eprintln!("{} {warning}", "warning:".yellow().bold());
                }

                write_output(target.out.as_ref(), &conversion.mysql)
            }
            Command::Ir(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let ddl = target.input_settings.load_ddl()?;
                let ir_src = serde_json::to_string_pretty(&ddl)?;
                write_output(target.out.as_ref(), &format!("{ir_src}\n"))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, contents: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}

pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {pattern}"))?
                .collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                // an explicit glob that matched nothing is an error, not an empty schema
                bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
