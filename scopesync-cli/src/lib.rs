//! File-level operations behind the `scopesync` binary.

use anyhow::{Context, Result};
use scopesync_model::{diagram_registry, TypeRegistry};
use scopesync_scope::{ChangeDependencySorter, Scope};
use scopesync_types::{codec, Change, Changes};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads a type registry from a JSON file, or the diagram types if no file
/// is given.
pub fn load_registry(path: Option<&Path>) -> Result<TypeRegistry> {
    let Some(path) = path else {
        return Ok(diagram_registry());
    };
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    TypeRegistry::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load types from {}", path.display()))
}

pub fn read_changes(path: &Path) -> Result<Changes> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    codec::read_changes(BufReader::new(file))
        .with_context(|| format!("Failed to parse change-set {}", path.display()))
}

/// Builds a scope from an optional snapshot and applies each change-set in
/// turn, as a remote replica would.
pub fn replay(registry: TypeRegistry, snapshot: Option<&Path>, changes: &[PathBuf]) -> Result<Scope> {
    let mut scope = Scope::new(registry);
    if let Some(path) = snapshot {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        scope
            .read_from(BufReader::new(file))
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        info!("Loaded {} objects from {}", scope.len(), path.display());
    }
    for path in changes {
        let batch = read_changes(path)?;
        scope
            .update(&batch)
            .with_context(|| format!("Failed to apply {}", path.display()))?;
        debug!("Applied {} changes from {}", batch.len(), path.display());
    }
    Ok(scope)
}

/// Writes the scope's snapshot to `output`, or stdout.
pub fn write_snapshot(scope: &Scope, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            scope.write_to(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            scope.write_to(&mut writer)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

/// The application order of a change-set.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub order: Vec<Change>,
}

impl CheckReport {
    /// Whether the file already lists its creates in application order.
    pub fn creates_in_order(&self, changes: &Changes) -> bool {
        self.order
            .iter()
            .filter_map(|change| match change {
                Change::Create(create) => Some(&create.id),
                _ => None,
            })
            .eq(changes.creates.iter().map(|create| &create.id))
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.order {
            match change {
                Change::Create(create) => writeln!(f, "create {} {}", create.id, create.type_name)?,
                Change::Update(update) => {
                    let names: Vec<&str> = update.values.keys().map(String::as_str).collect();
                    writeln!(f, "update {} [{}]", update.id, names.join(", "))?
                }
                Change::Delete(delete) => writeln!(f, "delete {}", delete.id)?,
            }
        }
        Ok(())
    }
}

/// Computes the dependency order of a change-set, failing on cycles.
pub fn check(changes: &Changes) -> Result<CheckReport> {
    let order = ChangeDependencySorter::new(changes)
        .sort()
        .context("Change-set cannot be ordered")?;
    Ok(CheckReport { order })
}
