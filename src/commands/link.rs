//! The link command: plan, link and report every package of every container.
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ContainerSpec, HostOptions};
use crate::linking::{LinkOutcome, RunResult, executor, planner};
use crate::logging::{Log, PackageStatus};
use crate::paths::{self, shrink_user};
use crate::report::{self, ReportOptions};

/// Outcome of linking one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRun {
    /// Container the package belongs to.
    pub container: String,
    /// Package name (the container name for a package container).
    pub package: String,
    /// What happened to each planned link.
    pub result: RunResult,
}

/// Link every container in `options`, in name order.
///
/// Containers and packages that cannot be processed are reported and
/// skipped; they never abort the run.
///
/// # Errors
///
/// Returns an error only if the working directory needed to resolve a
/// relative path is unavailable.
pub fn run(options: &HostOptions, log: &dyn Log) -> Result<Vec<PackageRun>> {
    if options.dry_run {
        log.dry_run("Running in dry (no change) mode...");
    }
    if options.containers.is_empty() {
        log.warn("Nothing to do...");
        return Ok(Vec::new());
    }

    let mut runs = Vec::new();
    for container in options.containers.values() {
        runs.extend(link_container(container, options, log)?);
    }
    Ok(runs)
}

fn link_container(
    container: &ContainerSpec,
    options: &HostOptions,
    log: &dyn Log,
) -> Result<Vec<PackageRun>> {
    let name = &container.name;
    let (Some(source), Some(destination)) = (&container.source, &container.destination) else {
        log.stage(&format!("Stowing files in \"{name}\""));
        log.warn(&format!(
            "No valid destination for container \"{name}\". Skipping..."
        ));
        log.record_package(name, PackageStatus::Failed, Some("no valid destination"));
        return Ok(Vec::new());
    };

    let source = paths::absolute(source)
        .with_context(|| format!("resolving source of \"{name}\""))?;
    let destination = paths::absolute(destination)
        .with_context(|| format!("resolving destination of \"{name}\""))?;
    log.stage(&format!(
        "Stowing files in \"{name}\" ({} -> {})",
        shrink_user(&source),
        shrink_user(&destination)
    ));

    if !container.destination_create && !is_writable_dir(&destination) {
        log.warn(&format!(
            "Destination \"{}\" inaccessible. Use key \"destination_create\" to force creation of destination.",
            shrink_user(&destination)
        ));
        log.record_package(name, PackageStatus::Failed, Some("destination inaccessible"));
        return Ok(Vec::new());
    }

    let packages: Vec<(String, PathBuf)> = if container.pkg {
        vec![(name.clone(), source.clone())]
    } else if let Some(selected) = &container.packages {
        selected
            .iter()
            .map(|p| (p.clone(), source.join(p)))
            .collect()
    } else {
        match list_packages(&source) {
            Ok(found) => found
                .into_iter()
                .map(|p| {
                    let dir = source.join(&p);
                    (p, dir)
                })
                .collect(),
            Err(e) => {
                log.warn(&format!(
                    "Cannot list packages in \"{}\": {e}",
                    shrink_user(&source)
                ));
                log.record_package(name, PackageStatus::Failed, Some("source unreadable"));
                return Ok(Vec::new());
            }
        }
    };

    let mut runs = Vec::new();
    for (package, dir) in packages {
        let label = if container.pkg {
            name.clone()
        } else {
            format!("{name}/{package}")
        };
        log.info(&format!("Stowing {package}..."));

        if !dir.is_dir() {
            log.warn("Package was not found in dotfiles path. Skipping...");
            log.record_package(&label, PackageStatus::NotFound, None);
            continue;
        }

        let (include, exclude) = container
            .rule_for(&package)
            .map_or((&[][..], &[][..]), |rule| rule.as_lists());
        let candidates = planner::collect(&dir, &destination, &options.tag, include, exclude);
        let result = executor::create(candidates, options.dry_run, options.overwrite);
        show(&result, options, log);

        let status = if options.dry_run {
            PackageStatus::DryRun
        } else if result.bucket(LinkOutcome::Skipped).is_empty() {
            PackageStatus::Ok
        } else {
            PackageStatus::Skipped
        };
        log.record_package(&label, status, Some(&report::stats(&result)));

        runs.push(PackageRun {
            container: name.clone(),
            package,
            result,
        });
    }
    Ok(runs)
}

fn show(result: &RunResult, options: &HostOptions, log: &dyn Log) {
    let rendered = report::render(
        result,
        ReportOptions {
            dry_run: options.dry_run,
            group_output: options.group_output,
            verbose: options.verbose,
        },
    );
    for line in &rendered.lines {
        if options.dry_run {
            log.dry_run(&line.colored());
        } else {
            log.info(&line.colored());
        }
    }
    log.info(&format!("✔ {}", rendered.stats));
}

/// Sub-directories of `source`, sorted by name.
fn list_packages(source: &Path) -> std::io::Result<Vec<String>> {
    let mut packages = Vec::new();
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        if fs::metadata(entry.path()).is_ok_and(|m| m.is_dir()) {
            packages.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    packages.sort();
    Ok(packages)
}

/// Whether `path` is a directory the current user may create entries in.
#[cfg(unix)]
fn is_writable_dir(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};
    path.is_dir() && access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_dir() && !m.permissions().readonly())
}
