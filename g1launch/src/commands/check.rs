//! `g1launch check`: preflight report, starts nothing.

use std::path::Path;

use anyhow::Result;
use g1launch_core::config::{load_dotenv_from_dir, LaunchConfig, LayoutConfig};
use g1launch_env::{DependencyManifest, EnvironmentHandle, ExitCode};
use serde::Serialize;

use crate::launcher::{env_is_set, missing_required, resolve_base_directory_with};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub base_dir: String,
    /// Activation artifact, when found
    pub environment: Option<String>,
    pub environment_error: Option<String>,
    pub interpreter: Option<String>,
    pub interpreter_exists: bool,
    pub manifest: Option<String>,
    pub packages: usize,
    pub dotenv: bool,
    pub missing_env: Vec<String>,
    pub ok: bool,
}

/// Collect the report for `base`. `is_set` answers whether a variable is set
/// in the launcher's own environment.
pub fn build_report<F>(base: &Path, layout: &LayoutConfig, launch: &LaunchConfig, is_set: F) -> CheckReport
where
    F: Fn(&str) -> bool,
{
    let (environment, environment_error, interpreter, interpreter_exists) =
        match EnvironmentHandle::locate(&base.join(&layout.env_dir)) {
            Ok(env) => (
                Some(env.activation_script().display().to_string()),
                None,
                Some(env.interpreter().display().to_string()),
                env.interpreter().exists(),
            ),
            Err(e) => (None, Some(e.to_string()), None, false),
        };

    let (manifest, packages) = match DependencyManifest::locate(base, &layout.manifest) {
        Ok(Some(m)) => (Some(m.path().display().to_string()), m.packages().len()),
        Ok(None) => (None, 0),
        Err(e) => {
            tracing::warn!("{}", e);
            (None, 0)
        }
    };

    let dotenv_vars = load_dotenv_from_dir(base);
    let dotenv = dotenv_vars.is_some();
    let missing_env = missing_required(
        &launch.required_env,
        &dotenv_vars.unwrap_or_default(),
        is_set,
    );

    let ok = environment.is_some() && missing_env.is_empty();
    CheckReport {
        base_dir: base.display().to_string(),
        environment,
        environment_error,
        interpreter,
        interpreter_exists,
        manifest,
        packages,
        dotenv,
        missing_env,
        ok,
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

fn print_report(r: &CheckReport) {
    println!("Base directory: {}", r.base_dir);
    match (&r.environment, &r.environment_error) {
        (Some(env), _) => println!("  {} environment   {}", mark(true), env),
        (None, Some(err)) => println!("  {} environment   {}", mark(false), err),
        (None, None) => println!("  {} environment", mark(false)),
    }
    if let Some(ref interp) = r.interpreter {
        println!("  {} interpreter   {}", mark(r.interpreter_exists), interp);
    }
    match r.manifest {
        Some(ref m) => println!("  {} manifest      {} ({} requirement(s))", mark(true), m, r.packages),
        None => println!("  - manifest      none (install step will be skipped)"),
    }
    println!(
        "  {} .env          {}",
        if r.dotenv { mark(true) } else { "-" },
        if r.dotenv { "found" } else { "none" }
    );
    if r.missing_env.is_empty() {
        println!("  {} required env  all set", mark(true));
    } else {
        println!("  {} required env  missing: {}", mark(false), r.missing_env.join(", "));
    }
}

pub fn cmd_check(layout: LayoutConfig, json: bool) -> Result<ExitCode> {
    let base = resolve_base_directory_with(layout.base_dir.as_deref());
    let launch = LaunchConfig::from_env();
    let report = build_report(&base, &layout, &launch, env_is_set);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FATAL
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn launch_requiring(keys: &[&str]) -> LaunchConfig {
        LaunchConfig {
            required_env: keys.iter().map(|k| k.to_string()).collect(),
            ..LaunchConfig::default()
        }
    }

    #[test]
    fn test_report_missing_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let r = build_report(tmp.path(), &LayoutConfig::default(), &launch_requiring(&[]), |_| true);
        assert!(!r.ok);
        assert!(r.environment.is_none());
        assert!(r.environment_error.unwrap().contains("environment not found"));
        assert!(r.manifest.is_none());
    }

    #[test]
    fn test_report_complete_project() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tmp.path().join("venv").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("activate"), "").unwrap();
        fs::write(bin.join("python"), "").unwrap();
        fs::write(tmp.path().join("requirements.txt"), "flask\nopenai\n").unwrap();
        fs::write(tmp.path().join(".env"), "ELEVENLABS_API_KEY=k\n").unwrap();

        let launch = launch_requiring(&["OPENAI_API_KEY", "ELEVENLABS_API_KEY"]);
        let r = build_report(tmp.path(), &LayoutConfig::default(), &launch, |k| k == "OPENAI_API_KEY");
        assert!(r.ok);
        assert!(r.interpreter_exists);
        assert_eq!(r.packages, 2);
        assert!(r.dotenv);

        let r = build_report(tmp.path(), &LayoutConfig::default(), &launch, |_| false);
        assert!(!r.ok);
        assert_eq!(r.missing_env, vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn test_report_serializes() {
        let tmp = tempfile::tempdir().unwrap();
        let r = build_report(tmp.path(), &LayoutConfig::default(), &launch_requiring(&[]), |_| true);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["ok"], false);
        assert!(v["missing_env"].as_array().unwrap().is_empty());
    }
}
