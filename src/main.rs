use anyhow::Result;
use clap::Parser;
use gopk::application::{AddOptions, RestoreOptions};
use gopk::commands::{self, config::Config};
use gopk::runtime::{RealProcessRunner, RealRuntime};
use gopk::toolchain::BuildTarget;
use std::path::PathBuf;
use std::sync::Arc;

/// gopk - Go package manager for private repositories
///
/// Keeps a `package.json` manifest next to `go.mod`. Public packages are
/// fetched with `go get`; private packages are cloned into a shared cache and
/// wired into `go.mod` through generated `replace`/`require` lines.
///
/// Examples:
///   gopk init example.com/app v0.1.0
///   gopk install -u git@git.example.com:team/auth.git -n auth -p
///   gopk restore --tidy
#[derive(Parser, Debug)]
#[command(author, version = env!("GOPK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to the current directory; also via GOPK_PROJECT)
    #[arg(
        long = "project",
        short = 'C',
        env = "GOPK_PROJECT",
        value_name = "DIR",
        global = true
    )]
    pub project: Option<PathBuf>,

    /// Private package cache (overrides defaults; also via GOPK_CACHE_ROOT)
    #[arg(
        long = "cache-root",
        env = "GOPK_CACHE_ROOT",
        value_name = "DIR",
        global = true
    )]
    pub cache_root: Option<PathBuf>,

    /// Go toolchain executable
    #[arg(long, env = "GOPK_GO", default_value = "go", global = true)]
    pub go: String,

    /// Git executable
    #[arg(long, env = "GOPK_GIT", default_value = "git", global = true)]
    pub git: String,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a manifest for a new project
    Init(InitArgs),

    /// Add a package to the project
    Install(InstallArgs),

    /// Remove a package from the project
    Remove(RemoveArgs),

    /// Fetch or clone every package in the manifest
    Restore(RestoreArgs),

    /// Run `go mod tidy` in the project
    Tidy,

    /// Cross-compile the project
    Build(BuildArgs),

    /// Delete go.mod and go.sum
    Clean,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Module name, e.g. example.com/app
    pub name: String,

    /// Project version
    #[arg(id = "project_version", value_name = "VERSION")]
    pub version: String,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Module path for public packages, clone URL for private ones
    #[arg(long = "url", short = 'u', value_name = "URL")]
    pub url: String,

    /// Name the package is recorded under (and imported as)
    #[arg(long, short = 'n')]
    pub name: String,

    /// Clone into the private cache instead of `go get`
    #[arg(long, short = 'p')]
    pub private: bool,

    /// Re-clone even if the package is already cached
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Restore the cloned package's own manifest
    #[arg(long, short = 'r')]
    pub recursive: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the package to remove
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct RestoreArgs {
    /// Re-clone the project's private packages
    #[arg(long)]
    pub update: bool,

    /// Also re-clone private packages of nested projects
    #[arg(long = "update-global")]
    pub update_global: bool,

    /// Run `go mod tidy` in every private package and the project
    #[arg(long)]
    pub tidy: bool,
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Target operating system (GOOS)
    #[arg(long, value_name = "GOOS")]
    pub os: String,

    /// Target architecture (GOARCH)
    #[arg(long, value_name = "GOARCH")]
    pub arch: String,

    /// Output path of the artifact
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: String,

    /// Package to build
    #[arg(long, short = 't', value_name = "PKG", default_value = ".")]
    pub target: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config::new(
        RealRuntime,
        Arc::new(RealProcessRunner),
        cli.project,
        cli.cache_root,
        &cli.go,
        &cli.git,
    )?;

    match cli.command {
        Commands::Init(args) => commands::init(&config, &args.name, &args.version).await?,
        Commands::Install(args) => {
            let options = AddOptions {
                private: args.private,
                update: args.force,
                recursive: args.recursive,
            };
            commands::install(&config, &args.url, &args.name, options).await?
        }
        Commands::Remove(args) => commands::remove(&config, &args.name)?,
        Commands::Restore(args) => {
            let options = RestoreOptions {
                update: args.update,
                update_nested: args.update_global,
                tidy: args.tidy,
            };
            commands::restore(&config, options).await?
        }
        Commands::Tidy => commands::tidy(&config).await?,
        Commands::Build(args) => {
            let target = BuildTarget {
                os: args.os,
                arch: args.arch,
                output: args.output,
                target: args.target,
            };
            commands::build(&config, target).await?
        }
        Commands::Clean => commands::clean(&config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_init_parsing() {
        let cli = Cli::try_parse_from(["gopk", "init", "example.com/app", "v0.1.0"]).unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.name, "example.com/app");
                assert_eq!(args.version, "v0.1.0");
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from([
            "gopk",
            "install",
            "-u",
            "git@host:team/auth.git",
            "-n",
            "auth",
            "-p",
            "-r",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.url, "git@host:team/auth.git");
                assert_eq!(args.name, "auth");
                assert!(args.private);
                assert!(args.recursive);
                assert!(!args.force);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_requires_name() {
        let result = Cli::try_parse_from(["gopk", "install", "-u", "github.com/pkg/errors"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_restore_flags() {
        let cli =
            Cli::try_parse_from(["gopk", "restore", "--update-global", "--tidy"]).unwrap();
        match cli.command {
            Commands::Restore(args) => {
                assert!(!args.update);
                assert!(args.update_global);
                assert!(args.tidy);
            }
            _ => panic!("Expected Restore command"),
        }
    }

    #[test]
    fn test_cli_global_project_parsing() {
        let cli = Cli::try_parse_from(["gopk", "-C", "/tmp/app", "tidy"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/app")));

        let cli = Cli::try_parse_from(["gopk", "clean", "--project", "/tmp/app"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/app")));
    }

    #[test]
    fn test_cli_build_parsing() {
        let cli = Cli::try_parse_from([
            "gopk", "build", "--os", "windows", "--arch", "amd64", "-o", "bin/app.exe",
        ])
        .unwrap();
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.os, "windows");
                assert_eq!(args.arch, "amd64");
                assert_eq!(args.output, "bin/app.exe");
                assert_eq!(args.target, ".");
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["gopk", "example.com/app"]);
        assert!(result.is_err());
    }
}
