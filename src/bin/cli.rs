//! Bedrud CLI - management and deployment tool.

use bedrud_agents::config::BedrudConfig;
use bedrud_agents::deploy::{self, ProvisionOverrides, SshOptions};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    bedrud_agents::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "deploy" => cmd_deploy(&args),
        "uninstall" => cmd_uninstall(&args),
        "docs" => cmd_docs(&args),
        "config" => cmd_config(&args),
        "--help" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: bedrud <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  deploy     --ip <ip> [--user <user>] [--auth-key <path>]");
    eprintln!("             [--domain <domain>] [--acme-email <email>] [--port <port>]");
    eprintln!("             [--cert <path>] [--key <path>]");
    eprintln!("             [--lk-port <p>] [--lk-tcp-port <p>] [--lk-udp-port <p>]");
    eprintln!("  uninstall  --ip <ip> [--user <user>] [--auth-key <path>]");
    eprintln!("  docs       [--serve]");
    eprintln!("  config     init | show");
}

/// Pull `--flag value` out of the argument list.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn ssh_options(args: &[String]) -> SshOptions {
    SshOptions {
        user: flag_value(args, "--user").unwrap_or_else(|| "root".to_string()),
        auth_key: flag_value(args, "--auth-key").map(PathBuf::from),
    }
}

fn require_ip(args: &[String], command: &str) -> String {
    match flag_value(args, "--ip") {
        Some(ip) => ip,
        None => {
            eprintln!("Error: --ip is required when using {}", command);
            std::process::exit(1);
        }
    }
}

fn cmd_deploy(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let ip = require_ip(args, "deploy");
    let config = BedrudConfig::load_or_default()?;
    let ssh = ssh_options(args);

    let overrides = ProvisionOverrides {
        domain: flag_value(args, "--domain"),
        acme_email: flag_value(args, "--acme-email"),
        port: flag_value(args, "--port"),
        cert: flag_value(args, "--cert"),
        key: flag_value(args, "--key"),
        lk_port: flag_value(args, "--lk-port"),
        lk_tcp_port: flag_value(args, "--lk-tcp-port"),
        lk_udp_port: flag_value(args, "--lk-udp-port"),
    };

    if let Err(e) = deploy::deploy(&config.deploy, &ssh, &ip, &overrides) {
        eprintln!("✗ Auto-config failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_uninstall(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let ip = require_ip(args, "uninstall");
    let config = BedrudConfig::load_or_default()?;
    let ssh = ssh_options(args);

    if let Err(e) = deploy::uninstall(&config.deploy, &ssh, &ip) {
        eprintln!("✗ Uninstallation failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_docs(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = BedrudConfig::load_or_default()?;
    let serve = args.contains(&"--serve".to_string()) || args.contains(&"serve".to_string());
    deploy::docs(&config.deploy, serve)?;
    Ok(())
}

fn cmd_config(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let path = BedrudConfig::default_path();
    match args.get(2).map(|s| s.as_str()) {
        Some("init") => {
            let config = BedrudConfig::default();
            config.save_to_file(&path)?;
            println!("✓ Wrote {}", path.display());
        }
        Some("show") | None => {
            let config = BedrudConfig::load_or_default()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Some(other) => {
            eprintln!("Unknown config subcommand: {}", other);
            std::process::exit(1);
        }
    }
    Ok(())
}
