//! Deployment and documentation commands
//!
//! `bedrud deploy` packages the backend binary, uploads it over rsync/ssh,
//! and hands configuration over to pyinfra. `bedrud uninstall` drives the
//! remote binary's own uninstaller, falling back to manual systemd cleanup.
//! Command lines are built by pure functions so the exact argv can be
//! unit-tested; only [`run_command`] touches the system.

use crate::config::DeployConfig;
use crate::errors::AgentError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// SSH identity for every remote operation.
#[derive(Debug, Clone)]
pub struct SshOptions {
    pub user: String,
    pub auth_key: Option<PathBuf>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            auth_key: None,
        }
    }
}

impl SshOptions {
    /// `ssh` arguments shared by all invocations. Host key checking is off:
    /// deploy targets are freshly provisioned hosts.
    pub fn ssh_args(&self) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "StrictHostKeyChecking=no".to_string()];
        if let Some(key) = &self.auth_key {
            args.push("-i".to_string());
            args.push(key.display().to_string());
        }
        args
    }

    /// The ssh command as a single string, for rsync's `-e` flag.
    pub fn ssh_command_string(&self) -> String {
        let mut cmd = "ssh -o StrictHostKeyChecking=no".to_string();
        if let Some(key) = &self.auth_key {
            cmd.push_str(&format!(" -i {}", key.display()));
        }
        cmd
    }

    pub fn remote_target(&self, ip: &str) -> String {
        format!("{}@{}", self.user, ip)
    }
}

/// Optional provisioning overrides forwarded to pyinfra as `BEDRUD_*` env.
#[derive(Debug, Clone, Default)]
pub struct ProvisionOverrides {
    pub domain: Option<String>,
    pub acme_email: Option<String>,
    pub port: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub lk_port: Option<String>,
    pub lk_tcp_port: Option<String>,
    pub lk_udp_port: Option<String>,
}

/// `tar` argv that packages the dist binary into a tar.xz archive.
pub fn archive_cmd(cfg: &DeployConfig) -> Vec<String> {
    let dist = Path::new(&cfg.dist_binary);
    let dir = dist.parent().unwrap_or_else(|| Path::new("."));
    let name = dist
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| cfg.dist_binary.clone());

    vec![
        "tar".to_string(),
        "-C".to_string(),
        dir.display().to_string(),
        "-cJf".to_string(),
        cfg.archive_path.clone(),
        name,
    ]
}

/// `ssh` argv that installs rsync on the remote host if missing.
pub fn ensure_remote_rsync_cmd(ssh: &SshOptions, ip: &str) -> Vec<String> {
    let mut cmd = vec!["ssh".to_string()];
    cmd.extend(ssh.ssh_args());
    cmd.push(ssh.remote_target(ip));
    cmd.push("which rsync || (apt-get update && apt-get install -y rsync)".to_string());
    cmd
}

/// `rsync` argv that uploads the archive to the remote staging path.
pub fn upload_cmd(cfg: &DeployConfig, ssh: &SshOptions, ip: &str) -> Vec<String> {
    vec![
        "rsync".to_string(),
        "-avz".to_string(),
        "--progress".to_string(),
        "-e".to_string(),
        ssh.ssh_command_string(),
        cfg.archive_path.clone(),
        format!("{}:{}", ssh.remote_target(ip), cfg.remote_archive_path),
    ]
}

/// `pyinfra` argv that runs the provisioning script against the host.
pub fn provision_cmd(cfg: &DeployConfig, ssh: &SshOptions, ip: &str) -> Vec<String> {
    let mut cmd = vec![
        "pyinfra".to_string(),
        ip.to_string(),
        cfg.provision_script.clone(),
        "--user".to_string(),
        ssh.user.clone(),
    ];
    if let Some(key) = &ssh.auth_key {
        cmd.push("--key".to_string());
        cmd.push(key.display().to_string());
    }
    cmd
}

/// Environment handed to pyinfra. Unset overrides become empty strings, so
/// the provisioning script sees every variable.
pub fn provision_env(ssh: &SshOptions, ip: &str, overrides: &ProvisionOverrides) -> Vec<(String, String)> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        ("BEDRUD_IP".to_string(), ip.to_string()),
        ("BEDRUD_USER".to_string(), ssh.user.clone()),
        ("BEDRUD_DOMAIN".to_string(), opt(&overrides.domain)),
        ("BEDRUD_EMAIL".to_string(), opt(&overrides.acme_email)),
        ("BEDRUD_PORT".to_string(), opt(&overrides.port)),
        ("BEDRUD_CERT".to_string(), opt(&overrides.cert)),
        ("BEDRUD_KEY".to_string(), opt(&overrides.key)),
        ("BEDRUD_LK_PORT".to_string(), opt(&overrides.lk_port)),
        ("BEDRUD_LK_TCP_PORT".to_string(), opt(&overrides.lk_tcp_port)),
        ("BEDRUD_LK_UDP_PORT".to_string(), opt(&overrides.lk_udp_port)),
    ]
}

/// Remote shell snippet that uninstalls the platform. Prefers the installed
/// binary's own `uninstall`; falls back to stopping units and removing state
/// by hand (matching the server's Debian uninstaller).
pub fn uninstall_script(cfg: &DeployConfig) -> String {
    let units = cfg.services.join(" ");
    let unit_files = cfg
        .services
        .iter()
        .map(|s| format!("/etc/systemd/system/{}.service", s))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "if [ -f {bin} ]; then sudo {bin} uninstall; \
         else echo 'Bedrud binary not found at {bin}. Attempting manual cleanup...'; \
         sudo systemctl stop {units} 2>/dev/null; \
         sudo systemctl disable {units} 2>/dev/null; \
         sudo rm -f {unit_files}; \
         sudo rm -rf /etc/bedrud /var/lib/bedrud /var/log/bedrud {bin}; fi",
        bin = cfg.install_path,
        units = units,
        unit_files = unit_files,
    )
}

/// `ssh` argv for the remote uninstall.
pub fn uninstall_cmd(cfg: &DeployConfig, ssh: &SshOptions, ip: &str) -> Vec<String> {
    let mut cmd = vec!["ssh".to_string()];
    cmd.extend(ssh.ssh_args());
    cmd.push(ssh.remote_target(ip));
    cmd.push(uninstall_script(cfg));
    cmd
}

/// `mkdocs` argv for the documentation site.
pub fn docs_cmd(cfg: &DeployConfig, serve: bool) -> Vec<String> {
    vec![
        "mkdocs".to_string(),
        if serve { "serve" } else { "build" }.to_string(),
        "-f".to_string(),
        format!("{}/mkdocs.yml", cfg.docs_dir.trim_end_matches('/')),
    ]
}

/// Run an argv with optional extra environment, propagating a non-zero exit
/// as an error.
pub fn run_command(argv: &[String], envs: &[(String, String)]) -> Result<(), AgentError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| AgentError::Deploy("empty command".to_string()))?;

    log::debug!("Running: {}", argv.join(" "));
    let status = Command::new(program)
        .args(args)
        .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .status()
        .map_err(|e| AgentError::Deploy(format!("failed to run {}: {}", program, e)))?;

    if !status.success() {
        return Err(AgentError::Deploy(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

/// Package, upload, and provision a remote host end to end.
pub fn deploy(
    cfg: &DeployConfig,
    ssh: &SshOptions,
    ip: &str,
    overrides: &ProvisionOverrides,
) -> Result<(), AgentError> {
    println!("➜ Starting auto-config for {}...", ip);

    if !Path::new(&cfg.dist_binary).exists() {
        println!("➜ Backend binary not found. Building...");
        run_command(&cfg.build_command, &[])?;
    }

    println!("➜ Creating tar.xz archive for deployment...");
    run_command(&archive_cmd(cfg), &[])?;

    // rsync missing on a fresh host is common; a failure here is tolerated
    // and surfaces in the upload step instead.
    println!("➜ Ensuring rsync is installed on remote server...");
    if let Err(e) = run_command(&ensure_remote_rsync_cmd(ssh, ip), &[]) {
        log::warn!("rsync preinstall failed: {}", e);
    }

    println!("➜ Uploading {} to {}...", cfg.archive_path, ip);
    run_command(&upload_cmd(cfg, ssh, ip), &[])?;

    let cmd = provision_cmd(cfg, ssh, ip);
    println!("➜ Running pyinfra: {}", cmd.join(" "));
    run_command(&cmd, &provision_env(ssh, ip, overrides))?;

    println!("✓ Auto-config completed successfully!");
    Ok(())
}

/// Remove the platform from a remote host.
pub fn uninstall(cfg: &DeployConfig, ssh: &SshOptions, ip: &str) -> Result<(), AgentError> {
    println!("➜ Uninstalling Bedrud from {}...", ip);
    run_command(&uninstall_cmd(cfg, ssh, ip), &[])?;
    println!("✓ Uninstallation completed successfully!");
    Ok(())
}

/// Build or serve the documentation site.
pub fn docs(cfg: &DeployConfig, serve: bool) -> Result<(), AgentError> {
    run_command(&docs_cmd(cfg, serve), &[])
}
