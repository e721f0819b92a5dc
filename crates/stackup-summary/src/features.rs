use std::time::Duration;

use serde::Serialize;
use stackup_runner::{CommandSpec, ProcessRunner, run_probe};
use stackup_utils::logging::log_probe_unavailable;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Optional platform components found on the machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    pub gpu: bool,
    pub vpn_control_plane: bool,
    pub vpn_connected: bool,
    pub vpn_sidecar: bool,
    pub remote_compute: bool,
}

impl Features {
    #[must_use]
    pub fn any_vpn(&self) -> bool {
        self.vpn_control_plane || self.vpn_connected || self.vpn_sidecar
    }
}

/// Independent best-effort probes. A probe that cannot run reports `false`.
pub struct FeatureProbe<R> {
    runner: R,
    timeout: Duration,
}

impl<R: ProcessRunner> FeatureProbe<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn detect(&self) -> Features {
        Features {
            gpu: self.gpu(),
            vpn_control_plane: self.vpn_control_plane(),
            vpn_connected: self.vpn_connected(),
            vpn_sidecar: self.vpn_sidecar(),
            remote_compute: self.remote_compute(),
        }
    }

    /// Stdout of `cmd`, or `None` after logging why not.
    fn probe(&self, name: &str, cmd: CommandSpec) -> Option<String> {
        match run_probe(&self.runner, &cmd, self.timeout) {
            Ok(stdout) => Some(stdout),
            Err(e) => {
                log_probe_unavailable(name, &e.to_string());
                None
            }
        }
    }

    pub fn gpu(&self) -> bool {
        self.probe("gpu", CommandSpec::new("nvidia-smi").arg("-L"))
            .is_some_and(|out| out.lines().any(|l| l.starts_with("GPU")))
    }

    pub fn vpn_control_plane(&self) -> bool {
        self.probe(
            "vpn_control_plane",
            CommandSpec::new("kubectl").args(["get", "namespace", "headscale"]),
        )
        .is_some()
    }

    pub fn vpn_connected(&self) -> bool {
        self.probe("vpn_connected", CommandSpec::new("tailscale").arg("status"))
            .is_some()
    }

    /// Some pod in any namespace runs a container named `tailscale`.
    pub fn vpn_sidecar(&self) -> bool {
        self.probe(
            "vpn_sidecar",
            CommandSpec::new("kubectl").args([
                "get",
                "pods",
                "-A",
                "-o",
                "jsonpath={.items[*].spec.containers[*].name}",
            ]),
        )
        .is_some_and(|out| out.split_whitespace().any(|name| name == "tailscale"))
    }

    pub fn remote_compute(&self) -> bool {
        self.probe(
            "remote_compute",
            CommandSpec::new("kubectl").args([
                "get",
                "nodes",
                "-l",
                "type=virtual-kubelet",
                "--no-headers",
            ]),
        )
        .is_some_and(|out| !out.trim().is_empty())
    }
}
