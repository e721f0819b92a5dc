use std::path::Path;

use stackup_runner::CommandSpec;

use crate::inspection::Inspection;

fn kubectl<const N: usize>(args: [&str; N]) -> CommandSpec {
    CommandSpec::new("kubectl").args(args)
}

/// The inspections run after a failed phase, in display order.
///
/// Everything here is read-only. `root` locates the certificate backups
/// written by the cert-manager phase.
pub fn standard_battery(root: &Path) -> Vec<Inspection> {
    vec![
        Inspection::command(
            "Cluster nodes",
            kubectl(["get", "nodes", "-o", "wide"]),
            "Cluster not reachable",
        ),
        Inspection::command(
            "Namespaces",
            kubectl(["get", "namespaces"]),
            "Cluster not reachable",
        ),
        Inspection::command(
            "cert-manager pods",
            kubectl(["get", "pods", "-n", "cert-manager"]),
            "cert-manager not installed",
        ),
        Inspection::command(
            "Certificate CRDs",
            kubectl(["get", "crd"]),
            "No cert-manager CRDs found",
        )
        .filtered("cert-manager.io"),
        Inspection::command(
            "Certificates",
            kubectl(["get", "certificates", "-A"]),
            "No certificates found",
        ),
        Inspection::directory(
            "Certificate backups",
            root.join("backups").join("certificates"),
            "No certificate backups found",
        ),
        Inspection::command(
            "GPU hardware",
            CommandSpec::new("nvidia-smi").arg("-L"),
            "No NVIDIA GPU detected",
        ),
        Inspection::command(
            "Remote compute nodes",
            kubectl(["get", "nodes", "-l", "type=virtual-kubelet"]),
            "No virtual-kubelet nodes",
        ),
        Inspection::command(
            "VPN control plane",
            kubectl(["get", "pods", "-n", "headscale"]),
            "Headscale not installed",
        ),
        Inspection::command(
            "VPN status",
            CommandSpec::new("tailscale").arg("status"),
            "Tailscale not connected",
        ),
    ]
}
