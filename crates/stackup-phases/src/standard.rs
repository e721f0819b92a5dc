use crate::registry::PhaseSpec;

/// The platform, bottom to top. Reorder only with care: each phase
/// assumes everything above it in this list is in place.
pub(crate) fn standard_phases() -> Vec<PhaseSpec> {
    [
        ("01-prerequisites", "OS packages, kernel modules, sysctl and swap settings"),
        ("02-docker", "Container runtime"),
        ("03-kubernetes", "Single-node cluster control plane and kubeconfig"),
        ("04-networking", "CNI plugin and load-balancer address pool"),
        ("05-storage", "Default storage class and local volume provisioner"),
        ("06-ingress", "Ingress controller"),
        ("07-cert-manager", "Certificate issuer and ACME cluster issuers"),
        ("08-keycloak", "Identity provider and platform realm"),
        ("09-headscale", "VPN mesh control plane"),
        ("10-gpu", "GPU drivers and device plugin when hardware is present"),
        ("11-livekit", "WebRTC media server"),
        ("12-coturn", "TURN relay for media traversal"),
        ("13-applications", "Platform applications and agents"),
        ("14-tooling", "Monitoring dashboards and operator tooling"),
    ]
    .into_iter()
    .map(|(id, description)| PhaseSpec::new(id, description))
    .collect()
}
