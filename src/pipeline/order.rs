use crate::execute::resource::Resource;

/// Weight for kinds without an entry in the table.
pub const DEFAULT_WEIGHT: i32 = 100;

/// Apply-order weight of a resource kind (lower renders first).
///
/// Definitions and namespaces come first so later objects can reference them; identity, RBAC
/// and configuration precede the policies and services workloads depend on; autoscalers,
/// ingress and admission webhooks come last.
pub fn kind_weight(kind: &str) -> i32 {
    match kind {
        "CustomResourceDefinition" => -100,
        "Namespace" => 0,
        "ResourceQuota" | "LimitRange" | "PriorityClass" => 5,
        "ServiceAccount" => 10,
        "ClusterRole" | "Role" => 15,
        "ClusterRoleBinding" | "RoleBinding" => 20,
        "Secret" | "ConfigMap" => 25,
        "StorageClass" | "PersistentVolume" | "PersistentVolumeClaim" => 30,
        "NetworkPolicy"
        | "PeerAuthentication"
        | "AuthorizationPolicy"
        | "CiliumNetworkPolicy"
        | "CiliumClusterwideNetworkPolicy" => 35,
        "Service" => 40,
        "Pod" | "ReplicaSet" | "Deployment" | "StatefulSet" | "DaemonSet" => 50,
        "Job" | "CronJob" => 55,
        "HorizontalPodAutoscaler" | "PodDisruptionBudget" | "ScaledObject" => 60,
        "Ingress" | "IngressClass" | "Gateway" | "HTTPRoute" | "GRPCRoute" => 70,
        "MutatingWebhookConfiguration" | "ValidatingWebhookConfiguration" => 500,
        _ => DEFAULT_WEIGHT,
    }
}

/// Sort by `(weight, group, kind, namespace, name)`, stable on ties.
pub fn sort_resources_by<W>(resources: &mut [Resource], weight: W)
where
    W: Fn(&Resource) -> i32,
{
    resources.sort_by(|a, b| {
        (weight(a), a.group(), a.kind(), a.namespace(), a.name()).cmp(&(
            weight(b),
            b.group(),
            b.kind(),
            b.namespace(),
            b.name(),
        ))
    });
}

/// Sort into the canonical render order using [`kind_weight`].
pub fn sort_resources(resources: &mut [Resource]) {
    sort_resources_by(resources, |r| kind_weight(r.kind()));
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/order.rs"]
mod tests;
