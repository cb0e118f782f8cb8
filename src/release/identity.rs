use crate::foundation::core::Labels;
use crate::module::model::ModuleMetadata;
use uuid::Uuid;

/// Namespace key for release identities. Changing it changes every release UUID.
const RELEASE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b4e_8a7d_4c3e_9b21_5d0e_7f3a_91c4);

/// Label carrying the tool that rendered a resource.
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
/// Label carrying the module name.
pub const LABEL_MODULE_NAME: &str = "module.platen.dev/name";
/// Label carrying the module version.
pub const LABEL_MODULE_VERSION: &str = "module.platen.dev/version";
/// Label carrying the release name.
pub const LABEL_RELEASE_NAME: &str = "release.platen.dev/name";
/// Label carrying the release UUID.
pub const LABEL_RELEASE_UUID: &str = "release.platen.dev/uuid";

/// Deterministic release identity: UUID v5 over the length-delimited
/// `(module fqn, release name, namespace)` triple.
pub fn release_uuid(module_fqn: &str, release_name: &str, namespace: &str) -> Uuid {
    let mut key = Vec::with_capacity(24 + module_fqn.len() + release_name.len() + namespace.len());
    for part in [module_fqn, release_name, namespace] {
        key.extend_from_slice(&(part.len() as u64).to_le_bytes());
        key.extend_from_slice(part.as_bytes());
    }
    Uuid::new_v5(&RELEASE_NAMESPACE, &key)
}

pub(crate) fn release_labels(module: &ModuleMetadata, release_name: &str, uuid: Uuid) -> Labels {
    let mut labels = Labels::new();
    labels.insert(LABEL_MANAGED_BY.to_string(), "platen".to_string());
    labels.insert(LABEL_MODULE_NAME.to_string(), module.name.clone());
    labels.insert(LABEL_MODULE_VERSION.to_string(), module.version.clone());
    labels.insert(LABEL_RELEASE_NAME.to_string(), release_name.to_string());
    labels.insert(LABEL_RELEASE_UUID.to_string(), uuid.to_string());
    labels
}

#[cfg(test)]
#[path = "../../tests/unit/release/identity.rs"]
mod tests;
