/// Naming configuration for a Scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    /// Appended to a resource ID to form its instance ID (`Car` -> `Car_instance`)
    pub instance_suffix: String,
    /// Appended to a component ID to form the ID of a per-spawn clone
    pub clone_suffix: String,
}

impl SceneConfig {
    /// Instance ID base for a resource ID
    pub fn instance_id(&self, resource_id: &str) -> String {
        format!("{}{}", resource_id, self.instance_suffix)
    }

    /// Clone ID base for a component ID
    pub fn clone_id(&self, component_id: &str) -> String {
        format!("{}{}", component_id, self.clone_suffix)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            instance_suffix: "_instance".to_string(),
            clone_suffix: "_instanceproperties".to_string(),
        }
    }
}
