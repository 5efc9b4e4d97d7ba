use serde::{Deserialize, Serialize};

/// Company-wide headcount pool shared by every project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub total_devops: u32,
    #[serde(default)]
    pub total_engineers: u32,
}

/// Partial settings update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub total_devops: Option<u32>,
    #[serde(default)]
    pub total_engineers: Option<u32>,
}

impl Settings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(devops) = patch.total_devops {
            self.total_devops = devops;
        }
        if let Some(engineers) = patch.total_engineers {
            self.total_engineers = engineers;
        }
    }
}
