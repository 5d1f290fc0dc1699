use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SopInfo
// ---------------------------------------------------------------------------

/// Header record for one checklist instance. `id` doubles as the persistence
/// namespace key; everything else is a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SopInfo {
    pub name: String,
    pub id: String,
    pub entity: String,
    pub repo: String,
    pub web_root: String,
    pub run_label: String,
    /// Templated path; may carry a `<SOP_ID>` token resolved at render time.
    pub img_folder: String,
    pub template_tag: String,
}

impl Default for SopInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            id: String::new(),
            entity: String::new(),
            repo: "/workspaces/SOP_Build".to_string(),
            web_root: "/SOP_Stage".to_string(),
            run_label: String::new(),
            img_folder: "../outputs/images/<SOP_ID>".to_string(),
            template_tag: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SopPatch
// ---------------------------------------------------------------------------

/// Field-wise update for [`SopInfo`]. `None` keeps the prior value, so a
/// caller only names the fields it is changing.
#[derive(Debug, Clone, Default)]
pub struct SopPatch {
    pub name: Option<String>,
    pub id: Option<String>,
    pub entity: Option<String>,
    pub repo: Option<String>,
    pub web_root: Option<String>,
    pub run_label: Option<String>,
    pub img_folder: Option<String>,
    pub template_tag: Option<String>,
}

impl SopPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.id.is_none()
            && self.entity.is_none()
            && self.repo.is_none()
            && self.web_root.is_none()
            && self.run_label.is_none()
            && self.img_folder.is_none()
            && self.template_tag.is_none()
    }
}

impl SopInfo {
    /// Apply a patch in place. The only sanctioned mutation path for the
    /// header record.
    pub fn apply(&mut self, patch: &SopPatch) {
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = &patch.id {
            self.id = v.clone();
        }
        if let Some(v) = &patch.entity {
            self.entity = v.clone();
        }
        if let Some(v) = &patch.repo {
            self.repo = v.clone();
        }
        if let Some(v) = &patch.web_root {
            self.web_root = v.clone();
        }
        if let Some(v) = &patch.run_label {
            self.run_label = v.clone();
        }
        if let Some(v) = &patch.img_folder {
            self.img_folder = v.clone();
        }
        if let Some(v) = &patch.template_tag {
            self.template_tag = v.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_builder_paths() {
        let sop = SopInfo::default();
        assert_eq!(sop.repo, "/workspaces/SOP_Build");
        assert_eq!(sop.web_root, "/SOP_Stage");
        assert_eq!(sop.img_folder, "../outputs/images/<SOP_ID>");
        assert!(sop.id.is_empty());
    }

    #[test]
    fn apply_patch_updates_only_named_fields() {
        let mut sop = SopInfo::default();
        sop.apply(&SopPatch {
            name: Some("Publish SOP".to_string()),
            id: Some("ACME-001".to_string()),
            ..Default::default()
        });
        assert_eq!(sop.name, "Publish SOP");
        assert_eq!(sop.id, "ACME-001");
        assert_eq!(sop.repo, "/workspaces/SOP_Build");
    }

    #[test]
    fn serde_uses_camel_case_keys() {
        let json = serde_json::to_value(SopInfo::default()).unwrap();
        assert!(json.get("webRoot").is_some());
        assert!(json.get("imgFolder").is_some());
        assert!(json.get("templateTag").is_some());
        assert!(json.get("runLabel").is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let sop: SopInfo = serde_json::from_str(r#"{"id": "X-9"}"#).unwrap();
        assert_eq!(sop.id, "X-9");
        assert_eq!(sop.repo, "/workspaces/SOP_Build");
    }
}
