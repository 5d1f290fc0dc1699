use crate::enhancement::Enhancement;
use crate::sop::SopInfo;
use crate::step::{self, Step};
use serde::{Deserialize, Serialize};

/// One checklist: header record, ordered steps, enhancement log. This triple
/// is the unit of persistence and of import/export. Instances are plain
/// values owned by the caller; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistInstance {
    #[serde(rename = "sopInfo")]
    pub sop_info: SopInfo,
    pub steps: Vec<Step>,
    pub enhancements: Vec<Enhancement>,
}

impl ChecklistInstance {
    pub fn new(sop_info: SopInfo) -> Self {
        Self {
            sop_info,
            steps: Vec::new(),
            enhancements: Vec::new(),
        }
    }

    /// Re-derive step `order` from array position. Called after every
    /// structural mutation and after load/import.
    pub fn normalize(&mut self) {
        step::normalize_orders(&mut self.steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::add_step;

    #[test]
    fn serializes_with_external_schema_keys() {
        let mut instance = ChecklistInstance::new(SopInfo::default());
        add_step(&mut instance.steps, "Build", "run build.sh", "").unwrap();

        let json = serde_json::to_value(&instance).unwrap();
        assert!(json.get("sopInfo").is_some());
        assert!(json.get("steps").is_some());
        assert!(json.get("enhancements").is_some());
    }

    #[test]
    fn normalize_repairs_orders_from_foreign_input() {
        let mut instance: ChecklistInstance = serde_json::from_str(
            r#"{"steps": [
                {"id": "x", "order": 9, "title": "a"},
                {"id": "y", "order": 9, "title": "b"}
            ]}"#,
        )
        .unwrap();
        instance.normalize();
        assert_eq!(instance.steps[0].order, 1);
        assert_eq!(instance.steps[1].order, 2);
    }
}
