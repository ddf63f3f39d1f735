//! Plan and actual lines of a resource group.

use quickorder_core::{Entity, EntityId, ModeFlag, Record, Tracked};
use serde::{Deserialize, Serialize};

/// Which line collection of a resource group is addressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    Plan,
    Actual,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Plan => "plan",
            LineKind::Actual => "actual",
        }
    }

    /// Backend column holding the line identifier.
    pub fn id_column(&self) -> &'static str {
        match self {
            LineKind::Plan => "PlanLineUniqueID",
            LineKind::Actual => "ActualLineUniqueID",
        }
    }
}

impl core::fmt::Display for LineKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six sub-records shared by plan and actual lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineDetails {
    #[serde(default)]
    pub wagon_details: Record,
    #[serde(default)]
    pub container_details: Record,
    #[serde(default)]
    pub product_details: Record,
    #[serde(default, rename = "THUDetails")]
    pub thu_details: Record,
    #[serde(default)]
    pub journey_and_scheduling_details: Record,
    #[serde(default)]
    pub other_details: Record,
}

impl LineDetails {
    pub fn sections(&self) -> [(&'static str, &Record); 6] {
        [
            ("WagonDetails", &self.wagon_details),
            ("ContainerDetails", &self.container_details),
            ("ProductDetails", &self.product_details),
            ("THUDetails", &self.thu_details),
            ("JourneyAndSchedulingDetails", &self.journey_and_scheduling_details),
            ("OtherDetails", &self.other_details),
        ]
    }
}

macro_rules! line_entity {
    ($name:ident, $kind:expr, $id_column:literal) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(rename = $id_column, default)]
            pub id: EntityId,
            #[serde(rename = "ModeFlag", default)]
            pub mode_flag: ModeFlag,
            #[serde(flatten)]
            pub details: LineDetails,
            #[serde(flatten)]
            pub extra: Record,
        }

        impl LineEntity for $name {
            const KIND: LineKind = $kind;

            fn staged(details: LineDetails) -> Self {
                Self {
                    id: EntityId::Staged,
                    mode_flag: ModeFlag::Insert,
                    details,
                    extra: Record::new(),
                }
            }

            fn details(&self) -> &LineDetails {
                &self.details
            }

            fn details_mut(&mut self) -> &mut LineDetails {
                &mut self.details
            }
        }

        impl From<&$name> for Line {
            fn from(line: &$name) -> Self {
                line.to_line()
            }
        }

        impl Entity for $name {
            type Id = EntityId;

            fn id(&self) -> &EntityId {
                &self.id
            }
        }

        impl Tracked for $name {
            fn mode_flag(&self) -> ModeFlag {
                self.mode_flag
            }

            fn set_mode_flag(&mut self, flag: ModeFlag) {
                self.mode_flag = flag;
            }
        }
    };
}

line_entity!(PlanDetail, LineKind::Plan, "PlanLineUniqueID");
line_entity!(ActualDetail, LineKind::Actual, "ActualLineUniqueID");

/// Behaviour shared by [`PlanDetail`] and [`ActualDetail`].
pub trait LineEntity: Tracked + Sized {
    const KIND: LineKind;

    fn staged(details: LineDetails) -> Self;

    fn details(&self) -> &LineDetails;

    fn details_mut(&mut self) -> &mut LineDetails;

    fn to_line(&self) -> Line {
        Line {
            kind: Self::KIND,
            id: *self.id(),
            mode_flag: self.mode_flag(),
            details: self.details().clone(),
        }
    }
}

/// Owned view of a line of either kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    pub id: EntityId,
    pub mode_flag: ModeFlag,
    pub details: LineDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_detail_uses_backend_column_names() {
        let plan: PlanDetail = serde_json::from_value(json!({
            "PlanLineUniqueID": 5,
            "ModeFlag": "NoChange",
            "WagonDetails": { "WagonType": "WT1" },
            "THUDetails": { "THUQty": 4 }
        }))
        .unwrap();

        assert_eq!(plan.id, EntityId::Assigned(5));
        assert_eq!(plan.details.wagon_details.get_str("WagonType").as_deref(), Some("WT1"));
        assert_eq!(plan.details.thu_details.get_str("THUQty").as_deref(), Some("4"));
        assert!(plan.details.other_details.is_empty());

        let out = serde_json::to_value(ActualDetail::staged(plan.details)).unwrap();
        assert_eq!(out["ActualLineUniqueID"], json!(-1));
        assert_eq!(out["ModeFlag"], json!("Insert"));
        assert_eq!(out["THUDetails"]["THUQty"], json!(4));
    }
}
