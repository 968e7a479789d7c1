use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(LabFlag {
    High => "high",
    Low => "low",
    Normal => "normal",
});

str_enum!(FindingSeverity {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(CompletionStatus {
    Complete => "complete",
    Partial => "partial",
    Failed => "failed",
});

str_enum!(TimelineEventType {
    Report => "report",
    Note => "note",
});

// Tiers used when highlighting analyses on a patient summary.
str_enum!(CriticalSeverity {
    Critical => "critical",
    High => "high",
    Moderate => "moderate",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn lab_flag_round_trips_through_str() {
        for flag in [LabFlag::High, LabFlag::Low, LabFlag::Normal] {
            assert_eq!(LabFlag::from_str(flag.as_str()).unwrap(), flag);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = CompletionStatus::from_str("done").unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidEnum { ref field, ref value }
                if field == "CompletionStatus" && value == "done"
        ));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&FindingSeverity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let back: CriticalSeverity = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(back, CriticalSeverity::Moderate);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(TimelineEventType::Report.to_string(), "report");
    }
}
