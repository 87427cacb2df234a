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

str_enum!(ConversationState {
    Started => "started",
    AwaitingChestClarification => "awaiting_chest_clarification",
    AwaitingMalariaClarification => "awaiting_malaria_clarification",
    AwaitingDiabetesClarification => "awaiting_diabetes_clarification",
    AwaitingHeadacheClarification => "awaiting_headache_clarification",
    AwaitingFeverClarification => "awaiting_fever_clarification",
    Active => "active",
    Diagnosed => "diagnosed",
});

impl ConversationState {
    /// True while a clarifying question is waiting for its answer.
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            Self::AwaitingChestClarification
                | Self::AwaitingMalariaClarification
                | Self::AwaitingDiabetesClarification
                | Self::AwaitingHeadacheClarification
                | Self::AwaitingFeverClarification
        )
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Started
    }
}

str_enum!(SeverityTier {
    Critical => "critical",
    Routine => "routine",
});

str_enum!(PredictionSource {
    CriticalRule => "critical_rule",
    Classifier => "classifier",
    SafetyOverride => "safety_override",
});

str_enum!(MessageSender {
    User => "user",
    Bot => "bot",
});
