use serde::{Deserialize, Serialize};

/// Grading of media or sleeve condition, ordered from worst to best.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConditionRank {
    #[default]
    Unknown = 0,
    Generic = 1,
    Poor = 2,
    Fair = 3,
    Good = 4,
    GoodPlus = 5,
    VeryGood = 6,
    VeryGoodPlus = 7,
    NearMint = 8,
    Mint = 9,
}

/// Labels as they appear on marketplace pages, longest first so that a label
/// contained in another ("Good" in "Good Plus", "Mint" in "Near Mint") never
/// shadows it.
pub const CONDITION_LABELS: [(&str, ConditionRank); 9] = [
    ("Very Good Plus", ConditionRank::VeryGoodPlus),
    ("Near Mint", ConditionRank::NearMint),
    ("Very Good", ConditionRank::VeryGood),
    ("Good Plus", ConditionRank::GoodPlus),
    ("Generic", ConditionRank::Generic),
    ("Mint", ConditionRank::Mint),
    ("Poor", ConditionRank::Poor),
    ("Fair", ConditionRank::Fair),
    ("Good", ConditionRank::Good),
];

impl ConditionRank {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        CONDITION_LABELS
            .iter()
            .find(|(_, rank)| *rank == self)
            .map(|(label, _)| *label)
            .unwrap_or("Unknown")
    }

    pub fn from_rank(rank: u8) -> Self {
        CONDITION_LABELS
            .iter()
            .map(|(_, condition)| *condition)
            .find(|condition| condition.rank() == rank)
            .unwrap_or_default()
    }
}

/// A single offer scraped from a release's marketplace page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListedItem {
    pub id: String,
    pub seller: String,
    pub location: String,
    pub price: i64,
    pub media_condition: ConditionRank,
    pub sleeve_condition: ConditionRank,
}
