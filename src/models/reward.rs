//! Reward catalog and redemption models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Popularity tier of a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Popularity {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl Popularity {
    /// Sort rank: higher is more popular.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
        }
    }
}

impl std::fmt::Display for Popularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::VeryHigh => write!(f, "very high"),
        }
    }
}

/// A redeemable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: String,

    /// Point cost.
    pub points: i64,

    /// Category ID (`hardware`, `digital`, ...).
    pub category: String,

    pub image: String,
    pub stock: i64,
    pub popularity: Popularity,
    pub featured: bool,
}

impl Reward {
    /// Case-insensitive substring match on name or description.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Reward category used for filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardCategory {
    pub id: String,
    pub name: String,
    pub icon: String,
}

/// Category ID that matches every reward.
pub const ALL_CATEGORIES: &str = "all";

/// Sort policy for the reward catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum RewardSort {
    PriceLow,
    PriceHigh,
    Popularity,
    #[default]
    Featured,
}

impl FromStr for RewardSort {
    type Err = std::convert::Infallible;

    /// Unknown sort keys fall back to `featured`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "popularity" => Self::Popularity,
            _ => Self::Featured,
        })
    }
}

impl From<String> for RewardSort {
    fn from(key: String) -> Self {
        match key.parse() {
            Ok(sort) => sort,
            Err(never) => match never {},
        }
    }
}

impl std::fmt::Display for RewardSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceLow => write!(f, "price-low"),
            Self::PriceHigh => write!(f, "price-high"),
            Self::Popularity => write!(f, "popularity"),
            Self::Featured => write!(f, "featured"),
        }
    }
}

/// Filters accepted by the reward catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardFilters {
    /// Category ID; `all` or `None` passes everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// Catalog order is kept when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<RewardSort>,
}

/// Lifecycle of a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Scheduled,
    Delivered,
}

impl std::fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Scheduled => write!(f, "scheduled"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

/// Entry in the redemption history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub id: String,
    pub reward_id: String,
    pub reward_name: String,
    pub points_cost: i64,
    pub redeem_date: DateTime<Utc>,
    pub status: RedemptionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Redeeming user's balance as seen by the rewards page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemingUser {
    pub name: String,
    pub level: u32,
    pub points: i64,
}

/// Result of redeeming a reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResult {
    pub success: bool,
    pub transaction_id: String,
    pub redemption: RedemptionRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_key_deserializes_as_featured() {
        let sort: RewardSort = serde_json::from_str("\"price-low\"").unwrap();
        assert_eq!(sort, RewardSort::PriceLow);

        let filters: RewardFilters =
            serde_json::from_str(r#"{"category":"digital","sortBy":"trending"}"#).unwrap();
        assert_eq!(filters.sort_by, Some(RewardSort::Featured));
        assert_eq!(
            serde_json::to_string(&RewardSort::PriceHigh).unwrap(),
            "\"price-high\""
        );
    }

    #[test]
    fn test_popularity_serde() {
        let json = serde_json::to_string(&Popularity::VeryHigh).unwrap();
        assert_eq!(json, "\"very high\"");
        let parsed: Popularity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Popularity::Medium);
    }

    #[test]
    fn test_popularity_rank_order() {
        assert!(Popularity::VeryHigh.rank() > Popularity::High.rank());
        assert!(Popularity::High.rank() > Popularity::Medium.rank());
        assert!(Popularity::Medium.rank() > Popularity::Low.rank());
    }

    #[test]
    fn test_sort_from_str_defaults_to_featured() {
        assert_eq!("price-low".parse::<RewardSort>().unwrap(), RewardSort::PriceLow);
        assert_eq!("PRICE-HIGH".parse::<RewardSort>().unwrap(), RewardSort::PriceHigh);
        assert_eq!("newest".parse::<RewardSort>().unwrap(), RewardSort::Featured);
        assert_eq!(RewardSort::default(), RewardSort::Featured);
    }

    #[test]
    fn test_sort_serde_kebab() {
        let json = serde_json::to_string(&RewardSort::PriceLow).unwrap();
        assert_eq!(json, "\"price-low\"");
    }
}
