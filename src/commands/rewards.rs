//! Reward catalog commands.

use clap::Subcommand;
use serde::Serialize;

use codequest_rewards::app::default_redeeming_user;
use codequest_rewards::models::reward::{RedeemingUser, Reward, RewardSort, ALL_CATEGORIES};
use codequest_rewards::pages::RewardsPage;
use codequest_rewards::{AppError, Services};

use super::{check_notice, Output};

#[derive(Subcommand)]
pub enum RewardsAction {
    /// List the catalog.
    List {
        /// Category ID, or "all".
        #[arg(long, default_value = ALL_CATEGORIES)]
        category: String,

        #[arg(long)]
        search: Option<String>,

        /// price-low, price-high, popularity or featured.
        #[arg(long, default_value = "featured")]
        sort: String,
    },

    /// List reward categories.
    Categories,

    /// Show past redemptions.
    History,

    /// Redeem a reward.
    Redeem {
        reward_id: String,

        /// Balance to redeem with (defaults to the signed-in user's).
        #[arg(long)]
        points: Option<i64>,
    },
}

pub async fn run(action: RewardsAction, services: &Services, out: &Output) -> Result<(), AppError> {
    match action {
        RewardsAction::List {
            category,
            search,
            sort,
        } => list(services, category, search, &sort, out).await,
        RewardsAction::Categories => {
            let categories = services.rewards.get_reward_categories().await?;
            out.emit(&categories, |categories| {
                categories
                    .iter()
                    .map(|c| format!("{} {:<10} {}", c.icon, c.id, c.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RewardsAction::History => {
            let history = services.rewards.get_redemption_history().await?;
            out.emit(&history, |history| {
                if history.is_empty() {
                    return "No redemptions yet".to_string();
                }
                history
                    .iter()
                    .map(|r| {
                        let scheduled = r
                            .scheduled_for
                            .map(|d| format!(" for {}", d.format("%Y-%m-%d")))
                            .unwrap_or_default();
                        format!(
                            "{}  {:<28} {:>6} pts  {}{}",
                            r.redeem_date.format("%Y-%m-%d"),
                            r.reward_name,
                            r.points_cost,
                            r.status,
                            scheduled
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RewardsAction::Redeem { reward_id, points } => {
            let user = redeeming_user(points);
            let result = services.rewards.redeem_reward(&reward_id, &user).await?;
            out.emit(&result, |r| {
                format!(
                    "Successfully redeemed {}! ({} points, transaction {})",
                    r.redemption.reward_name, r.redemption.points_cost, r.transaction_id
                )
            })
        }
    }
}

fn redeeming_user(points: Option<i64>) -> RedeemingUser {
    let mut user = default_redeeming_user();
    if let Some(points) = points {
        user.points = points;
    }
    user
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry<'a> {
    #[serde(flatten)]
    reward: &'a Reward,
    affordable: bool,
}

async fn list(
    services: &Services,
    category: String,
    search: Option<String>,
    sort: &str,
    out: &Output,
) -> Result<(), AppError> {
    let mut page = RewardsPage::new(services.clone(), default_redeeming_user());
    page.category = category;
    page.search = search.unwrap_or_default();
    page.sort = sort.parse::<RewardSort>().unwrap_or_default();
    page.load().await;
    check_notice(page.notice.as_ref())?;

    let entries: Vec<CatalogEntry<'_>> = page
        .rewards
        .iter()
        .map(|reward| CatalogEntry {
            reward,
            affordable: page.can_afford(reward),
        })
        .collect();

    out.emit(&entries, |entries| {
        let mut text = format!("{} has {} points\n\n", page.user.name, page.user.points);
        for entry in entries {
            let r = entry.reward;
            let featured = if r.featured { "★" } else { " " };
            let stock = if r.in_stock() {
                format!("{} left", r.stock)
            } else {
                "out of stock".to_string()
            };
            let afford = if entry.affordable { "" } else { "  (need more points)" };
            text.push_str(&format!(
                "{} {} {:<8} {:<28} {:>6} pts  {:<10} {}{}\n",
                featured, r.image, r.id, r.name, r.points, r.category, stock, afford
            ));
        }
        text
    })
}
