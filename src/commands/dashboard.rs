//! Home, leaderboard and profile views.

use chrono::Utc;
use serde::Serialize;

use codequest_rewards::models::leaderboard::{Season, UserRanking};
use codequest_rewards::models::user::{Activity, ActivityType, Badge, UserProfile};
use codequest_rewards::pages::home::{DESCRIPTION, SUBTITLE, TITLE};
use codequest_rewards::pages::leaderboard::LeaderboardRow;
use codequest_rewards::pages::{HomePage, LeaderboardPage, LeaderboardTab, ProfilePage};
use codequest_rewards::{AppError, Services};

use super::{check_notice, Output};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HomeView<'a> {
    title: &'static str,
    subtitle: &'static str,
    user: Option<&'a UserProfile>,
    ranking: Option<&'a UserRanking>,
    quick_stats: Vec<(&'static str, String)>,
}

pub async fn home(services: &Services, out: &Output) -> Result<(), AppError> {
    let mut page = HomePage::new(services.clone(), &mut rand::thread_rng());
    page.load().await;
    check_notice(page.notice.as_ref())?;

    let view = HomeView {
        title: TITLE,
        subtitle: SUBTITLE,
        user: page.user.as_ref(),
        ranking: page.ranking.as_ref(),
        quick_stats: page.quick_stats(),
    };
    out.emit(&view, |view| {
        let mut text = format!("🔥 {} - {}\n\n{}\n", view.title, view.subtitle, DESCRIPTION);
        if let Some(user) = view.user {
            text.push_str(&format!(
                "\nWelcome back, {} {} (level {})\n",
                user.avatar, user.name, user.level
            ));
        }
        for (label, value) in &view.quick_stats {
            text.push_str(&format!("  {:<7} {}\n", label, value));
        }
        text
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardView<'a> {
    tab: LeaderboardTab,
    season: Option<&'a Season>,
    days_left: Option<i64>,
    ranking: Option<&'a UserRanking>,
    rows: Vec<LeaderboardRow>,
}

pub async fn leaderboard(
    services: &Services,
    earners: bool,
    limit: Option<usize>,
    out: &Output,
) -> Result<(), AppError> {
    let mut page = LeaderboardPage::new(services.clone());
    page.options.limit = limit;
    page.load().await;
    check_notice(page.notice.as_ref())?;
    if earners {
        page.set_tab(LeaderboardTab::Earners);
    }

    let view = LeaderboardView {
        tab: page.tab,
        season: page.season.as_ref(),
        days_left: page.days_left(Utc::now()),
        ranking: page.ranking.as_ref(),
        rows: page.rows(),
    };
    out.emit(&view, |view| {
        let mut text = String::new();
        if let (Some(season), Some(days)) = (view.season, view.days_left) {
            text.push_str(&format!("{} ({} days left)\n\n", season.name, days));
        }
        let (score, count) = match view.tab {
            LeaderboardTab::Reviewers => ("points", "quests"),
            LeaderboardTab::Earners => ("rewards", "achievements"),
        };
        for row in &view.rows {
            let marker = if row.crown {
                "👑"
            } else if row.top_rank {
                "★"
            } else {
                " "
            };
            text.push_str(&format!(
                "{} #{:<3} {} {:<16} {:>7} {}  {:>3} {}\n",
                marker, row.rank, row.avatar, row.name, row.score, score, row.count, count
            ));
        }
        if let Some(ranking) = view.ranking {
            text.push_str(&format!(
                "\nYour rank: #{} (top {}%, {} of {})",
                ranking.rank, ranking.percentile, ranking.position, ranking.total
            ));
        }
        text
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView<'a> {
    user: Option<&'a UserProfile>,
    xp_progress_percent: u32,
    unlocked_badges: usize,
    badges: &'a [Badge],
    activity: &'a [Activity],
}

pub async fn profile(
    services: &Services,
    activity: Option<&str>,
    out: &Output,
) -> Result<(), AppError> {
    let mut page = ProfilePage::new(services.clone());
    page.activity_filter = activity.map(str::parse::<ActivityType>).transpose()?;
    page.load().await;
    check_notice(page.notice.as_ref())?;

    let view = ProfileView {
        user: page.user.as_ref(),
        xp_progress_percent: page.xp_progress_percent(),
        unlocked_badges: page.unlocked_badges(),
        badges: &page.badges,
        activity: &page.activity,
    };
    out.emit(&view, |view| {
        let mut text = String::new();
        if let Some(user) = view.user {
            text.push_str(&format!(
                "{} {} - {}\nLevel {}  XP {}/{} ({}%)\nJoined {}\n",
                user.avatar,
                user.name,
                user.title,
                user.level,
                user.xp,
                user.xp_to_next_level,
                view.xp_progress_percent,
                user.join_date
            ));
            text.push_str(&format!(
                "Points {}  Quests {}  Reviews {}  Badges {}\n",
                user.stats.points, user.stats.quests, user.stats.reviews, user.stats.badges
            ));
        }
        text.push_str(&format!(
            "\nAchievements ({}/{} unlocked)\n",
            view.unlocked_badges,
            view.badges.len()
        ));
        for badge in view.badges {
            let lock = if badge.unlocked { " " } else { "🔒" };
            text.push_str(&format!("  {}{} {} - {}\n", lock, badge.icon, badge.name, badge.description));
        }
        text.push_str("\nRecent activity\n");
        for entry in view.activity {
            let points = entry.points.map(|p| format!(" (+{})", p)).unwrap_or_default();
            text.push_str(&format!(
                "  {} {}{}  {}\n",
                entry.icon, entry.description, points, entry.date
            ));
        }
        text
    })
}
