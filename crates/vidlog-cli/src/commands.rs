//! Subcommand handlers.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::json;

use vidlog_lib::core::analytics::{AnalyticsReport, VideoFilter};
use vidlog_lib::core::settings::{is_known_theme, AppSettings, KNOWN_THEMES};
use vidlog_lib::core::videos::{VideoDraft, VideoEntry};
use vidlog_lib::core::{format_log_date, ISO_DATE_FORMAT};
use vidlog_lib::VidLog;

use crate::error::CliError;

/// Channels listed in the text stats view.
const TOP_CHANNELS: usize = 10;

/// Width of the widest bar in text charts.
const BAR_WIDTH: usize = 30;

// =============================================================================
// Output
// =============================================================================

pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Video URL
    pub url: String,
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub channel: String,
    /// Release date, YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub release_date: String,
    /// When you watched it, e.g. "2025-01-01 1:00 PM" (default: now)
    #[arg(long)]
    pub log_date: Option<String>,
    /// 0 for unrated, otherwise 0.5 to 5 in half steps
    #[arg(long, default_value_t = 0.0)]
    pub rating: f64,
    #[arg(long)]
    pub rewatched: bool,
    #[arg(long, default_value = "")]
    pub review: String,
    /// Fill empty title, channel and release date from YouTube
    #[arg(long)]
    pub fetch: bool,
}

#[derive(Args, Debug, Default)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub channel: Option<String>,
    #[arg(long)]
    pub release_date: Option<String>,
    #[arg(long)]
    pub log_date: Option<String>,
    #[arg(long)]
    pub rating: Option<f64>,
    /// true or false
    #[arg(long)]
    pub rewatched: Option<String>,
    #[arg(long)]
    pub review: Option<String>,
}

// =============================================================================
// Videos
// =============================================================================

fn filter_from(title: Option<String>, channel: Option<String>) -> VideoFilter {
    VideoFilter {
        title_query: title.unwrap_or_default(),
        channel,
    }
}

pub fn list(
    app: &VidLog,
    out: &Output,
    title: Option<String>,
    channel: Option<String>,
) -> Result<()> {
    let videos = filter_from(title, channel).apply(&app.videos.list()?);
    out.emit(&videos, || {
        if videos.is_empty() {
            return "no videos logged yet".to_string();
        }
        videos.iter().map(entry_line).collect::<Vec<_>>().join("\n")
    })
}

pub fn show(app: &VidLog, out: &Output, id: &str) -> Result<()> {
    let video = app.videos.find_by_id(id)?;
    out.emit(&video, || entry_details(&video))
}

pub async fn add(app: &VidLog, out: &Output, args: AddArgs) -> Result<()> {
    let mut draft = VideoDraft {
        url: args.url,
        title: args.title,
        channel: args.channel,
        release_date: args.release_date,
        log_date: args
            .log_date
            .unwrap_or_else(|| format_log_date(&chrono::Local::now().naive_local())),
        rating: args.rating,
        rewatched: args.rewatched,
        review: args.review,
    };

    if args.fetch {
        let provider = app.metadata_provider()?;
        let metadata = provider
            .lookup(&draft.url)
            .await
            .with_context(|| format!("could not fetch metadata for {}", draft.url))?;
        fill_empty(&mut draft.title, metadata.title);
        fill_empty(&mut draft.channel, metadata.creator);
        fill_empty(&mut draft.release_date, metadata.release_date);
    }

    let stored = app.videos.create(draft)?;
    out.emit(&stored, || format!("logged {}", entry_line(&stored)))
}

fn fill_empty(field: &mut String, value: String) {
    if field.trim().is_empty() {
        *field = value;
    }
}

pub fn edit(app: &VidLog, out: &Output, args: EditArgs) -> Result<()> {
    let current = app.videos.find_by_id(&args.id)?;
    let edited = apply_edit(current, args)?;
    let stored = app.videos.update(edited)?;
    out.emit(&stored, || format!("updated {}", entry_line(&stored)))
}

/// Applies the fields given on the command line to `entry`.
pub fn apply_edit(mut entry: VideoEntry, args: EditArgs) -> Result<VideoEntry, CliError> {
    let EditArgs {
        id: _,
        url,
        title,
        channel,
        release_date,
        log_date,
        rating,
        rewatched,
        review,
    } = args;

    let rewatched = rewatched
        .map(|value| parse_bool("rewatched", &value))
        .transpose()?;

    let mut changed = false;
    let mut set = |field: &mut String, value: Option<String>| {
        if let Some(value) = value {
            *field = value;
            changed = true;
        }
    };
    set(&mut entry.url, url);
    set(&mut entry.title, title);
    set(&mut entry.channel, channel);
    set(&mut entry.release_date, release_date);
    set(&mut entry.log_date, log_date);
    set(&mut entry.review, review);

    if let Some(rating) = rating {
        entry.rating = rating;
        changed = true;
    }
    if let Some(rewatched) = rewatched {
        entry.rewatched = rewatched;
        changed = true;
    }

    if !changed {
        return Err(CliError::EmptyEdit);
    }
    Ok(entry)
}

pub fn delete(app: &VidLog, out: &Output, id: &str) -> Result<()> {
    app.videos.delete(id)?;
    out.emit(&json!({ "deleted": id }), || format!("deleted {id}"))
}

pub fn count(app: &VidLog, out: &Output) -> Result<()> {
    let count = app.videos.count()?;
    out.emit(&json!({ "count": count }), || count.to_string())
}

// =============================================================================
// Stats
// =============================================================================

pub fn stats(
    app: &VidLog,
    out: &Output,
    title: Option<String>,
    channel: Option<String>,
) -> Result<()> {
    let report = app.report(&filter_from(title, channel))?;
    out.emit(&report, || render_report(&report))
}

fn render_report(report: &AnalyticsReport) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        format!("Videos     {} total", summary.total),
        match summary.average_rating {
            Some(avg) => format!("Rating     {avg:.1}/5 ({} rated)", summary.rated),
            None => "Rating     -".to_string(),
        },
        format!("Rewatch    {:.0}%", summary.rewatch_percentage),
        format!("Channels   {} unique", summary.distinct_channels),
        String::new(),
        "Ratings".to_string(),
    ];

    let max_rating = report.ratings.buckets.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in report.ratings.buckets.iter().rev() {
        lines.push(format!(
            "  {:<5} {} {}",
            stars(bucket.rating),
            bar(bucket.count, max_rating),
            bucket.count
        ));
    }
    if report.ratings.unrated > 0 {
        lines.push(format!("  unrated: {}", report.ratings.unrated));
    }

    lines.push(String::new());
    lines.push("Months".to_string());
    let max_month = report.monthly.iter().map(|m| m.count).max().unwrap_or(0);
    for month in &report.monthly {
        lines.push(format!("  {} {} {}", month.month, bar(month.count, max_month), month.count));
    }

    let streaks = &report.streaks;
    lines.push(String::new());
    lines.push("Streaks".to_string());
    lines.push(format!(
        "  current  {} videos over {} days",
        streaks.current.videos, streaks.current.days
    ));
    lines.push(format!(
        "  longest  {} videos over {} days",
        streaks.longest.videos, streaks.longest.days
    ));

    if !report.channels.is_empty() {
        lines.push(String::new());
        lines.push("Top channels".to_string());
        for channel in report.channels.iter().take(TOP_CHANNELS) {
            let avg = channel
                .average()
                .map(|avg| format!("{avg:.1}"))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("  {:<30} {:>4}  {}", channel.channel, channel.count, avg));
        }
    }

    lines.join("\n")
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat((count * BAR_WIDTH).div_ceil(max))
}

/// Five-star rendering with a half star, empty for unrated.
pub fn stars(rating: f64) -> String {
    let mut out = String::new();
    for star in 1..=5 {
        let star = f64::from(star);
        if rating >= star {
            out.push('★');
        } else if rating >= star - 0.5 {
            out.push('½');
        }
    }
    out
}

fn entry_line(video: &VideoEntry) -> String {
    let channel = if video.channel.is_empty() {
        String::new()
    } else {
        format!(" ({})", video.channel)
    };
    format!(
        "{}  {:<19}  {:<5}  {}{}",
        video.id,
        video.log_date,
        stars(video.rating),
        video.title,
        channel
    )
}

fn entry_details(video: &VideoEntry) -> String {
    let mut lines = vec![
        format!("id           {}", video.id),
        format!("title        {}", video.title),
        format!("channel      {}", video.channel),
        format!("url          {}", video.url),
        format!("released     {}", video.release_date),
        format!("watched      {}", video.log_date),
        format!("rating       {}", stars(video.rating)),
        format!("rewatched    {}", if video.rewatched { "yes" } else { "no" }),
        format!(
            "logged at    {}",
            video.created_at.with_timezone(&chrono::Local).format(ISO_DATE_FORMAT)
        ),
    ];
    if !video.review.is_empty() {
        lines.push(String::new());
        lines.push(video.review.clone());
    }
    lines.join("\n")
}

// =============================================================================
// Settings
// =============================================================================

/// Settings with the API key masked, for display.
fn masked(settings: &AppSettings) -> AppSettings {
    let mut shown = settings.clone();
    if !shown.api_key.is_empty() {
        shown.api_key = "********".to_string();
    }
    shown
}

pub fn settings_show(app: &VidLog, out: &Output) -> Result<()> {
    let shown = masked(app.settings());
    out.emit(&shown, || {
        [
            format!("vim_motions  {}", shown.vim_motions),
            format!("theme        {}", shown.theme),
            format!("api_key      {}", shown.api_key),
            format!("backup_repo  {}", shown.backup_repo),
            format!("auto_sync    {}", shown.auto_sync),
        ]
        .join("\n")
    })
}

pub fn settings_set(app: &mut VidLog, out: &Output, key: &str, value: &str) -> Result<()> {
    let mut settings = app.settings().clone();
    apply_setting(&mut settings, key, value)?;
    app.save_settings(settings)?;
    out.emit(&masked(app.settings()), || format!("{key} updated"))
}

/// Sets one field by its on-disk name.
pub fn apply_setting(settings: &mut AppSettings, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "vim_motions" => settings.vim_motions = parse_bool(key, value)?,
        "auto_sync" => settings.auto_sync = parse_bool(key, value)?,
        "theme" => {
            let theme = value.trim().to_ascii_lowercase();
            if !is_known_theme(&theme) {
                return Err(CliError::UnknownTheme {
                    theme,
                    known: KNOWN_THEMES.join(", "),
                });
            }
            settings.theme = theme;
        }
        "api_key" => settings.api_key = value.trim().to_string(),
        "backup_repo" => settings.backup_repo = value.trim().to_string(),
        other => return Err(CliError::UnknownSetting(other.to_string())),
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CliError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Metadata / Paths
// =============================================================================

pub async fn fetch(app: &VidLog, out: &Output, url: &str) -> Result<()> {
    let provider = app.metadata_provider()?;
    let metadata = provider.lookup(url).await?;
    out.emit(&metadata, || {
        format!(
            "title     {}\nchannel   {}\nreleased  {}",
            metadata.title, metadata.creator, metadata.release_date
        )
    })
}

pub fn path(app: &VidLog, out: &Output) -> Result<()> {
    let store = app.store();
    out.emit(
        &json!({
            "data_dir": store.root(),
            "videos": store.videos_path(),
            "settings": store.settings_path(),
            "logs": store.logs_dir(),
        }),
        || store.root().display().to_string(),
    )
}
