//! guildpulse - Guild activity report CLI
//!
//! Prints the activity report for one guild, read from the aggregate store
//! maintained by the bot's ingestion pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::{Parser, ValueEnum};
use guildpulse_core::analytics::{LatencySummary, TemporalStats};
use guildpulse_core::{get_activity_report, ActivityReport, AggregateStore, Config};

#[derive(Parser, Debug)]
#[command(name = "guildpulse")]
#[command(about = "Activity analytics for a chat guild")]
#[command(version)]
struct Args {
    /// Guild to report on
    guild_id: i64,

    /// Lookback window in days (default: report.default_window_days)
    #[arg(long, allow_negative_numbers = true)]
    days: Option<i64>,

    /// Aggregate store path (overrides GUILDPULSE_DB_PATH and config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = guildpulse_core::logging::init(&config.logging).ok();

    let store = match &args.db {
        Some(path) => AggregateStore::new(path).with_query_timeout(config.store.query_timeout()),
        None => AggregateStore::from_config(&config),
    };
    let days = args.days.unwrap_or(config.report.default_window_days);

    tracing::info!(
        guild_id = args.guild_id,
        days,
        store = %store.path().display(),
        "Generating activity report"
    );

    let report = get_activity_report(&store, args.guild_id, days)
        .with_context(|| format!("failed to build activity report for guild {}", args.guild_id))?;

    match args.format {
        Format::Json => print_json(&report)?,
        Format::Text => print_terminal(&report, args.guild_id, days),
    }

    Ok(())
}

fn print_json(report: &ActivityReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn print_terminal(report: &ActivityReport, guild_id: i64, days: i64) {
    println!();
    println!("Activity report for guild {}", guild_id);
    println!(
        "   {} .. {} ({} days)",
        report.range.start_hour_key(),
        report.range.end_hour_key(),
        days
    );
    println!();

    let content = &report.content;
    if content.total_messages == 0 {
        println!("  No activity found for this window.");
        println!();
        return;
    }

    println!("MESSAGES");
    println!(
        "   Total messages: {:<10} Words: {:<10} URL rate: {:.1}%",
        content.total_messages,
        content.total_words,
        content.url_rate * 100.0
    );
    println!(
        "   Words/msg:      mean {:.2}, median {:.2}",
        content.words_per_msg_mean, content.words_per_msg_median
    );
    let basic = &report.basic;
    println!(
        "   Per user:       min {}, max {}, mean {:.2}, std {:.2}, gini {}",
        basic.min,
        basic.max,
        basic.mean,
        basic.std,
        fmt_opt(basic.gini, 3)
    );
    println!();

    print_temporal(&report.temporal);

    println!("LATENCY");
    println!("   Global:  {}", fmt_latency(&report.latency.global));
    for channel in &report.latency.channels {
        println!("   #{}: {}", channel.channel_id, fmt_latency(&channel.summary));
    }
    println!();

    let sentiment = &content.sentiment;
    println!("SENTIMENT");
    println!(
        "   Coverage: {:.1}%   Mean: {}   Median: {}",
        sentiment.coverage * 100.0,
        fmt_opt(sentiment.compound_mean, 3),
        fmt_opt(sentiment.compound_median, 3)
    );
    println!();

    if let Some(reactions) = &report.reactions {
        println!("REACTIONS");
        println!("   By count:     {:?}", reactions.count);
        println!("   By diversity: {:?}", reactions.diversity);
        println!();
    }

    if let Some(threads) = &report.threads {
        println!("THREADS");
        println!(
            "   Threads: {:<8} Messages: {:<8} Max depth: {}",
            threads.n_threads,
            threads.messages_total,
            threads.depth_max.map_or_else(|| "n/a".to_string(), |d| d.to_string())
        );
        println!(
            "   Lifespan: median {}s, p95 {}s",
            fmt_opt(threads.lifespan_median_s, 0),
            fmt_opt(threads.lifespan_p95_s, 0)
        );
        println!();
    }
}

fn print_temporal(temporal: &TemporalStats) {
    println!("TIMING");

    let busiest = temporal
        .heatmap_avg_per_hour
        .iter()
        .enumerate()
        .flat_map(|(day, row)| row.iter().enumerate().map(move |(hour, &avg)| (day, hour, avg)))
        .filter(|&(_, _, avg)| avg > 0.0)
        .max_by(|a, b| a.2.total_cmp(&b.2));
    match busiest {
        Some((day, hour, avg)) => {
            let weekday = Weekday::try_from(day as u8).unwrap_or(Weekday::Mon);
            println!("   Busiest slot:  {} {:02}:00 ({:.1} msgs/h)", weekday, hour, avg);
        }
        None => println!("   Busiest slot:  none"),
    }

    if let Some((hour, std)) = temporal
        .burst_std_24h
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .filter(|(_, std)| **std > 0.0)
    {
        println!("   Peak burst:    std {:.2} at {}", std, hour);
    }
    println!("   Silent hours:  {:.1}%", temporal.silence_ratio * 100.0);
    println!();
}

fn fmt_latency(summary: &LatencySummary) -> String {
    format!(
        "median {} ms, p95 {} ms ({} samples)",
        fmt_opt(summary.median_ms, 0),
        fmt_opt(summary.p95_ms, 0),
        summary.n
    )
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}
