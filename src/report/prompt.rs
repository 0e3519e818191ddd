//! Prompt construction for weekly temperature reports.

use crate::kline::{Mode, SeriesSummary};

/// System and user messages for one report request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPrompt {
    pub system: String,
    pub user: String,
}

/// Builds the prompt for `city_name` from the mode's summary.
///
/// The year is taken from the first candle's date and stated explicitly so the
/// report never says "this year".
pub fn build_prompt(city_name: &str, mode: Mode, summary: &SeriesSummary) -> ReportPrompt {
    let year = summary
        .year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "the recorded year".to_string());

    ReportPrompt {
        system: system_prompt(&year),
        user: user_content(city_name, mode, summary, &year),
    }
}

fn system_prompt(year: &str) -> String {
    format!(
        "You are a data analyst and weather writer whose posts travel well on social media. \
Write a weather report based on the {year} weekly temperature candlestick data below.

Important:
- The data covers the full year {year}.
- Name \"{year}\" explicitly; never write \"this year\".
- The report is a retrospective of {year}.

Output format, in this order:
1. First, 3-5 keywords as a JSON array on its own line, each one to three words, \
capturing the city's {year} weather, e.g. [\"big swings\", \"four seasons\", \"layer up\"]
2. Then the full report.

Report (300-400 words):
- A catchy title (mentioning {year})
- One opening line that creates curiosity
- 2-3 data highlights with emoji, naming {year}
- How the weather connected to readers' daily lives
- One question to invite discussion
- 2-3 hashtags

Address the reader as \"you\", keep sentences short and turn numbers into stories. \
Keep it brief.

Data for {year} follows:"
    )
}

fn user_content(city_name: &str, mode: Mode, summary: &SeriesSummary, year: &str) -> String {
    let info = mode.info();
    let unit = info.unit;

    format!(
        "📍 City: {city}
📊 Mode: {label} ({meaning})
📅 Period: {year} {start} to {end}
⏱️ Total weeks: {total}

📈 {year} key figures:
• Up weeks: {up}
• Down weeks: {down}
• Average change: {avg:.2}{unit}
• Highest point: {high:.2}{unit}
• Lowest point: {low:.2}{unit}
• Spread: {spread:.2}{unit}

🎯 Focus: {analysis}

Output the 3-5 keywords as a JSON array first, then write the {year} weather retrospective \
for this {label} data.",
        city = city_name,
        label = info.label,
        meaning = info.meaning,
        start = summary.date_range.start,
        end = summary.date_range.end,
        total = summary.total_weeks,
        up = summary.up_weeks,
        down = summary.down_weeks,
        avg = summary.avg_change,
        high = summary.max_high,
        low = summary.min_low,
        spread = summary.spread(),
        analysis = info.analysis,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kline::summary::DateRange;

    fn summary() -> SeriesSummary {
        SeriesSummary {
            up_weeks: 27,
            down_weeks: 24,
            avg_change: 0.125,
            max_high: 39.0,
            min_low: -12.5,
            total_weeks: 53,
            date_range: DateRange {
                start: "2025-01-01".to_string(),
                end: "2025-12-28".to_string(),
            },
        }
    }

    #[test]
    fn test_user_content_figures() {
        let prompt = build_prompt("北京", Mode::Original, &summary());
        assert!(prompt.user.contains("City: 北京"));
        assert!(prompt.user.contains("Mode: Raw temperature"));
        assert!(prompt.user.contains("2025 2025-01-01 to 2025-12-28"));
        assert!(prompt.user.contains("Total weeks: 53"));
        assert!(prompt.user.contains("Up weeks: 27"));
        assert!(prompt.user.contains("Highest point: 39.00°C"));
        assert!(prompt.user.contains("Lowest point: -12.50°C"));
        assert!(prompt.user.contains("Spread: 51.50°C"));
    }

    #[test]
    fn test_unit_follows_mode() {
        let prompt = build_prompt("Wuhan", Mode::WeekChange, &summary());
        assert!(prompt.user.contains("Highest point: 39.00%"));
        assert!(prompt.user.contains(Mode::WeekChange.info().analysis));
    }

    #[test]
    fn test_system_prompt_names_year() {
        let prompt = build_prompt("Wuhan", Mode::Range, &summary());
        assert!(prompt.system.contains("full year 2025"));
        assert!(!prompt.system.contains("{year}"));
    }
}
