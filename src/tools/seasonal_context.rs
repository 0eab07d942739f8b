use super::traits::{optional_str, Tool, ToolResult};
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Meteorological season in the northern hemisphere.
    pub fn northern(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Autumn,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Winter => Self::Summer,
            Self::Spring => Self::Autumn,
            Self::Summer => Self::Winter,
            Self::Autumn => Self::Spring,
        }
    }

    pub fn for_hemisphere(month: u32, hemisphere: &str) -> Self {
        let season = Self::northern(month);
        if hemisphere.eq_ignore_ascii_case("south") {
            season.flipped()
        } else {
            season
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn/Fall",
        }
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// The sentence the tool returns for a given date.
pub fn describe(date: NaiveDate, hemisphere: &str) -> String {
    let month = date.month();
    let season = Season::for_hemisphere(month, hemisphere);
    format!(
        "Today is {}. The current gardening season is {} ({} Hemisphere). Daylight is {} in the North.",
        date.format("%B %d, %Y"),
        season.label(),
        capitalize(hemisphere),
        if month < 6 { "increasing" } else { "decreasing" }
    )
}

/// Current date and gardening season, for either hemisphere.
pub struct SeasonalContextTool;

#[async_trait]
impl Tool for SeasonalContextTool {
    fn name(&self) -> &str {
        "seasonal_context"
    }

    fn description(&self) -> &str {
        "Provides the current date and the specific gardening season. \
         Can adjust for Northern or Southern Hemispheres."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "hemisphere": {
                    "type": "string",
                    "description": "The hemisphere of the user: 'north' or 'south'. Defaults to 'north'."
                }
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let hemisphere = optional_str(&args, "hemisphere")
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or("north");
        Ok(ToolResult::ok(describe(Local::now().date_naive(), hemisphere)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn northern_seasons_for_every_month() {
        let expected = [
            (1, "Winter"),
            (2, "Winter"),
            (3, "Spring"),
            (4, "Spring"),
            (5, "Spring"),
            (6, "Summer"),
            (7, "Summer"),
            (8, "Summer"),
            (9, "Autumn/Fall"),
            (10, "Autumn/Fall"),
            (11, "Autumn/Fall"),
            (12, "Winter"),
        ];
        for (month, label) in expected {
            assert_eq!(Season::for_hemisphere(month, "north").label(), label, "month {month}");
        }
    }

    #[test]
    fn southern_seasons_for_every_month() {
        let expected = [
            (1, "Summer"),
            (2, "Summer"),
            (3, "Autumn/Fall"),
            (4, "Autumn/Fall"),
            (5, "Autumn/Fall"),
            (6, "Winter"),
            (7, "Winter"),
            (8, "Winter"),
            (9, "Spring"),
            (10, "Spring"),
            (11, "Spring"),
            (12, "Summer"),
        ];
        for (month, label) in expected {
            assert_eq!(Season::for_hemisphere(month, "South").label(), label, "month {month}");
        }
    }

    #[test]
    fn describe_formats_date_and_daylight() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 6).unwrap();
        assert_eq!(
            describe(date, "north"),
            "Today is October 06, 2026. The current gardening season is Autumn/Fall (North Hemisphere). Daylight is decreasing in the North."
        );
        let date = NaiveDate::from_ymd_opt(2026, 3, 21).unwrap();
        assert_eq!(
            describe(date, "SOUTH"),
            "Today is March 21, 2026. The current gardening season is Autumn/Fall (South Hemisphere). Daylight is increasing in the North."
        );
    }

    #[tokio::test]
    async fn defaults_to_north() {
        let result = SeasonalContextTool.execute(json!({})).await.unwrap();
        assert!(result.output.contains("(North Hemisphere)"));
        let result = SeasonalContextTool
            .execute(json!({"hemisphere": null}))
            .await
            .unwrap();
        assert!(result.output.contains("(North Hemisphere)"));
    }
}
