//! Five-field cron expressions: `minute hour day-of-month month day-of-week`.

use super::ToolError;
use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
const MONTH_LABELS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const DAY_LABELS: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::Minute,
        Field::Hour,
        Field::DayOfMonth,
        Field::Month,
        Field::DayOfWeek,
    ];

    fn bounds(self) -> (u32, u32) {
        match self {
            Field::Minute => (0, 59),
            Field::Hour => (0, 23),
            Field::DayOfMonth => (1, 31),
            Field::Month => (1, 12),
            // 7 is accepted as an alias for Sunday
            Field::DayOfWeek => (0, 7),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Field::Minute => "minute",
            Field::Hour => "hour",
            Field::DayOfMonth => "day-of-month",
            Field::Month => "month",
            Field::DayOfWeek => "day-of-week",
        }
    }

    fn names(self) -> Option<&'static [&'static str]> {
        match self {
            Field::Month => Some(&MONTH_NAMES),
            Field::DayOfWeek => Some(&DAY_NAMES),
            _ => None,
        }
    }
}

fn star() -> String {
    "*".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CronFields {
    #[serde(default = "star")]
    pub minute: String,
    #[serde(default = "star")]
    pub hour: String,
    #[serde(default = "star")]
    pub day_of_month: String,
    #[serde(default = "star")]
    pub month: String,
    #[serde(default = "star")]
    pub day_of_week: String,
}

impl CronFields {
    fn get(&self, field: Field) -> &str {
        match field {
            Field::Minute => &self.minute,
            Field::Hour => &self.hour,
            Field::DayOfMonth => &self.day_of_month,
            Field::Month => &self.month,
            Field::DayOfWeek => &self.day_of_week,
        }
    }

    pub fn expression(&self) -> String {
        Field::ALL
            .iter()
            .map(|f| self.get(*f))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `expression` wins when present; otherwise the individual fields are assembled,
/// each defaulting to `*`.
#[derive(Debug, Deserialize)]
pub struct CronRequest {
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(flatten)]
    pub fields: CronFields,
}

#[derive(Debug, Serialize)]
pub struct CronResponse {
    pub expression: String,
    pub fields: CronFields,
    pub description: String,
}

fn expand_macro(expression: &str) -> Option<&'static str> {
    match expression {
        "@yearly" | "@annually" => Some("0 0 1 1 *"),
        "@monthly" => Some("0 0 1 * *"),
        "@weekly" => Some("0 0 * * 0"),
        "@daily" | "@midnight" => Some("0 0 * * *"),
        "@hourly" => Some("0 * * * *"),
        _ => None,
    }
}

pub fn parse_expression(expression: &str) -> Result<CronFields, ToolError> {
    let trimmed = expression.trim();
    let expanded = expand_macro(&trimmed.to_ascii_lowercase()).unwrap_or(trimmed);
    let parts: Vec<&str> = expanded.split_whitespace().collect();

    let [minute, hour, day_of_month, month, day_of_week] = parts.as_slice() else {
        return Err(ToolError::InvalidInput(format!(
            "expected 5 fields, found {}",
            parts.len()
        )));
    };

    let fields = CronFields {
        minute: minute.to_string(),
        hour: hour.to_string(),
        day_of_month: day_of_month.to_string(),
        month: month.to_string(),
        day_of_week: day_of_week.to_string(),
    };
    validate_fields(&fields)?;
    Ok(fields)
}

pub fn validate_fields(fields: &CronFields) -> Result<(), ToolError> {
    for field in Field::ALL {
        validate_field(field, fields.get(field))?;
    }
    Ok(())
}

fn invalid(field: Field, spec: &str, reason: &str) -> ToolError {
    ToolError::InvalidInput(format!("{} field '{}': {}", field.label(), spec, reason))
}

fn parse_value(field: Field, token: &str) -> Result<u32, ToolError> {
    let (min, max) = field.bounds();

    let value = match token.parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            let upper = token.to_ascii_uppercase();
            let names = field
                .names()
                .ok_or_else(|| invalid(field, token, "not a number"))?;
            let index = names
                .iter()
                .position(|n| *n == upper)
                .ok_or_else(|| invalid(field, token, "unknown name"))?;
            // Month names are 1-based, day names 0-based.
            if field == Field::Month {
                index as u32 + 1
            } else {
                index as u32
            }
        }
    };

    if value < min || value > max {
        return Err(invalid(
            field,
            token,
            &format!("out of range {}-{}", min, max),
        ));
    }
    Ok(value)
}

fn validate_field(field: Field, spec: &str) -> Result<(), ToolError> {
    if spec.is_empty() {
        return Err(invalid(field, spec, "empty"));
    }

    for item in spec.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (item, None),
        };

        if let Some(step) = step {
            let step: u32 = step
                .parse()
                .map_err(|_| invalid(field, item, "step is not a number"))?;
            if step == 0 || step > field.bounds().1 {
                return Err(invalid(field, item, "step out of range"));
            }
        }

        if range == "*" {
            continue;
        }

        match range.split_once('-') {
            Some((start, end)) => {
                let start = parse_value(field, start)?;
                let end = parse_value(field, end)?;
                if start > end {
                    return Err(invalid(field, item, "range start is after range end"));
                }
            }
            None => {
                parse_value(field, range)?;
            }
        }
    }
    Ok(())
}

fn single_value(field: Field, spec: &str) -> Option<u32> {
    if spec.contains([',', '-', '/', '*']) {
        return None;
    }
    parse_value(field, spec).ok()
}

fn value_label(field: Field, token: &str) -> String {
    match (field, parse_value(field, token)) {
        (Field::Month, Ok(v)) => MONTH_LABELS[(v - 1) as usize].to_string(),
        (Field::DayOfWeek, Ok(v)) => DAY_LABELS[(v % 7) as usize].to_string(),
        _ => token.to_string(),
    }
}

fn describe_list(field: Field, spec: &str) -> String {
    spec.split(',')
        .map(|item| match item.split_once('-') {
            Some((start, end)) if !item.contains('/') => format!(
                "{} through {}",
                value_label(field, start),
                value_label(field, end)
            ),
            _ => value_label(field, item),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_minutes(spec: &str) -> String {
    match spec {
        "*" => "Every minute".to_string(),
        _ => match spec.strip_prefix("*/") {
            Some(step) => format!("Every {} minutes", step),
            None if single_value(Field::Minute, spec).is_some() => format!("At minute {}", spec),
            None => format!("At minutes {}", spec),
        },
    }
}

fn describe_hours(spec: &str) -> Option<String> {
    match spec {
        "*" => None,
        _ => Some(match spec.strip_prefix("*/") {
            Some(step) => format!("every {} hours", step),
            None if single_value(Field::Hour, spec).is_some() => format!("during hour {}", spec),
            None => format!("during hours {}", spec),
        }),
    }
}

pub fn describe(fields: &CronFields) -> String {
    let mut parts = Vec::new();

    match (
        single_value(Field::Minute, &fields.minute),
        single_value(Field::Hour, &fields.hour),
    ) {
        (Some(minute), Some(hour)) => parts.push(format!("At {:02}:{:02}", hour, minute)),
        _ => {
            parts.push(describe_minutes(&fields.minute));
            parts.extend(describe_hours(&fields.hour));
        }
    }

    if fields.day_of_month != "*" {
        parts.push(format!("on day {} of the month", fields.day_of_month));
    }
    if fields.month != "*" {
        parts.push(format!("in {}", describe_list(Field::Month, &fields.month)));
    }
    if fields.day_of_week != "*" {
        parts.push(describe_list(Field::DayOfWeek, &fields.day_of_week));
    }

    parts.join(", ")
}

pub fn run(req: CronRequest) -> Result<CronResponse, ToolError> {
    let fields = match req.expression {
        Some(expression) => parse_expression(&expression)?,
        None => {
            validate_fields(&req.fields)?;
            req.fields
        }
    };

    Ok(CronResponse {
        expression: fields.expression(),
        description: describe(&fields),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe_expr(expr: &str) -> String {
        describe(&parse_expression(expr).unwrap())
    }

    #[test]
    fn describes_common_schedules() {
        assert_eq!(describe_expr("* * * * *"), "Every minute");
        assert_eq!(describe_expr("*/15 * * * *"), "Every 15 minutes");
        assert_eq!(describe_expr("0 9 * * 1-5"), "At 09:00, Monday through Friday");
        assert_eq!(describe_expr("30 2 1 * *"), "At 02:30, on day 1 of the month");
        assert_eq!(
            describe_expr("0 0 * jan,jul sun"),
            "At 00:00, in January, July, Sunday"
        );
        assert_eq!(describe_expr("5 */2 * * *"), "At minute 5, every 2 hours");
    }

    #[test]
    fn expands_macros() {
        assert_eq!(parse_expression("@daily").unwrap().expression(), "0 0 * * *");
        assert_eq!(parse_expression("@HOURLY").unwrap().expression(), "0 * * * *");
    }

    #[test]
    fn builds_from_fields_with_defaults() {
        let req: CronRequest =
            serde_json::from_value(serde_json::json!({ "minute": "0", "hour": "12" })).unwrap();
        let out = run(req).unwrap();
        assert_eq!(out.expression, "0 12 * * *");
        assert_eq!(out.description, "At 12:00");
    }

    #[test]
    fn parses_expression_when_given() {
        let req: CronRequest =
            serde_json::from_value(serde_json::json!({ "expression": "0 0 1 1 *" })).unwrap();
        assert_eq!(run(req).unwrap().fields.month, "1");
    }

    #[test]
    fn rejects_malformed_fields() {
        for bad in [
            "60 * * * *",
            "* 24 * * *",
            "* * 0 * *",
            "* * * 13 *",
            "* * * * 8",
            "5-1 * * * *",
            "*/0 * * * *",
            "* * * foo *",
            "* * *",
            "* * * * * *",
            "1,,2 * * * *",
        ] {
            assert!(
                matches!(parse_expression(bad), Err(ToolError::InvalidInput(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_sunday_as_seven() {
        assert_eq!(describe_expr("0 8 * * 7"), "At 08:00, Sunday");
    }
}
