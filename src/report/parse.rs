//! Splits generated text into keywords and report body.

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword array at the very start of the text, ending its line.
const LEADING_ARRAY_PATTERN: &str = r"^\s*\[[\s\S]*?\]\s*(?:\n|$)";
/// Single-line array of string literals anywhere in the text.
const INLINE_ARRAY_PATTERN: &str = r#"\[("[^"]*",?\s*)+\]"#;
/// Any bracketed span without nested brackets.
const BRACKETED_PATTERN: &str = r"\[[^\]]*\]";
const LEADING_SEPARATOR_PATTERN: &str = r"^[-=]{3,}\s*\n";
const SEPARATOR_LINE_PATTERN: &str = r"(?m)^[-=*]{3,}\s*\n?";
const CODE_FENCE_PATTERN: &str = r"```(?:json)?\s*";
const BLANK_RUN_PATTERN: &str = r"\n{3,}";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub keywords: Vec<String>,
    pub report: String,
}

/// Parses a fresh model reply: a leading JSON string array becomes the keywords,
/// the rest (minus a leading `---`/`===` separator) the report.
///
/// When the leading array is not valid JSON the whole text is the report.
pub fn parse_response(text: &str) -> Result<ParsedReport> {
    let leading = Regex::new(LEADING_ARRAY_PATTERN)?;

    let Some(found) = leading.find(text) else {
        return Ok(whole_text(text));
    };

    match serde_json::from_str::<Vec<String>>(found.as_str()) {
        Ok(keywords) => {
            let separator = Regex::new(LEADING_SEPARATOR_PATTERN)?;
            let rest = text[found.end()..].trim();
            let report = separator.replace(rest, "").trim().to_string();
            Ok(ParsedReport { keywords, report })
        }
        Err(e) => {
            crate::log(&format!("Warning: Keyword array is not valid JSON: {}", e));
            Ok(whole_text(text))
        }
    }
}

fn whole_text(text: &str) -> ParsedReport {
    ParsedReport {
        keywords: Vec::new(),
        report: text.to_string(),
    }
}

/// Recovers keywords from a stored report that was saved without them.
///
/// Code fences are stripped first. The keyword array is searched for at the start,
/// then as any single-line string array, then as any bracketed span that parses as
/// a non-empty string array. Separator lines are removed once an array is found,
/// and runs of blank lines collapse to one.
pub fn extract_keywords_from_report(report: &str) -> Result<ParsedReport> {
    if report.is_empty() {
        return Ok(ParsedReport::default());
    }

    let fences = Regex::new(CODE_FENCE_PATTERN)?;
    let mut clean = fences.replace_all(report, "").into_owned();
    let mut keywords = Vec::new();

    if let Some(candidate) = find_keyword_array(&clean)? {
        match serde_json::from_str::<Vec<String>>(&candidate) {
            Ok(parsed) => {
                keywords = parsed;
                clean = clean.replacen(&candidate, "", 1).trim().to_string();
                let separators = Regex::new(SEPARATOR_LINE_PATTERN)?;
                clean = separators.replace_all(&clean, "").into_owned();
            }
            Err(e) => {
                crate::log(&format!("Warning: Failed to parse stored keywords: {}", e));
            }
        }
    }

    let blank_runs = Regex::new(BLANK_RUN_PATTERN)?;
    let report = blank_runs.replace_all(clean.trim(), "\n\n").into_owned();

    Ok(ParsedReport { keywords, report })
}

fn find_keyword_array(text: &str) -> Result<Option<String>> {
    if let Some(found) = Regex::new(LEADING_ARRAY_PATTERN)?.find(text) {
        return Ok(Some(found.as_str().to_string()));
    }

    if let Some(found) = Regex::new(INLINE_ARRAY_PATTERN)?.find(text) {
        return Ok(Some(found.as_str().to_string()));
    }

    let bracketed = Regex::new(BRACKETED_PATTERN)?;
    let candidate = bracketed.find_iter(text).map(|m| m.as_str()).find(|m| {
        serde_json::from_str::<Vec<String>>(m).is_ok_and(|words| !words.is_empty())
    });

    Ok(candidate.map(str::to_string))
}
