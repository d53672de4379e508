use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Kind of work a prompt represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskClass {
    Coding,
    Summary,
    General,
}

impl TaskClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskClass::Coding => "coding",
            TaskClass::Summary => "summary",
            TaskClass::General => "general",
        }
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coding" => Ok(TaskClass::Coding),
            "summary" => Ok(TaskClass::Summary),
            "general" => Ok(TaskClass::General),
            other => Err(format!("unknown task class '{}'", other)),
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
        .collect()
}

static CODING_SIGNALS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(code|coding|bug|bugs|debug|fix|refactor|compile|compiler|stack ?trace|exception)\b",
        r"\b(function|method|class|variable|regex|api|endpoint|script|query|sql)\b",
        r"\b(python|javascript|typescript|rust|java|golang|c\+\+|php|ruby|html|css)\b",
        r"```",
    ])
});

static SUMMARY_SIGNALS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(summari[sz]e|summari[sz]ing|summary|summaries)\b",
        r"\b(tl;?dr|recap|condense|digest|gist)\b",
        r"\b(key points|main points|in brief|overview of)\b",
    ])
});

/// Classify a prompt by keyword signals. Coding signals win over summary signals.
pub fn classify(prompt: &str) -> TaskClass {
    if CODING_SIGNALS.iter().any(|re| re.is_match(prompt)) {
        TaskClass::Coding
    } else if SUMMARY_SIGNALS.iter().any(|re| re.is_match(prompt)) {
        TaskClass::Summary
    } else {
        TaskClass::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coding_prompt() {
        assert_eq!(classify("Fix this SQL bug"), TaskClass::Coding);
        assert_eq!(classify("fix this bug in my function"), TaskClass::Coding);
        assert_eq!(classify("```let x = 1;```"), TaskClass::Coding);
    }

    #[test]
    fn test_summary_prompt() {
        assert_eq!(classify("Please summarize this report"), TaskClass::Summary);
        assert_eq!(classify("TL;DR of the meeting notes?"), TaskClass::Summary);
    }

    #[test]
    fn test_general_prompt() {
        assert_eq!(classify("what's the weather"), TaskClass::General);
        assert_eq!(classify(""), TaskClass::General);
    }

    #[test]
    fn test_coding_wins_over_summary() {
        assert_eq!(
            classify("Summarize what this Python function does"),
            TaskClass::Coding
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("PLEASE SUMMARIZE"), TaskClass::Summary);
        assert_eq!(classify("DEBUG THIS"), TaskClass::Coding);
    }

    #[test]
    fn test_every_signal_compiles() {
        assert_eq!(CODING_SIGNALS.len(), 4);
        assert_eq!(SUMMARY_SIGNALS.len(), 3);
    }

    #[test]
    fn test_parse_task_class() {
        assert_eq!("Coding".parse::<TaskClass>(), Ok(TaskClass::Coding));
        assert!("poetry".parse::<TaskClass>().is_err());
    }
}
