//! # Terminology Corrector
//!
//! Deterministic clean-up applied to every aligned translation, in order:
//!
//! 1. Glossary substitution: one left-to-right pass over a fixed, ordered
//!    table of `(wrong, correct)` literal pairs. No correct form contains a
//!    wrong form, so the pass is idempotent.
//! 2. Timezone reinsertion: when the source title carries a time followed by a
//!    timezone abbreviation and the translation dropped the abbreviation, put it
//!    back after the translated time phrase. Best effort; text that matches no
//!    known phrase is left alone.

use regex::Regex;
use tracing::trace;

/// Ordered `(wrong, correct)` pairs
pub const GLOSSARY: &[(&str, &str)] = &[
    ("엘론 머스크", "일론 머스크"),
    ("엘론이", "일론이"),
    ("엘론의", "일론의"),
    ("엘론은", "일론은"),
    ("반스", "밴스"),
    ("젤렌스끼", "젤렌스키"),
    ("습근평", "시진핑"),
    ("주커버그", "저커버그"),
    ("알트만", "올트먼"),
    ("네탄야후", "네타냐후"),
    ("매크롱", "마크롱"),
    ("행정 명령", "행정명령"),
    ("경기 침체", "경기침체"),
    ("아카데미상", "오스카상"),
    ("아카데미 시상식", "오스카 시상식"),
    ("슈퍼 볼", "슈퍼볼"),
    ("연방준비", "연준"),
    ("이자율", "금리"),
    ("에어드롭", "에어드랍"),
];

const SOURCE_TIME_PATTERN: &str =
    r"(?i)\b([0-9]{1,2}(?::[0-9]{2})?(?:AM|PM)?)\s+(ET|PT|EST|PST|UTC|GMT)\b";

/// Translated time phrases, tried in order; `{tz}` is the abbreviation
const TRANSLATED_TIME_PATTERNS: &[(&str, &str)] = &[
    (r"(오전|오후)\s*([0-9]{1,2})시에", "${1} ${2}시 {tz}에"),
    (r"(오전|오후)\s*([0-9]{1,2})시\s*([0-9]{1,2})분에", "${1} ${2}시 ${3}분 {tz}에"),
    (r"자정에", "자정 {tz}에"),
    (r"정오에", "정오 {tz}에"),
    (r"(오전|오후)\s*([0-9]{1,2})시(\s*[0-9]{1,2}분)?", "${1} ${2}시${3} {tz}"),
];

#[derive(Debug)]
struct TimePhrase {
    pattern: Regex,
    replacement: &'static str,
}

#[derive(Debug)]
pub struct TerminologyCorrector {
    source_time: Regex,
    time_phrases: Vec<TimePhrase>,
}

impl TerminologyCorrector {
    pub fn new() -> Result<Self, regex::Error> {
        let time_phrases = TRANSLATED_TIME_PATTERNS
            .iter()
            .map(|&(pattern, replacement)| {
                Ok(TimePhrase {
                    pattern: Regex::new(pattern)?,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            source_time: Regex::new(SOURCE_TIME_PATTERN)?,
            time_phrases,
        })
    }

    /// Glossary pass, then timezone pass
    pub fn correct(&self, source: &str, translated: &str) -> String {
        let glossed = self.apply_glossary(translated);
        self.reinsert_timezone(source, &glossed)
    }

    pub fn apply_glossary(&self, text: &str) -> String {
        GLOSSARY
            .iter()
            .fold(text.to_string(), |acc, (wrong, correct)| {
                if acc.contains(wrong) {
                    acc.replace(wrong, correct)
                } else {
                    acc
                }
            })
    }

    /// Upper-cased abbreviation of the first `<time> <TZ>` in the source
    pub fn source_timezone(&self, source: &str) -> Option<String> {
        self.source_time
            .captures(source)
            .and_then(|caps| caps.get(2))
            .map(|tz| tz.as_str().to_uppercase())
    }

    pub fn reinsert_timezone(&self, source: &str, translated: &str) -> String {
        let Some(tz) = self.source_timezone(source) else {
            return translated.to_string();
        };
        if translated.contains(tz.as_str()) {
            return translated.to_string();
        }

        for phrase in &self.time_phrases {
            if phrase.pattern.is_match(translated) {
                let replacement = phrase.replacement.replace("{tz}", &tz);
                trace!(timezone = %tz, "🕐 TERMINOLOGY: Reinserting timezone");
                return phrase
                    .pattern
                    .replace_all(translated, replacement.as_str())
                    .into_owned();
            }
        }
        translated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> TerminologyCorrector {
        TerminologyCorrector::new().unwrap()
    }

    #[test]
    fn test_glossary_substitution() {
        let c = corrector();
        assert_eq!(
            c.apply_glossary("엘론 머스크가 연방준비 이자율 인하를 말할까?"),
            "일론 머스크가 연준 금리 인하를 말할까?"
        );
        assert_eq!(c.apply_glossary("슈퍼 볼 우승팀은?"), "슈퍼볼 우승팀은?");
    }

    #[test]
    fn test_glossary_is_idempotent_on_correct_text() {
        let c = corrector();
        let text = "일론 머스크와 밴스가 행정명령에 서명할까?";
        assert_eq!(c.apply_glossary(text), text);
        let once = c.apply_glossary("반스가 에어드롭을 받을까?");
        assert_eq!(c.apply_glossary(&once), once);
    }

    #[test]
    fn test_no_correct_form_contains_a_wrong_form() {
        for (_, correct) in GLOSSARY {
            for (wrong, _) in GLOSSARY {
                assert!(!correct.contains(wrong), "{correct} contains {wrong}");
            }
        }
    }

    #[test]
    fn test_source_timezone_detection() {
        let c = corrector();
        assert_eq!(
            c.source_timezone("Bitcoin Up or Down - February 11, 4AM ET").as_deref(),
            Some("ET")
        );
        assert_eq!(c.source_timezone("Solana at 12:30pm utc?").as_deref(), Some("UTC"));
        assert_eq!(c.source_timezone("Will the ETF be approved?"), None);
    }

    #[test]
    fn test_reinserts_bare_time_phrase() {
        let c = corrector();
        let corrected = c.reinsert_timezone(
            "Bitcoin Up or Down - February 11, 4AM ET",
            "비트코인 2월 11일 오전 4시 상승 또는 하락?",
        );
        assert_eq!(corrected, "비트코인 2월 11일 오전 4시 ET 상승 또는 하락?");
    }

    #[test]
    fn test_reinserts_before_particle() {
        let c = corrector();
        assert_eq!(
            c.reinsert_timezone("Fed decision at 2PM ET?", "연준이 오후 2시에 결정할까?"),
            "연준이 오후 2시 ET에 결정할까?"
        );
        assert_eq!(
            c.reinsert_timezone("ETH above $3k at 12:30PM ET?", "이더리움이 오후 12시 30분에 3천 달러 이상일까?"),
            "이더리움이 오후 12시 30분 ET에 3천 달러 이상일까?"
        );
        assert_eq!(
            c.reinsert_timezone("Price at 12AM PT?", "자정에 가격은?"),
            "자정 PT에 가격은?"
        );
    }

    #[test]
    fn test_existing_timezone_left_alone() {
        let c = corrector();
        let text = "비트코인 오전 4시 ET 상승?";
        assert_eq!(c.reinsert_timezone("Bitcoin 4AM ET up?", text), text);
    }

    #[test]
    fn test_unrecognized_phrase_left_alone() {
        let c = corrector();
        let text = "비트코인 4:00 상승?";
        assert_eq!(c.reinsert_timezone("Bitcoin 4AM ET up?", text), text);
    }

    #[test]
    fn test_correct_runs_glossary_then_timezone() {
        let c = corrector();
        assert_eq!(
            c.correct("Will Elon Musk tweet at 9PM ET?", "엘론 머스크가 오후 9시에 트윗할까?"),
            "일론 머스크가 오후 9시 ET에 트윗할까?"
        );
    }
}
