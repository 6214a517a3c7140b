use chrono::{Local, Timelike};
use regex::Regex;

pub const GREETING_PHRASES: [&str; 8] = [
    "hola",
    "buenos días",
    "buenas tardes",
    "buenas noches",
    "qué tal",
    "cómo estás",
    "saludos",
    "buen día",
];

pub const MORNING_REPLY: &str =
    "¡Buenos días! ¿En qué puedo ayudarte con productos, políticas o pedidos?";
pub const AFTERNOON_REPLY: &str =
    "¡Buenas tardes! ¿En qué puedo ayudarte con productos, políticas o pedidos?";
pub const EVENING_REPLY: &str =
    "¡Buenas noches! ¿En qué puedo ayudarte con productos, políticas o pedidos?";

const LEADING_PUNCTUATION: &[char] = &[',', '.', '!', '?', '¿', '¡'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GreetingOutcome {
    pub is_greeting: bool,
    pub reply: Option<&'static str>,
    pub question: Option<String>,
}

pub fn fold_diacritics(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

pub fn reply_for_hour(hour: u32) -> &'static str {
    if hour < 12 {
        MORNING_REPLY
    } else if hour < 18 {
        AFTERNOON_REPLY
    } else {
        EVENING_REPLY
    }
}

#[derive(Debug, Clone)]
pub struct GreetingClassifier {
    pattern: Regex,
}

impl GreetingClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let alternation = GREETING_PHRASES
            .iter()
            .map(|phrase| accent_tolerant(&fold_diacritics(phrase)))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))?;

        Ok(Self { pattern })
    }

    pub fn is_greeting(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn process(&self, input: &str) -> GreetingOutcome {
        self.process_at(input, Local::now().hour())
    }

    pub fn process_at(&self, input: &str, hour: u32) -> GreetingOutcome {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return GreetingOutcome::default();
        }

        let Some(last) = self.pattern.find_iter(input).last() else {
            return GreetingOutcome {
                is_greeting: false,
                reply: None,
                question: Some(trimmed.to_string()),
            };
        };

        let rest = input[last.end()..]
            .trim_start_matches(|ch: char| ch.is_whitespace() || LEADING_PUNCTUATION.contains(&ch))
            .trim_end();

        GreetingOutcome {
            is_greeting: true,
            reply: Some(reply_for_hour(hour)),
            question: (!rest.is_empty()).then(|| rest.to_string()),
        }
    }
}

fn accent_tolerant(folded: &str) -> String {
    folded
        .chars()
        .map(|ch| match ch {
            'a' => "[aá]".to_string(),
            'e' => "[eé]".to_string(),
            'i' => "[ií]".to_string(),
            'o' => "[oó]".to_string(),
            'u' => "[uúü]".to_string(),
            'n' => "[nñ]".to_string(),
            ' ' => r"\s+".to_string(),
            other => regex::escape(&other.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GreetingClassifier {
        GreetingClassifier::new().expect("greeting pattern should compile")
    }

    #[test]
    fn greeting_is_stripped_from_the_question() {
        let outcome = classifier().process_at("Hola, ¿cuánto cuesta el producto X?", 9);
        assert!(outcome.is_greeting);
        assert_eq!(outcome.reply, Some(MORNING_REPLY));
        assert_eq!(outcome.question.as_deref(), Some("cuánto cuesta el producto X?"));
    }

    #[test]
    fn plain_question_passes_through_trimmed() {
        let outcome = classifier().process_at("  ¿Cuál es la política de devoluciones?  ", 15);
        assert!(!outcome.is_greeting);
        assert_eq!(outcome.reply, None);
        assert_eq!(
            outcome.question.as_deref(),
            Some("¿Cuál es la política de devoluciones?")
        );
    }

    #[test]
    fn empty_input_is_neither_greeting_nor_question() {
        let classifier = classifier();
        assert_eq!(classifier.process_at("", 10), GreetingOutcome::default());
        assert_eq!(classifier.process_at("   ", 10), GreetingOutcome::default());
    }

    #[test]
    fn accents_and_case_do_not_matter() {
        let classifier = classifier();
        assert_eq!(fold_diacritics("Buenos Días"), fold_diacritics("buenos dias"));
        assert!(classifier.is_greeting("Buenos Días"));
        assert!(classifier.is_greeting("buenos dias"));
        assert!(classifier.is_greeting("QUE TAL"));
        assert!(classifier.is_greeting("¿Cómo estás?"));
    }

    #[test]
    fn greetings_match_whole_words_only() {
        let classifier = classifier();
        assert!(!classifier.is_greeting("Envíos a Holanda"));
        assert!(!classifier.is_greeting("saludosamente"));
    }

    #[test]
    fn question_follows_the_last_greeting() {
        let outcome =
            classifier().process_at("Hola, buenas tardes. ¿Tienen envío gratis?", 13);
        assert_eq!(outcome.reply, Some(AFTERNOON_REPLY));
        assert_eq!(outcome.question.as_deref(), Some("Tienen envío gratis?"));
    }

    #[test]
    fn bare_greeting_has_no_question() {
        let outcome = classifier().process_at("¡Buenas noches!", 22);
        assert!(outcome.is_greeting);
        assert_eq!(outcome.reply, Some(EVENING_REPLY));
        assert_eq!(outcome.question, None);
    }

    #[test]
    fn reply_depends_on_hour_boundaries() {
        assert_eq!(reply_for_hour(0), MORNING_REPLY);
        assert_eq!(reply_for_hour(11), MORNING_REPLY);
        assert_eq!(reply_for_hour(12), AFTERNOON_REPLY);
        assert_eq!(reply_for_hour(17), AFTERNOON_REPLY);
        assert_eq!(reply_for_hour(18), EVENING_REPLY);
        assert_eq!(reply_for_hour(23), EVENING_REPLY);
    }
}
