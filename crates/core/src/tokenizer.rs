use crate::error::LoadError;
use tiktoken_rs::CoreBPE;

pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-3.5-turbo";

pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

impl<T: TokenCounter + ?Sized> TokenCounter for &T {
    fn count_tokens(&self, text: &str) -> usize {
        (**self).count_tokens(text)
    }
}

impl<T: TokenCounter + ?Sized> TokenCounter for Box<T> {
    fn count_tokens(&self, text: &str) -> usize {
        (**self).count_tokens(text)
    }
}

pub struct BpeTokenCounter {
    model: String,
    bpe: CoreBPE,
}

impl BpeTokenCounter {
    pub fn for_model(model: &str) -> Result<Self, LoadError> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|error| LoadError::Tokenizer(format!("{model}: {error}")))?;

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for BpeTokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenCounter")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCounter;

impl TokenCounter for ApproxTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApproxTokenCounter, BpeTokenCounter, TokenCounter, DEFAULT_TOKENIZER_MODEL};

    #[test]
    fn approx_counter_rounds_up_per_four_chars() {
        let counter = ApproxTokenCounter;
        assert_eq!(counter.count_tokens(""), 0);
        assert_eq!(counter.count_tokens("a"), 1);
        assert_eq!(counter.count_tokens("abcd"), 1);
        assert_eq!(counter.count_tokens("abcde"), 2);
    }

    #[test]
    fn approx_counter_measures_characters_not_bytes() {
        let counter = ApproxTokenCounter;
        assert_eq!(counter.count_tokens("días"), 1);
    }

    #[test]
    fn bpe_counter_is_deterministic_and_grows_with_text() {
        let counter =
            BpeTokenCounter::for_model(DEFAULT_TOKENIZER_MODEL).expect("bpe tables should load");
        let short = counter.count_tokens("política de devoluciones");
        let long = counter.count_tokens("política de devoluciones y garantías");

        assert_eq!(short, counter.count_tokens("política de devoluciones"));
        assert!(short > 0);
        assert!(long >= short);
        assert_eq!(counter.count_tokens(""), 0);
    }

    #[test]
    fn bpe_counter_rejects_unknown_models() {
        assert!(BpeTokenCounter::for_model("not-a-real-model").is_err());
    }
}
