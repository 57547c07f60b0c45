pub mod token;
pub mod word_tokenizer;
