use super::token::Token;

/// Splits text on word boundaries. Every token owns the whitespace that
/// follows it in its original form, while the normalised form is the bare
/// word. Leading whitespace is attached to the first token.
///
/// ## Example
///
/// ```not_rust
/// "Hi  there!" -> [("Hi  ", "Hi"), ("there!", "there!")]
/// ```
#[must_use]
pub fn word_tokenizer(text: &str) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::new();

    let leading = text.len() - text.trim_start().len();
    let mut word_start = leading;
    let mut in_whitespace = false;

    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < leading) {
        let is_whitespace = c.is_whitespace();
        if in_whitespace && !is_whitespace {
            push_word(&mut result, text, word_start, i);
            word_start = i;
        }

        in_whitespace = is_whitespace;
    }

    if word_start < text.len() {
        push_word(&mut result, text, word_start, text.len());
    }

    result
}

fn push_word(result: &mut Vec<Token>, text: &str, start: usize, end: usize) {
    // the first token also carries the leading whitespace of the text
    let original_start = if result.is_empty() { 0 } else { start };
    let original = &text[original_start..end];
    let normalized = text[start..end].trim_end();

    result.push(Token::new(
        normalized.to_owned(),
        original.to_owned(),
        result.len(),
    ));
}
