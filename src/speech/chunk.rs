/// Longest text the TTS endpoint accepts in one call.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Punctuation that ends a spoken segment and is dropped.
const BREAKS: &[char] = &[
    '.', ',', ';', ':', '(', ')', '[', ']', '¡', '¿', '…', '‥', '،', '—', '。', '，', '、', '：',
    '\n',
];

/// Punctuation that ends a segment but stays on it to keep the intonation.
const TONE_MARKS: &[char] = &['?', '!', '？', '！'];

/// Splits text into non-blank chunks of at most [`MAX_CHUNK_CHARS`]
/// characters, breaking at punctuation first and whitespace second.
pub fn split_text(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if BREAKS.contains(&c) {
            segments.push(std::mem::take(&mut current));
        } else if TONE_MARKS.contains(&c) {
            current.push(c);
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .flat_map(|s| minimize(s, MAX_CHUNK_CHARS))
        .collect()
}

/// Greedily packs words into pieces no longer than `max_chars`. Words that
/// are longer on their own are cut.
fn minimize(segment: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in segment.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            pieces.push(std::mem::take(&mut current));
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                pieces.push(part.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
