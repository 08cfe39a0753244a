use chrono::{DateTime, Utc};
use std::path::Path;

/// Lowercased, accent-folded, hyphen-separated form of a display string,
/// safe for filenames: keeps word characters, collapses whitespace runs to
/// single hyphens, drops everything else.
pub fn slugify(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for c in s.chars() {
        match fold_accent(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }

    let kept: String = folded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    kept.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

// Latin-1 / Latin Extended-A fold for the characters that actually show up
// in applicant names. Everything unmapped either passes through (ASCII) or
// is dropped by the word-character filter above.
fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'đ' | 'ď' => "d",
        'Đ' | 'Ď' => "D",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => "I",
        'ł' => "l",
        'Ł' => "L",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' => "O",
        'ř' => "r",
        'Ř' => "R",
        'ś' | 'š' => "s",
        'Ś' | 'Š' => "S",
        'ť' => "t",
        'Ť' => "T",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Storage filename for a submitted resume:
/// `slug(name)-slug(position)-<YYYYMMDDHHMMSS><ext>`, where the base falls
/// back to "resume" when both slugs are empty and the extension falls back
/// to ".pdf". The second-granularity UTC timestamp is the only collision
/// guard.
pub fn resume_filename(
    name: &str,
    position: &str,
    original_filename: &str,
    now: DateTime<Utc>,
) -> String {
    let base = format!("{}-{}", slugify(name), slugify(position));
    let base = base.trim_matches('-');
    let base = if base.is_empty() { "resume" } else { base };

    let ts = now.format("%Y%m%d%H%M%S");

    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".pdf".to_string());

    format!("{}-{}{}", base, ts, ext)
}
