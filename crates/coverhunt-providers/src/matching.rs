// SPDX-License-Identifier: GPL-3.0-or-later

//! Text normalization used to compare artist and album names coming back from
//! provider APIs against the names the user searched for.
//!
//! Provider catalogs spell names inconsistently ("Beyoncé" vs "Beyonce",
//! "Hall & Oates" vs "Hall and Oates", "The Beatles" vs "Beatles"), so every
//! provider filters its results through [`fuzzy_equal`] and [`artists_match`]
//! rather than plain string equality.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, drop light punctuation, fold "and"/"&" joins and collapse spaces.
pub fn normalize(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '\'' | '!' | '?' | '-'))
        .flat_map(char::to_lowercase)
        .collect();

    stripped
        .replace(" and ", " ")
        .replace(" & ", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map accented Latin, Cyrillic and Greek letters to a plain Latin spelling.
///
/// Best effort: anything without a known mapping is copied through unchanged.
pub fn fold_diacritics(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());

    for c in value.chars() {
        if let Some(mapped) = transliterate(c) {
            folded.push_str(mapped);
            continue;
        }

        // Precomposed letters such as "é" decompose into a base letter followed
        // by combining marks; keep the base when it is something we can spell.
        let mut decomposed = std::iter::once(c).nfd();
        let Some(base) = decomposed.next() else {
            continue;
        };
        let rest: Vec<char> = decomposed.collect();
        if base == c || rest.is_empty() || !rest.iter().all(|m| is_combining_mark(*m)) {
            folded.push(c);
        } else if base.is_ascii() {
            folded.push(base);
        } else if let Some(mapped) = transliterate(base) {
            folded.push_str(mapped);
        } else {
            folded.push(c);
        }
    }

    folded
}

/// Letters that do not decompose under NFD or need more than one Latin letter.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        // Latin
        'Æ' => "AE",
        'æ' => "ae",
        'ß' => "ss",
        'Ð' | 'Đ' => "D",
        'ð' | 'đ' => "d",
        'Ø' => "O",
        'ø' => "o",
        'Ħ' => "H",
        'ħ' => "h",
        'ı' => "i",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'Ŀ' | 'Ł' => "L",
        'ŀ' | 'ł' => "l",
        'Œ' => "OE",
        'œ' => "oe",

        // Cyrillic
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' | 'Ё' | 'Э' => "E",
        'Ж' => "Zh",
        'З' => "Z",
        'И' | 'Й' => "I",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "Kh",
        'Ц' => "Ts",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Shch",
        'Ы' => "Y",
        'Ю' => "Yu",
        'Я' => "Ya",
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' | 'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'Ъ' | 'Ь' | 'ъ' | 'ь' => "",

        // Greek
        'Α' => "A",
        'Β' => "B",
        'Γ' => "G",
        'Δ' => "D",
        'Ε' => "E",
        'Ζ' => "Z",
        'Η' | 'Ι' => "I",
        'Θ' => "Th",
        'Κ' => "K",
        'Λ' => "L",
        'Μ' => "M",
        'Ν' => "N",
        'Ξ' => "X",
        'Ο' | 'Ω' => "O",
        'Π' => "P",
        'Ρ' => "R",
        'Σ' => "S",
        'Τ' => "T",
        'Υ' => "Y",
        'Φ' => "F",
        'Χ' => "Ch",
        'Ψ' => "Ps",
        'α' => "a",
        'β' => "b",
        'γ' => "g",
        'δ' => "d",
        'ε' => "e",
        'ζ' => "z",
        'η' | 'ι' => "i",
        'θ' => "th",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "x",
        'ο' | 'ω' => "o",
        'π' => "p",
        'ρ' => "r",
        'ς' | 'σ' => "s",
        'τ' => "t",
        'υ' => "y",
        'φ' => "ph",
        'χ' => "ch",
        'ψ' => "ps",
        _ => return None,
    };
    Some(mapped)
}

/// Same length and equal ignoring ASCII case.
pub fn equal_ignore_case(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.eq_ignore_ascii_case(b)
}

/// Case-insensitive equality, falling back to comparing folded and normalized forms.
pub fn fuzzy_equal(a: &str, b: &str) -> bool {
    if equal_ignore_case(a, b) {
        return true;
    }
    normalize(&fold_diacritics(a)) == normalize(&fold_diacritics(b))
}

/// Remove a leading "the " (any case). Strings that are only the prefix are kept.
pub fn strip_the_prefix(value: &str) -> &str {
    match value.get(..4) {
        Some(prefix) if value.len() > 4 && prefix.eq_ignore_ascii_case("the ") => &value[4..],
        _ => value,
    }
}

/// Whether two artist names refer to the same act.
pub fn artists_match(a: &str, b: &str) -> bool {
    if equal_ignore_case(a, b) || fuzzy_equal(a, b) {
        return true;
    }
    let (a, b) = (strip_the_prefix(a), strip_the_prefix(b));
    equal_ignore_case(a, b) || fuzzy_equal(a, b)
}

/// `value` begins with `prefix`, ignoring ASCII case.
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
