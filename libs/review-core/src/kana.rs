//! Romaji and kana transliteration.
//!
//! Conversion runs in both directions:
//! - [`kana_to_romaji`] is total: unmapped characters pass through unchanged.
//! - [`romaji_to_kana`] is strict and returns `None` when any position fails
//!   to parse. [`romaji_to_kana_relaxed`] never fails and is meant for live
//!   input previews only.
//!
//! Katakana is folded to hiragana with a fixed code point shift before any
//! table lookup, so the tables only list hiragana.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Small tsu, marks a doubled consonant.
const SOKUON: char = 'っ';
/// Long vowel mark.
const CHOONPU: char = 'ー';
/// Offset between the hiragana and katakana blocks.
const KATAKANA_OFFSET: u32 = 0x60;

/// Result of parsing romaji: the same reading in both syllabaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanaPair {
    pub hiragana: String,
    pub katakana: String,
}

impl KanaPair {
    fn from_hiragana(hiragana: String) -> Self {
        let katakana = hira_to_kata(&hiragana);
        Self { hiragana, katakana }
    }

    pub fn is_empty(&self) -> bool {
        self.hiragana.is_empty()
    }
}

/// Small kana, written with a leading `x`.
const SMALL_KANA: &[(&str, &str)] = &[
    ("xa", "ぁ"),
    ("xi", "ぃ"),
    ("xu", "ぅ"),
    ("xe", "ぇ"),
    ("xo", "ぉ"),
    ("xya", "ゃ"),
    ("xyu", "ゅ"),
    ("xyo", "ょ"),
    ("xtsu", "っ"),
    ("xwa", "ゎ"),
];

/// Palatalized syllables. Alternate spellings map to the same kana.
const DIGRAPHS: &[(&str, &str)] = &[
    ("kya", "きゃ"), ("kyu", "きゅ"), ("kyo", "きょ"),
    ("gya", "ぎゃ"), ("gyu", "ぎゅ"), ("gyo", "ぎょ"),
    ("sha", "しゃ"), ("shu", "しゅ"), ("sho", "しょ"),
    ("sya", "しゃ"), ("syu", "しゅ"), ("syo", "しょ"),
    ("ja", "じゃ"), ("ju", "じゅ"), ("jo", "じょ"),
    ("jya", "じゃ"), ("jyu", "じゅ"), ("jyo", "じょ"),
    ("cha", "ちゃ"), ("chu", "ちゅ"), ("cho", "ちょ"),
    ("tya", "ちゃ"), ("tyu", "ちゅ"), ("tyo", "ちょ"),
    ("nya", "にゃ"), ("nyu", "にゅ"), ("nyo", "にょ"),
    ("hya", "ひゃ"), ("hyu", "ひゅ"), ("hyo", "ひょ"),
    ("bya", "びゃ"), ("byu", "びゅ"), ("byo", "びょ"),
    ("pya", "ぴゃ"), ("pyu", "ぴゅ"), ("pyo", "ぴょ"),
    ("mya", "みゃ"), ("myu", "みゅ"), ("myo", "みょ"),
    ("rya", "りゃ"), ("ryu", "りゅ"), ("ryo", "りょ"),
];

/// The plain syllabary.
const MONOGRAPHS: &[(&str, &str)] = &[
    ("a", "あ"), ("i", "い"), ("u", "う"), ("e", "え"), ("o", "お"),
    ("ka", "か"), ("ki", "き"), ("ku", "く"), ("ke", "け"), ("ko", "こ"),
    ("ga", "が"), ("gi", "ぎ"), ("gu", "ぐ"), ("ge", "げ"), ("go", "ご"),
    ("sa", "さ"), ("shi", "し"), ("si", "し"), ("su", "す"), ("se", "せ"), ("so", "そ"),
    ("za", "ざ"), ("ji", "じ"), ("zi", "じ"), ("zu", "ず"), ("ze", "ぜ"), ("zo", "ぞ"),
    ("ta", "た"), ("chi", "ち"), ("ti", "ち"), ("tsu", "つ"), ("tu", "つ"), ("te", "て"), ("to", "と"),
    ("da", "だ"), ("di", "ぢ"), ("du", "づ"), ("de", "で"), ("do", "ど"),
    ("na", "な"), ("ni", "に"), ("nu", "ぬ"), ("ne", "ね"), ("no", "の"),
    ("ha", "は"), ("hi", "ひ"), ("fu", "ふ"), ("hu", "ふ"), ("he", "へ"), ("ho", "ほ"),
    ("ba", "ば"), ("bi", "び"), ("bu", "ぶ"), ("be", "べ"), ("bo", "ぼ"),
    ("pa", "ぱ"), ("pi", "ぴ"), ("pu", "ぷ"), ("pe", "ぺ"), ("po", "ぽ"),
    ("ma", "ま"), ("mi", "み"), ("mu", "む"), ("me", "め"), ("mo", "も"),
    ("ya", "や"), ("yu", "ゆ"), ("yo", "よ"),
    ("ra", "ら"), ("ri", "り"), ("ru", "る"), ("re", "れ"), ("ro", "ろ"),
    ("wa", "わ"), ("wo", "を"),
];

/// "consonant + i + small ya/yu/yo" spellings folded into digraphs before
/// parsing. Longer prefixes come first so `shixya` is not eaten by `hixya`.
const SPLIT_DIGRAPHS: &[(&str, &str)] = &[
    ("kixya", "kya"), ("kixyu", "kyu"), ("kixyo", "kyo"),
    ("gixya", "gya"), ("gixyu", "gyu"), ("gixyo", "gyo"),
    ("sixya", "sha"), ("sixyu", "shu"), ("sixyo", "sho"),
    ("shixya", "sha"), ("shixyu", "shu"), ("shixyo", "sho"),
    ("jixya", "ja"), ("jixyu", "ju"), ("jixyo", "jo"),
    ("chixya", "cha"), ("chixyu", "chu"), ("chixyo", "cho"),
    ("nixya", "nya"), ("nixyu", "nyu"), ("nixyo", "nyo"),
    ("hixya", "hya"), ("hixyu", "hyu"), ("hixyo", "hyo"),
    ("bixya", "bya"), ("bixyu", "byu"), ("bixyo", "byo"),
    ("pixya", "pya"), ("pixyu", "pyu"), ("pixyo", "pyo"),
    ("mixya", "mya"), ("mixyu", "myu"), ("mixyo", "myo"),
    ("rixya", "rya"), ("rixyu", "ryu"), ("rixyo", "ryo"),
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_romaji_consonant(c: char) -> bool {
    c.is_ascii_lowercase() && !is_vowel(c)
}

fn digraph_romaji(first: char, second: char) -> Option<&'static str> {
    let romaji = match (first, second) {
        ('き', 'ゃ') => "kya", ('き', 'ゅ') => "kyu", ('き', 'ょ') => "kyo",
        ('ぎ', 'ゃ') => "gya", ('ぎ', 'ゅ') => "gyu", ('ぎ', 'ょ') => "gyo",
        ('し', 'ゃ') => "sha", ('し', 'ゅ') => "shu", ('し', 'ょ') => "sho",
        ('じ', 'ゃ') => "ja", ('じ', 'ゅ') => "ju", ('じ', 'ょ') => "jo",
        ('ち', 'ゃ') => "cha", ('ち', 'ゅ') => "chu", ('ち', 'ょ') => "cho",
        ('に', 'ゃ') => "nya", ('に', 'ゅ') => "nyu", ('に', 'ょ') => "nyo",
        ('ひ', 'ゃ') => "hya", ('ひ', 'ゅ') => "hyu", ('ひ', 'ょ') => "hyo",
        ('び', 'ゃ') => "bya", ('び', 'ゅ') => "byu", ('び', 'ょ') => "byo",
        ('ぴ', 'ゃ') => "pya", ('ぴ', 'ゅ') => "pyu", ('ぴ', 'ょ') => "pyo",
        ('み', 'ゃ') => "mya", ('み', 'ゅ') => "myu", ('み', 'ょ') => "myo",
        ('り', 'ゃ') => "rya", ('り', 'ゅ') => "ryu", ('り', 'ょ') => "ryo",
        ('ゔ', 'ぁ') => "va", ('ゔ', 'ぃ') => "vi", ('ゔ', 'ぇ') => "ve", ('ゔ', 'ぉ') => "vo",
        _ => return None,
    };
    Some(romaji)
}

fn monograph_romaji(c: char) -> Option<&'static str> {
    let romaji = match c {
        'あ' => "a", 'い' => "i", 'う' => "u", 'え' => "e", 'お' => "o",
        'か' => "ka", 'き' => "ki", 'く' => "ku", 'け' => "ke", 'こ' => "ko",
        'が' => "ga", 'ぎ' => "gi", 'ぐ' => "gu", 'げ' => "ge", 'ご' => "go",
        'さ' => "sa", 'し' => "shi", 'す' => "su", 'せ' => "se", 'そ' => "so",
        'ざ' => "za", 'じ' => "ji", 'ず' => "zu", 'ぜ' => "ze", 'ぞ' => "zo",
        'た' => "ta", 'ち' => "chi", 'つ' => "tsu", 'て' => "te", 'と' => "to",
        'だ' => "da", 'ぢ' => "ji", 'づ' => "zu", 'で' => "de", 'ど' => "do",
        'な' => "na", 'に' => "ni", 'ぬ' => "nu", 'ね' => "ne", 'の' => "no",
        'は' => "ha", 'ひ' => "hi", 'ふ' => "fu", 'へ' => "he", 'ほ' => "ho",
        'ば' => "ba", 'び' => "bi", 'ぶ' => "bu", 'べ' => "be", 'ぼ' => "bo",
        'ぱ' => "pa", 'ぴ' => "pi", 'ぷ' => "pu", 'ぺ' => "pe", 'ぽ' => "po",
        'ま' => "ma", 'み' => "mi", 'む' => "mu", 'め' => "me", 'も' => "mo",
        'や' => "ya", 'ゆ' => "yu", 'よ' => "yo",
        'ら' => "ra", 'り' => "ri", 'る' => "ru", 'れ' => "re", 'ろ' => "ro",
        'わ' => "wa", 'を' => "o", 'ん' => "n",
        'ぁ' => "a", 'ぃ' => "i", 'ぅ' => "u", 'ぇ' => "e", 'ぉ' => "o",
        'ゔ' => "vu", 'ゎ' => "wa", 'ゕ' => "ka", 'ゖ' => "ka",
        _ => return None,
    };
    Some(romaji)
}

/// Fold katakana to hiragana. Other characters are kept.
pub fn kata_to_hira(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - KATAKANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Map hiragana to katakana. Marks such as ー and ・ are kept.
pub fn hira_to_kata(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{3041}'..='\u{3096}' => char::from_u32(c as u32 + KATAKANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Convert kana to romaji.
///
/// Digraphs win over single kana, small tsu doubles the next consonant and
/// the long vowel mark repeats the last vowel written. Anything unmapped,
/// including kanji and whitespace, is copied through.
pub fn kana_to_romaji(kana: &str) -> String {
    if kana.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = kata_to_hira(kana).chars().collect();
    let mut out = String::with_capacity(chars.len() * 3);
    let mut last_vowel: Option<char> = None;
    let mut geminate = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == SOKUON {
            geminate = true;
            i += 1;
            continue;
        }
        if c == CHOONPU {
            if let Some(vowel) = last_vowel {
                out.push(vowel);
            }
            geminate = false;
            i += 1;
            continue;
        }

        let digraph = chars.get(i + 1).and_then(|&next| digraph_romaji(c, next));
        let (syllable, width): (Cow<'static, str>, usize) = match digraph {
            Some(romaji) => (Cow::Borrowed(romaji), 2),
            None => match monograph_romaji(c) {
                Some(romaji) => (Cow::Borrowed(romaji), 1),
                None => (Cow::Owned(c.to_string()), 1),
            },
        };
        i += width;

        if geminate {
            if let Some(first) = syllable.chars().next().filter(|&f| is_romaji_consonant(f)) {
                out.push(first);
            }
            geminate = false;
        }
        out.push_str(&syllable);
        if let Some(vowel) = syllable.chars().rev().find(|&v| is_vowel(v)) {
            last_vowel = Some(vowel);
        }
    }

    out
}

fn merge_split_digraphs(input: &str) -> String {
    SPLIT_DIGRAPHS
        .iter()
        .fold(input.to_string(), |acc, (split, merged)| acc.replace(split, merged))
}

/// Longest key in `tables` that prefixes `rest`. Earlier tables win ties.
fn longest_match(rest: &str, tables: &[&[(&'static str, &'static str)]]) -> Option<(&'static str, usize)> {
    (1..=4).rev().find_map(|len| {
        let prefix = rest.get(..len)?;
        tables
            .iter()
            .find_map(|table| table.iter().find(|(key, _)| *key == prefix))
            .map(|(_, kana)| (*kana, len))
    })
}

/// Parse romaji into kana.
///
/// Input is trimmed and lowercased. Returns `None` if any part of the input
/// cannot be matched. Empty input parses to an empty pair.
///
/// Besides the tables, the parser understands:
/// - `n` as ん at the end of input or before anything but a vowel or `y`
///   (an apostrophe after it is swallowed, as in `kon'ya`)
/// - a doubled consonant as っ (`gakkou`)
/// - whitespace, which is copied through
pub fn romaji_to_kana(romaji: &str) -> Option<KanaPair> {
    let input = merge_split_digraphs(&romaji.trim().to_ascii_lowercase());
    let mut hiragana = String::with_capacity(input.len() * 3);
    let mut i = 0;

    while i < input.len() {
        let rest = &input[i..];
        let mut chars = rest.chars();
        let first = chars.next()?;
        let second = chars.next();

        if first.is_whitespace() {
            hiragana.push(first);
            i += first.len_utf8();
            continue;
        }

        if first == 'x' {
            let (kana, len) = longest_match(rest, &[SMALL_KANA])?;
            hiragana.push_str(kana);
            i += len;
            continue;
        }

        if let Some((kana, len)) = longest_match(rest, &[DIGRAPHS, MONOGRAPHS]) {
            hiragana.push_str(kana);
            i += len;
            continue;
        }

        if first == 'n' {
            match second {
                Some(next) if is_vowel(next) || next == 'y' => return None,
                Some('\'') => {
                    hiragana.push('ん');
                    i += 2;
                }
                _ => {
                    hiragana.push('ん');
                    i += 1;
                }
            }
            continue;
        }

        if is_romaji_consonant(first) && second == Some(first) {
            hiragana.push(SOKUON);
            i += 1;
            continue;
        }

        return None;
    }

    Some(KanaPair::from_hiragana(hiragana))
}

/// Forgiving parse for live typing previews.
///
/// Falls back to the longest prefix that parses, so a half-typed syllable
/// such as `kas` still previews as か. Never fails; returns an empty pair
/// when nothing parses.
pub fn romaji_to_kana_relaxed(romaji: &str) -> KanaPair {
    let input = romaji.trim().to_ascii_lowercase();
    if input.is_empty() {
        return KanaPair::default();
    }
    if let Some(pair) = romaji_to_kana(&input) {
        return pair;
    }
    input
        .char_indices()
        .rev()
        .find_map(|(end, _)| romaji_to_kana(&input[..end]))
        .unwrap_or_default()
}

fn is_kana_char(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{31F0}'..='\u{31FF}'
            | '\u{FF66}'..='\u{FF9D}'
    )
}

/// Whether `c` is a CJK ideograph.
pub fn is_kanji(c: char) -> bool {
    matches!(
        c,
        '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}'
    )
}

/// Whether any hiragana or katakana is present.
pub fn has_kana(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}'))
}

/// Whether any kanji is present.
pub fn contains_kanji(s: &str) -> bool {
    s.chars().any(is_kanji)
}

/// Whether every non-space character is kana (including half-width
/// katakana and the ー/・ marks). Blank strings are not kana.
pub fn is_kana_only(s: &str) -> bool {
    let mut seen = false;
    for c in s.chars().filter(|c| !c.is_whitespace()) {
        if !is_kana_char(c) {
            return false;
        }
        seen = true;
    }
    seen
}

/// Whether the string is non-empty ASCII with no kana or kanji.
pub fn is_plain_alphabetic(s: &str) -> bool {
    !s.is_empty() && s.is_ascii() && !has_kana(s) && !contains_kanji(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hira(romaji: &str) -> Option<String> {
        romaji_to_kana(romaji).map(|pair| pair.hiragana)
    }

    #[test]
    fn geminate_and_long_vowel() {
        assert_eq!(kana_to_romaji("がっこう"), "gakkou");
        assert_eq!(kana_to_romaji("ちょっと"), "chotto");
        assert_eq!(kana_to_romaji("まっちゃ"), "maccha");
    }

    #[test]
    fn katakana_is_folded_first() {
        assert_eq!(kana_to_romaji("ラーメン"), "raamen");
        assert_eq!(kana_to_romaji("コーヒー"), "koohii");
        assert_eq!(kana_to_romaji("ヴァイオリン"), "vaiorin");
    }

    #[test]
    fn digraphs_beat_single_kana() {
        assert_eq!(kana_to_romaji("きょう"), "kyou");
        assert_eq!(kana_to_romaji("じゃま"), "jama");
        assert_eq!(kana_to_romaji("しゅくだい"), "shukudai");
    }

    #[test]
    fn unmapped_characters_pass_through() {
        assert_eq!(kana_to_romaji(""), "");
        assert_eq!(kana_to_romaji("日本ご"), "日本go");
        assert_eq!(kana_to_romaji("ねこ と いぬ"), "neko to inu");
        assert_eq!(kana_to_romaji("abc、"), "abc、");
    }

    #[test]
    fn long_mark_without_vowel_emits_nothing() {
        assert_eq!(kana_to_romaji("ー"), "");
        assert_eq!(kana_to_romaji("っ"), "");
    }

    #[test]
    fn parses_plain_syllables() {
        let pair = romaji_to_kana("Konnichiha").unwrap();
        assert_eq!(pair.hiragana, "こんにちは");
        assert_eq!(pair.katakana, "コンニチハ");
        assert_eq!(hira("shinbun").as_deref(), Some("しんぶん"));
        assert_eq!(hira("tsukue").as_deref(), Some("つくえ"));
    }

    #[test]
    fn parses_digraph_spellings() {
        assert_eq!(hira("kyou").as_deref(), Some("きょう"));
        assert_eq!(hira("kixyou").as_deref(), Some("きょう"));
        assert_eq!(hira("shixyumi").as_deref(), Some("しゅみ"));
        assert_eq!(hira("syumi").as_deref(), Some("しゅみ"));
        assert_eq!(hira("jama").as_deref(), Some("じゃま"));
    }

    #[test]
    fn parses_small_kana_and_geminates() {
        assert_eq!(hira("xtsu").as_deref(), Some("っ"));
        assert_eq!(hira("gaxtsukou").as_deref(), Some("がっこう"));
        assert_eq!(hira("gakkou").as_deref(), Some("がっこう"));
        assert_eq!(hira("faxa").as_deref(), None);
        assert_eq!(hira("fuxa").as_deref(), Some("ふぁ"));
    }

    #[test]
    fn nasal_rules() {
        assert_eq!(hira("hon").as_deref(), Some("ほん"));
        assert_eq!(hira("kon'ya").as_deref(), Some("こんや"));
        assert_eq!(hira("konya").as_deref(), Some("こにゃ"));
        assert_eq!(hira("onna").as_deref(), Some("おんな"));
    }

    #[test]
    fn unparseable_input_fails() {
        assert_eq!(hira("q"), None);
        assert_eq!(hira("kq"), None);
        assert_eq!(hira("xq"), None);
        assert_eq!(hira("ねこ"), None);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(romaji_to_kana(""), Some(KanaPair::default()));
        assert_eq!(romaji_to_kana_relaxed("   "), KanaPair::default());
    }

    #[test]
    fn relaxed_falls_back_to_longest_prefix() {
        assert_eq!(romaji_to_kana_relaxed("kas").hiragana, "か");
        assert_eq!(romaji_to_kana_relaxed("nekosh").hiragana, "ねこ");
        assert_eq!(romaji_to_kana_relaxed("neko").katakana, "ネコ");
        assert!(romaji_to_kana_relaxed("q").is_empty());
        assert!(romaji_to_kana_relaxed("ねこ").is_empty());
    }

    #[test]
    fn round_trip_through_romaji() {
        let words = [
            "ねこ", "がっこう", "きょう", "しんぶん", "ありがとう", "じゃま", "ちょっと",
            "さようなら", "ひゃく", "まっちゃ", "てがみ", "ふじさん", "りょこう", "べんきょう",
        ];
        for word in words {
            let romaji = kana_to_romaji(word);
            assert_eq!(hira(&romaji).as_deref(), Some(word), "via {romaji}");
        }
    }

    #[test]
    fn script_conversion() {
        assert_eq!(kata_to_hira("カタカナー"), "かたかなー");
        assert_eq!(hira_to_kata("ひらがな・ゔ"), "ヒラガナ・ヴ");
    }

    #[test]
    fn classification() {
        assert!(is_kana_only("ねこ ネコ"));
        assert!(is_kana_only("ｶﾀｶﾅ"));
        assert!(is_kana_only("コーヒー・ゼリー"));
        assert!(!is_kana_only("猫"));
        assert!(!is_kana_only(""));
        assert!(!is_kana_only("   "));

        assert!(contains_kanji("日本ご"));
        assert!(!contains_kanji("にほんご"));
        assert!(has_kana("日本ご"));

        assert!(is_plain_alphabetic("neko"));
        assert!(!is_plain_alphabetic("ねこ"));
        assert!(!is_plain_alphabetic("café"));
        assert!(!is_plain_alphabetic(""));
    }
}
