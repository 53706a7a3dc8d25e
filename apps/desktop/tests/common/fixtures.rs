//! Test fixtures and factory functions for creating test data.

use kana_review_lib::db::{CardRepository, SqliteRepository};
use kana_review_lib::models::NewCard;
use review_core::CardId;

/// A small dictionary in the three-column layout, with a header row.
pub const DICTIONARY_CSV: &str = "\u{feff}词条,假名,释义\n\
猫,ねこ,猫；猫咪\n\
学校,がっこう,学校\n\
貓,ねこ,猫（异体）\n\
有難う,ありがとう,谢谢\n\
犬,いぬ,狗\n";

/// Sample import file using the Chinese header aliases.
pub fn sample_import_csv(unit: &str, num_cards: usize) -> String {
    let mut csv = String::from("单元,假名,汉字,罗马音,释义\n");
    for i in 0..num_cards {
        csv.push_str(&format!("{unit},かな{i},漢{i},kana{i},意思{i}\n"));
    }
    csv
}

/// Insert a card with kana, kanji and meaning.
pub fn add_word(repo: &SqliteRepository, unit: &str, kana: &str, kanji: &str, meaning: &str) -> CardId {
    repo.add_card(&NewCard::new(unit, kana, meaning).with_kanji(kanji))
        .expect("Failed to add card")
}

/// Insert the three-card "animals" unit used by several tests.
pub fn add_animals(repo: &SqliteRepository) -> Vec<CardId> {
    vec![
        add_word(repo, "动物", "ねこ", "猫", "猫"),
        add_word(repo, "动物", "いぬ", "犬", "狗"),
        add_word(repo, "动物", "とり", "鳥", "鸟"),
    ]
}
