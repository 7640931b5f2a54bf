use serde::{Deserialize, Serialize};

/// Consonant group (gyō). The first ten are the plain rows, the last five
/// carry dakuten/handakuten.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Row {
    A,
    Ka,
    Sa,
    Ta,
    Na,
    Ha,
    Ma,
    Ya,
    Ra,
    Wa,
    Ga,
    Za,
    Da,
    Ba,
    Pa,
}

impl Row {
    pub const PLAIN: [Row; 10] = [
        Row::A,
        Row::Ka,
        Row::Sa,
        Row::Ta,
        Row::Na,
        Row::Ha,
        Row::Ma,
        Row::Ya,
        Row::Ra,
        Row::Wa,
    ];

    pub const DIACRITIC: [Row; 5] = [Row::Ga, Row::Za, Row::Da, Row::Ba, Row::Pa];

    pub fn label(self) -> &'static str {
        match self {
            Row::A => "あ",
            Row::Ka => "か",
            Row::Sa => "さ",
            Row::Ta => "た",
            Row::Na => "な",
            Row::Ha => "は",
            Row::Ma => "ま",
            Row::Ya => "や",
            Row::Ra => "ら",
            Row::Wa => "わ",
            Row::Ga => "が",
            Row::Za => "ざ",
            Row::Da => "だ",
            Row::Ba => "ば",
            Row::Pa => "ぱ",
        }
    }

    pub fn is_diacritic(self) -> bool {
        Self::DIACRITIC.contains(&self)
    }

    /// Plain rows followed by diacritic rows, the order the grid uses.
    pub fn all() -> impl Iterator<Item = Row> {
        Self::PLAIN.into_iter().chain(Self::DIACRITIC)
    }
}

/// Vowel group (dan), plus the lone ん.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    A,
    I,
    U,
    E,
    O,
    N,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::A,
        Column::I,
        Column::U,
        Column::E,
        Column::O,
        Column::N,
    ];

    /// The five vowel columns, without ん.
    pub const VOWELS: [Column; 5] = [Column::A, Column::I, Column::U, Column::E, Column::O];

    pub fn label(self) -> &'static str {
        match self {
            Column::A => "あ",
            Column::I => "い",
            Column::U => "う",
            Column::E => "え",
            Column::O => "お",
            Column::N => "ん",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Kana {
    pub hiragana: &'static str,
    pub katakana: &'static str,
    pub romaji: &'static str,
    pub row: Row,
    pub column: Column,
}

impl Kana {
    /// Identity key across the whole table.
    pub fn key(&self) -> &'static str {
        self.hiragana
    }
}

const fn kana(
    hiragana: &'static str,
    katakana: &'static str,
    romaji: &'static str,
    row: Row,
    column: Column,
) -> Kana {
    Kana {
        hiragana,
        katakana,
        romaji,
        row,
        column,
    }
}

pub static TABLE: [Kana; 71] = [
    kana("あ", "ア", "a", Row::A, Column::A),
    kana("い", "イ", "i", Row::A, Column::I),
    kana("う", "ウ", "u", Row::A, Column::U),
    kana("え", "エ", "e", Row::A, Column::E),
    kana("お", "オ", "o", Row::A, Column::O),
    kana("か", "カ", "ka", Row::Ka, Column::A),
    kana("き", "キ", "ki", Row::Ka, Column::I),
    kana("く", "ク", "ku", Row::Ka, Column::U),
    kana("け", "ケ", "ke", Row::Ka, Column::E),
    kana("こ", "コ", "ko", Row::Ka, Column::O),
    kana("さ", "サ", "sa", Row::Sa, Column::A),
    kana("し", "シ", "shi", Row::Sa, Column::I),
    kana("す", "ス", "su", Row::Sa, Column::U),
    kana("せ", "セ", "se", Row::Sa, Column::E),
    kana("そ", "ソ", "so", Row::Sa, Column::O),
    kana("た", "タ", "ta", Row::Ta, Column::A),
    kana("ち", "チ", "chi", Row::Ta, Column::I),
    kana("つ", "ツ", "tsu", Row::Ta, Column::U),
    kana("て", "テ", "te", Row::Ta, Column::E),
    kana("と", "ト", "to", Row::Ta, Column::O),
    kana("な", "ナ", "na", Row::Na, Column::A),
    kana("に", "ニ", "ni", Row::Na, Column::I),
    kana("ぬ", "ヌ", "nu", Row::Na, Column::U),
    kana("ね", "ネ", "ne", Row::Na, Column::E),
    kana("の", "ノ", "no", Row::Na, Column::O),
    kana("は", "ハ", "ha", Row::Ha, Column::A),
    kana("ひ", "ヒ", "hi", Row::Ha, Column::I),
    kana("ふ", "フ", "fu", Row::Ha, Column::U),
    kana("へ", "ヘ", "he", Row::Ha, Column::E),
    kana("ほ", "ホ", "ho", Row::Ha, Column::O),
    kana("ま", "マ", "ma", Row::Ma, Column::A),
    kana("み", "ミ", "mi", Row::Ma, Column::I),
    kana("む", "ム", "mu", Row::Ma, Column::U),
    kana("め", "メ", "me", Row::Ma, Column::E),
    kana("も", "モ", "mo", Row::Ma, Column::O),
    kana("や", "ヤ", "ya", Row::Ya, Column::A),
    kana("ゆ", "ユ", "yu", Row::Ya, Column::U),
    kana("よ", "ヨ", "yo", Row::Ya, Column::O),
    kana("ら", "ラ", "ra", Row::Ra, Column::A),
    kana("り", "リ", "ri", Row::Ra, Column::I),
    kana("る", "ル", "ru", Row::Ra, Column::U),
    kana("れ", "レ", "re", Row::Ra, Column::E),
    kana("ろ", "ロ", "ro", Row::Ra, Column::O),
    kana("わ", "ワ", "wa", Row::Wa, Column::A),
    kana("を", "ヲ", "wo", Row::Wa, Column::O),
    kana("ん", "ン", "n", Row::Wa, Column::N),
    kana("が", "ガ", "ga", Row::Ga, Column::A),
    kana("ぎ", "ギ", "gi", Row::Ga, Column::I),
    kana("ぐ", "グ", "gu", Row::Ga, Column::U),
    kana("げ", "ゲ", "ge", Row::Ga, Column::E),
    kana("ご", "ゴ", "go", Row::Ga, Column::O),
    kana("ざ", "ザ", "za", Row::Za, Column::A),
    kana("じ", "ジ", "ji", Row::Za, Column::I),
    kana("ず", "ズ", "zu", Row::Za, Column::U),
    kana("ぜ", "ゼ", "ze", Row::Za, Column::E),
    kana("ぞ", "ゾ", "zo", Row::Za, Column::O),
    kana("だ", "ダ", "da", Row::Da, Column::A),
    kana("ぢ", "ヂ", "ji", Row::Da, Column::I),
    kana("づ", "ヅ", "zu", Row::Da, Column::U),
    kana("で", "デ", "de", Row::Da, Column::E),
    kana("ど", "ド", "do", Row::Da, Column::O),
    kana("ば", "バ", "ba", Row::Ba, Column::A),
    kana("び", "ビ", "bi", Row::Ba, Column::I),
    kana("ぶ", "ブ", "bu", Row::Ba, Column::U),
    kana("べ", "ベ", "be", Row::Ba, Column::E),
    kana("ぼ", "ボ", "bo", Row::Ba, Column::O),
    kana("ぱ", "パ", "pa", Row::Pa, Column::A),
    kana("ぴ", "ピ", "pi", Row::Pa, Column::I),
    kana("ぷ", "プ", "pu", Row::Pa, Column::U),
    kana("ぺ", "ペ", "pe", Row::Pa, Column::E),
    kana("ぽ", "ポ", "po", Row::Pa, Column::O),
];

pub fn lookup(key: &str) -> Option<&'static Kana> {
    TABLE.iter().find(|k| k.hiragana == key)
}

/// The kana at a given row/column slot, if the slot is populated.
pub fn at(row: Row, column: Column) -> Option<&'static Kana> {
    TABLE.iter().find(|k| k.row == row && k.column == column)
}

/// Position of a kana in table order. Used to restore table order after
/// set operations on a subset.
pub fn table_index(kana: &Kana) -> usize {
    TABLE
        .iter()
        .position(|k| k.hiragana == kana.hiragana)
        .unwrap_or(TABLE.len())
}
