use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::from_str;

static WORDS_DIR: Dir = include_dir!("src/words");

/// Bounds on the number of words sampled for one practice text.
pub const MIN_WORDS: usize = 50;
pub const MAX_WORDS: usize = 80;

/// Difficulty tier a session draws its practice words from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    fn file_name(&self) -> &'static str {
        match self {
            Tier::Easy => "easy.json",
            Tier::Medium => "medium.json",
            Tier::Hard => "hard.json",
        }
    }

    /// Load the embedded word list for this tier.
    pub fn word_list(&self) -> WordList {
        WordList::load(self.file_name())
    }
}

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    fn load(file_name: &str) -> Self {
        let file = WORDS_DIR.get_file(file_name).expect("word list not found");

        let file_as_str = file
            .contents_utf8()
            .expect("unable to interpret word list as a string");

        from_str(file_as_str).expect("unable to deserialize word list json")
    }
}

/// Build the practice text for one session: a uniform word count in
/// [MIN_WORDS, MAX_WORDS], each word drawn with replacement from the tier's
/// list, joined by single spaces.
pub fn generate<R: Rng>(tier: Tier, rng: &mut R) -> String {
    let list = tier.word_list();
    let count = rng.gen_range(MIN_WORDS..=MAX_WORDS);

    let mut words: Vec<&str> = Vec::with_capacity(count);
    for _ in 0..count {
        let word = list
            .words
            .choose(&mut *rng)
            .expect("word list is never empty");
        words.push(word.as_str());
    }

    words.join(" ")
}
