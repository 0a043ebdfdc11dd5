use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::models::{LetterGroup, MovieRecord};

/// Index letters in display order; `#` collects titles that don't start with A-Z
pub const ALPHABET: &str = "#ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letter used for titles outside A-Z
pub const OTHER_LETTER: char = '#';

/// Index letter of a title: the uppercased first character if it is A-Z, `#` otherwise
pub fn index_letter(title: &str) -> char {
    match title.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(c) if c.is_ascii_uppercase() => c,
        _ => OTHER_LETTER,
    }
}

/// Ordering of index letters in the grouped list
///
/// Case-insensitive first; exact comparison only breaks ties so the order stays total.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Partition an already title-sorted page into letter groups
///
/// Members keep their encounter order; only the groups themselves are sorted.
pub fn group_by_letter(items: &[MovieRecord]) -> Vec<LetterGroup> {
    let mut groups: Vec<LetterGroup> = Vec::new();
    let mut positions: HashMap<char, usize> = HashMap::new();

    for movie in items {
        let letter = index_letter(&movie.title);
        match positions.get(&letter) {
            Some(&idx) => groups[idx].members.push(movie.clone()),
            None => {
                positions.insert(letter, groups.len());
                groups.push(LetterGroup {
                    letter,
                    members: vec![movie.clone()],
                });
            }
        }
    }

    groups.sort_by(|a, b| collate(&a.letter.to_string(), &b.letter.to_string()));
    groups
}

/// Letters that have at least one group
pub fn available_letters(groups: &[LetterGroup]) -> BTreeSet<char> {
    groups.iter().map(|group| group.letter).collect()
}
