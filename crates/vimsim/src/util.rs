use std::borrow::Borrow;

use radix_trie::{SubTrie, Trie, TrieCommon, TrieKey};

#[allow(unused_macros)]
macro_rules! key {
    ($ch: literal) => {
        $crate::key::Key::new(
            crossterm::event::KeyCode::Char($ch),
            crossterm::event::KeyModifiers::NONE,
        )
    };
    ($kc: expr) => {
        $crate::key::Key::new($kc, crossterm::event::KeyModifiers::NONE)
    };
    ($kc: literal, $km: expr) => {
        $crate::key::Key::new(crossterm::event::KeyCode::Char($kc), $km)
    };
    ($kc: expr, $km: expr) => {
        $crate::key::Key::new($kc, $km)
    };
}

#[allow(unused_macros)]
macro_rules! ctl {
    ($ch: literal) => {
        key!(
            crossterm::event::KeyCode::Char($ch.to_ascii_lowercase()),
            crossterm::event::KeyModifiers::CONTROL
        )
    };
}

macro_rules! strs {
    ( $( $ss: expr ),* ) => {
        vec![ $( String::from($ss), )* ]
    };
}

/// Internal upper limit on number of completions to return.
pub(crate) const MAX_COMPLETIONS: usize = 500;

#[inline]
pub(crate) fn subtrie_keys<K, V>(subtrie: SubTrie<K, V>) -> Vec<K>
where
    K: Clone + TrieKey,
{
    subtrie.keys().take(MAX_COMPLETIONS).cloned().collect()
}

#[inline]
pub(crate) fn completion_keys<K, V>(trie: &Trie<K, V>, prefix: &str) -> Vec<K>
where
    K: Borrow<str> + Clone + TrieKey,
{
    trie.get_raw_descendant(prefix).map(subtrie_keys).unwrap_or_default()
}

#[inline]
pub(crate) fn sort2<T>(a: T, b: T) -> (T, T)
where
    T: Ord,
{
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Convert a character index within `s` into a byte offset, clamping to the end of the string.
pub(crate) fn byte_offset(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map(|(off, _)| off).unwrap_or(s.len())
}

/// Convert a byte offset within `s` into a character index.
pub(crate) fn char_index(s: &str, off: usize) -> usize {
    let off = off.min(s.len());

    s.char_indices().take_while(|(i, _)| *i < off).count()
}
