//! First-occurrence substring search, used by `REPLACEONE`.
//!
//! The default engine is a Boyer-Moore automaton: the pattern is compared
//! against the text right to left, and after a mismatch the alignment moves
//! by the larger of a good-suffix shift (derived from the prefix functions of
//! the pattern and of the reversed pattern) and a stop-symbol shift.
//!
//! All engines work on bytes of UTF-8 text. A byte-wise match of valid UTF-8
//! always starts and ends on character boundaries, so the returned offsets
//! can be used to slice the text directly.
use std::{fmt, hash::Hash, str::FromStr};

use rustc_hash::FxHashMap as HashMap;
use thiserror::Error;

/// Which search engine `REPLACEONE` uses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SearchAlgorithm {
    #[default]
    BoyerMoore,
    RabinKarp,
    Naive,
}

impl SearchAlgorithm {
    pub const ALL: [SearchAlgorithm; 3] =
        [SearchAlgorithm::BoyerMoore, SearchAlgorithm::RabinKarp, SearchAlgorithm::Naive];

    /// Byte offset of the first occurrence of `pattern` in `text`.
    pub fn find(self, text: &str, pattern: &str) -> Option<usize> {
        match self {
            SearchAlgorithm::BoyerMoore => find(text, pattern),
            SearchAlgorithm::RabinKarp => rabin_karp(text.as_bytes(), pattern.as_bytes()),
            SearchAlgorithm::Naive => naive(text.as_bytes(), pattern.as_bytes()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown search algorithm `{0}` (expected `boyer-moore`, `rabin-karp` or `naive`)")]
pub struct UnknownSearchAlgorithm(pub String);

impl FromStr for SearchAlgorithm {
    type Err = UnknownSearchAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boyer-moore" | "bm" => Ok(SearchAlgorithm::BoyerMoore),
            "rabin-karp" | "rk" => Ok(SearchAlgorithm::RabinKarp),
            "naive" => Ok(SearchAlgorithm::Naive),
            _ => Err(UnknownSearchAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchAlgorithm::BoyerMoore => "boyer-moore",
            SearchAlgorithm::RabinKarp => "rabin-karp",
            SearchAlgorithm::Naive => "naive",
        })
    }
}

/// Byte offset of the first occurrence of `pattern` in `text`, using [`BoyerMoore`].
///
/// An empty pattern is found at offset 0, a pattern longer than the text is
/// never found.
///
/// # Example
/// ```
/// assert_eq!(robot::search::find("Hello World", "World"), Some(6));
/// assert_eq!(robot::search::find("Hello World", "world"), None);
/// ```
pub fn find(text: &str, pattern: &str) -> Option<usize> {
    BoyerMoore::new(pattern.as_bytes()).find(text.as_bytes())
}

/// A preprocessed pattern that can be searched for in any number of texts.
#[derive(Clone, Debug)]
pub struct BoyerMoore<'p, T> {
    pattern: &'p [T],
    /// Shift by the number of trailing characters that matched before the mismatch.
    good_suffix: Vec<usize>,
    /// For every symbol of the pattern except its last position: 1 + its
    /// right-most index.
    stop_symbols: HashMap<T, usize>,
}

impl<'p, T: Copy + Eq + Hash> BoyerMoore<'p, T> {
    pub fn new(pattern: &'p [T]) -> Self {
        Self {
            pattern,
            good_suffix: good_suffix_table(pattern),
            stop_symbols: stop_symbol_table(pattern),
        }
    }

    pub fn find(&self, text: &[T]) -> Option<usize> {
        let m = self.pattern.len();
        if m == 0 {
            return Some(0);
        }
        if text.len() < m {
            return None;
        }

        // `end` is the text index aligned with the last symbol of the pattern.
        let mut end = m - 1;
        while end < text.len() {
            let matched = self.pattern.iter().rev()
                .zip(text[..=end].iter().rev())
                .take_while(|(p, t)| p == t)
                .count();
            if matched == m {
                return Some(end + 1 - m);
            }

            let mismatch = m - 1 - matched;
            let bad_symbol = text[end - matched];
            let stop_shift = (mismatch + 1)
                .saturating_sub(self.stop_symbols.get(&bad_symbol).copied().unwrap_or(0));

            end += self.good_suffix[matched].max(stop_shift);
        }
        None
    }
}

/// `pi[i]` is the length of the longest proper prefix of `s[..=i]` that is also its suffix.
pub fn prefix_function<T: Eq>(s: &[T]) -> Vec<usize> {
    let mut pi = vec![0; s.len()];
    let mut k = 0;
    for i in 1..s.len() {
        while k > 0 && s[k] != s[i] {
            k = pi[k - 1];
        }
        if s[k] == s[i] {
            k += 1;
        }
        pi[i] = k;
    }
    pi
}

/// The prefix function of the reversed string.
pub fn suffix_function<T: Copy + Eq>(s: &[T]) -> Vec<usize> {
    let reversed: Vec<T> = s.iter().rev().copied().collect();
    prefix_function(&reversed)
}

/// Good-suffix shifts indexed by the number of matched trailing symbols,
/// `pattern.len() + 1` entries.
fn good_suffix_table<T: Copy + Eq>(pattern: &[T]) -> Vec<usize> {
    let m = pattern.len();
    let prefix = prefix_function(pattern);
    let suffix = suffix_function(pattern);

    // Without a better candidate, shift by the period of the pattern.
    let period = m - prefix.last().copied().unwrap_or(0);
    let mut table = vec![period; m + 1];
    for i in 1..=m {
        let border = suffix[i - 1];
        let j = m - border;
        table[j] = table[j].min(i - border);
    }
    table.reverse();
    table
}

fn stop_symbol_table<T: Copy + Eq + Hash>(pattern: &[T]) -> HashMap<T, usize> {
    let mut table = HashMap::default();
    for i in (0..pattern.len().saturating_sub(1)).rev() {
        table.entry(pattern[i]).or_insert(i + 1);
    }
    table
}

/// Rabin-Karp search with a shift-and-add rolling hash over bytes.
/// Every hash hit is verified against the text.
pub fn rabin_karp(text: &[u8], pattern: &[u8]) -> Option<usize> {
    let m = pattern.len();
    if m == 0 {
        return Some(0);
    }
    if text.len() < m {
        return None;
    }

    fn hash(bytes: &[u8]) -> u64 {
        bytes.iter().fold(0u64, |h, &b| (h << 1).wrapping_add(b as u64))
    }
    // Weight of the outgoing byte; it has been shifted out entirely once the
    // window is wider than the hash.
    let leading_weight = |b: u8| {
        u32::try_from(m - 1).ok().and_then(|bits| (b as u64).checked_shl(bits)).unwrap_or(0)
    };

    let pattern_hash = hash(pattern);
    let mut window = hash(&text[..m]);
    for start in 0..=text.len() - m {
        if start != 0 {
            window = (window.wrapping_sub(leading_weight(text[start - 1])) << 1)
                .wrapping_add(text[start + m - 1] as u64);
        }
        if window == pattern_hash && &text[start..start + m] == pattern {
            return Some(start);
        }
    }
    None
}

/// Reference left-to-right search.
pub fn naive<T: Eq>(text: &[T], pattern: &[T]) -> Option<usize> {
    if pattern.is_empty() {
        return Some(0);
    }
    text.windows(pattern.len()).position(|window| window == pattern)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};

    use super::*;

    fn all_agree(text: &str, pattern: &str) -> Option<usize> {
        let expected = naive(text.as_bytes(), pattern.as_bytes());
        for algorithm in SearchAlgorithm::ALL {
            assert_eq!(algorithm.find(text, pattern), expected, "{algorithm} on {text:?} / {pattern:?}");
        }
        expected
    }

    #[test]
    fn test_prefix_function() {
        assert_eq!(prefix_function(b"abacaba"), vec![0, 0, 1, 0, 1, 2, 3]);
        assert_eq!(prefix_function(b"aaaa"), vec![0, 1, 2, 3]);
        assert_eq!(prefix_function::<u8>(b""), Vec::<usize>::new());
        assert_eq!(suffix_function(b"abcab"), prefix_function(b"bacba"));
    }

    #[test]
    fn test_good_suffix_table() {
        // no border: the whole pattern is the period
        assert_eq!(good_suffix_table(b"abc"), vec![1, 3, 3, 3]);
        assert_eq!(good_suffix_table(b"aaa"), vec![1, 1, 1, 1]);
        assert_eq!(good_suffix_table(b"abab").len(), 5);
    }

    #[test]
    fn test_stop_symbol_table() {
        let table = stop_symbol_table(b"abcab");
        assert_eq!(table.get(&b'a'), Some(&4));
        assert_eq!(table.get(&b'c'), Some(&3));
        // the last position is not part of the table
        assert_eq!(table.get(&b'b'), Some(&2));
        assert_eq!(table.get(&b'z'), None);
        assert!(stop_symbol_table(b"x").is_empty());
    }

    #[test]
    fn test_basic() {
        assert_eq!(all_agree("Hello World", "World"), Some(6));
        assert_eq!(all_agree("Hello World", "o"), Some(4));
        assert_eq!(all_agree("Hello World", "Hello World"), Some(0));
        assert_eq!(all_agree("Hello World", "d"), Some(10));
        assert_eq!(all_agree("Hello World", "x"), None);
        assert_eq!(all_agree("abababc", "ababc"), Some(2));
        assert_eq!(all_agree("aaaaab", "aab"), Some(3));
    }

    #[test]
    fn test_boundaries() {
        // empty pattern is found immediately
        assert_eq!(all_agree("", ""), Some(0));
        assert_eq!(all_agree("abc", ""), Some(0));
        // pattern longer than text
        assert_eq!(all_agree("", "a"), None);
        assert_eq!(all_agree("ab", "abc"), None);
    }

    #[test]
    fn test_multibyte() {
        let text = "příliš žluťoučký kůň";
        let found = all_agree(text, "kůň").unwrap();
        assert!(text.is_char_boundary(found));
        assert_eq!(&text[found..], "kůň");
        assert_eq!(all_agree("ůů", "ů"), Some(0));
    }

    #[test]
    fn test_long_pattern_hash() {
        // wider than the 64-bit hash window
        let pattern = "ab".repeat(50);
        let text = format!("{}{}", "a".repeat(100), pattern);
        assert_eq!(all_agree(&text, &pattern), Some(100));
    }

    #[test]
    fn test_reusable_automaton() {
        let bm = BoyerMoore::new(&[1, 2, 1][..]);
        assert_eq!(bm.find(&[0, 1, 2, 1, 2, 1]), Some(1));
        assert_eq!(bm.find(&[1, 2]), None);
        assert_eq!(bm.find(&[2, 1, 1, 2, 1]), Some(2));
    }

    #[test]
    fn test_random_against_naive() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for alphabet in [&b"ab"[..], &b"abc"[..], &b"abcd"[..]] {
            for _ in 0..5_000 {
                let text_len = rng.random_range(0..40);
                let pattern_len = rng.random_range(0..7);
                let text: String = (0..text_len).map(|_| alphabet[rng.random_range(0..alphabet.len())] as char).collect();
                let pattern: String = (0..pattern_len).map(|_| alphabet[rng.random_range(0..alphabet.len())] as char).collect();
                all_agree(&text, &pattern);
            }
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("boyer-moore".parse(), Ok(SearchAlgorithm::BoyerMoore));
        assert_eq!("RK".parse(), Ok(SearchAlgorithm::RabinKarp));
        assert_eq!("naive".parse(), Ok(SearchAlgorithm::Naive));
        assert!("kmp".parse::<SearchAlgorithm>().is_err());
        for algorithm in SearchAlgorithm::ALL {
            assert_eq!(algorithm.to_string().parse(), Ok(algorithm));
        }
    }
}
