//! Finds where inside a word a stretch reads naturally.

const VOWELS: &str = "aeiouy";
const SONORANTS: &str = "rlmnwyh";
const SIBILANTS: &str = "sz";
const DIGRAPHS: &[&str] = &[
    "aa", "ae", "ai", "ay", "ee", "ei", "ey", "ie", "io", "oa", "oe", "oi", "oo", "ou", "ua", "ue",
    "ui", "ya", "yo", "yu",
];

/// The phonological shape of a stretch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// A single vowel or non-digraph vowel run
    Vowel,
    /// A vowel run containing a common digraph
    Digraph,
    /// The vowel of a consonant-vowel-consonant-`e` ending
    Cvce,
    /// A final sibilant or sonorant after a vowel
    Coda,
    /// The last letter of a vowelless word
    Consonant,
}

/// A half-open char range of a word to lengthen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StretchSite {
    pub start: usize,
    pub end: usize,
    pub kind: SiteKind,
}

fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Maximal vowel runs over the alphabetic characters, as char ranges.
fn vowel_clusters(chars: &[char], alpha: &[usize]) -> Vec<(usize, usize)> {
    let mut clusters = Vec::new();
    let mut start: Option<usize> = None;
    let mut previous: Option<usize> = None;
    for &index in alpha {
        if is_vowel(chars[index]) {
            match (start, previous) {
                (None, _) => start = Some(index),
                (Some(open), Some(prev)) if index != prev + 1 => {
                    clusters.push((open, prev + 1));
                    start = Some(index);
                }
                _ => {}
            }
        } else if let Some(open) = start.take() {
            clusters.push((open, index));
        }
        previous = Some(index);
    }
    if let (Some(open), Some(prev)) = (start, previous) {
        clusters.push((open, prev + 1));
    }
    clusters
}

/// Picks the best site to stretch in `word`, if any.
///
/// Final `s`/`z` codas after a single vowel rank highest, then sonorant
/// codas and silent-`e` vowels, then the last vowel run, then any other
/// vowel run. Longer sites win ties, then earlier ones.
pub fn find_stretch_site(word: &str) -> Option<StretchSite> {
    let chars: Vec<char> = word.chars().map(lower).collect();
    let alpha: Vec<usize> = word
        .chars()
        .enumerate()
        .filter(|(_, c)| c.is_alphabetic())
        .map(|(index, _)| index)
        .collect();
    let &last = alpha.last()?;

    let clusters = vowel_clusters(&chars, &alpha);
    let last_char = chars[last];
    let previous_vowel = alpha.len() >= 2 && is_vowel(chars[alpha[alpha.len() - 2]]);
    let multi_vowel = clusters
        .iter()
        .any(|&(start, end)| end - start >= 2 && !(start == 0 && chars[start] == 'y'));

    let mut candidates: Vec<(u8, StretchSite)> = Vec::new();
    let site = |start: usize, end: usize, kind: SiteKind| StretchSite { start, end, kind };

    if SIBILANTS.contains(last_char) && previous_vowel && !multi_vowel {
        candidates.push((5, site(last, last + 1, SiteKind::Coda)));
    } else if SONORANTS.contains(last_char) && previous_vowel && !multi_vowel {
        candidates.push((4, site(last, last + 1, SiteKind::Coda)));
    } else if clusters.is_empty() {
        candidates.push((2, site(last, last + 1, SiteKind::Consonant)));
    }

    if chars.last() == Some(&'e') && alpha.len() >= 3 && chars[last] == 'e' {
        let consonant = alpha[alpha.len() - 2];
        let vowel = alpha[alpha.len() - 3];
        if !is_vowel(chars[consonant]) && is_vowel(chars[vowel]) {
            candidates.push((4, site(vowel, vowel + 1, SiteKind::Cvce)));
        }
    }

    for (position, &(start, end)) in clusters.iter().enumerate() {
        let run: String = chars[start..end].iter().collect();
        let kind = if DIGRAPHS.iter().any(|digraph| run.contains(digraph)) {
            SiteKind::Digraph
        } else {
            SiteKind::Vowel
        };
        let priority = if position + 1 == clusters.len() { 3 } else { 2 };
        candidates.push((priority, site(start, end, kind)));
    }

    candidates
        .into_iter()
        .max_by(|(pa, a), (pb, b)| {
            pa.cmp(pb)
                .then((a.end - a.start).cmp(&(b.end - b.start)))
                .then(b.start.cmp(&a.start))
        })
        .map(|(_, site)| site)
}

/// Repeats every char of `site` an extra `repeats` times.
pub fn apply_stretch(word: &str, site: StretchSite, repeats: usize) -> String {
    let mut out = String::with_capacity(word.len() + repeats * (site.end - site.start));
    for (index, c) in word.chars().enumerate() {
        out.push(c);
        if (site.start..site.end).contains(&index) {
            out.extend(std::iter::repeat(c).take(repeats));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stretched(word: &str, repeats: usize) -> String {
        let site = find_stretch_site(word).unwrap();
        apply_stretch(word, site, repeats)
    }

    #[test]
    fn test_sibilant_coda_wins() {
        let site = find_stretch_site("yes").unwrap();
        assert_eq!(site.kind, SiteKind::Coda);
        assert_eq!(stretched("yes", 2), "yesss");
    }

    #[test]
    fn test_digraph_outranks_sonorant() {
        let site = find_stretch_site("cool").unwrap();
        assert_eq!(site.kind, SiteKind::Digraph);
        assert_eq!(stretched("cool", 1), "cooool");
    }

    #[test]
    fn test_open_vowel_ending() {
        assert_eq!(stretched("so", 3), "soooo");
        assert_eq!(stretched("No", 2), "Nooo");
    }

    #[test]
    fn test_vowelless_word_stretches_last_letter() {
        let site = find_stretch_site("hmm").unwrap();
        assert_eq!(site.kind, SiteKind::Consonant);
        assert_eq!(stretched("hmm", 2), "hmmmm");
    }

    #[test]
    fn test_sonorant_coda() {
        let site = find_stretch_site("fun").unwrap();
        assert_eq!(site.kind, SiteKind::Coda);
        assert_eq!(stretched("fun", 2), "funnn");
    }

    #[test]
    fn test_non_alphabetic_word_has_no_site() {
        assert_eq!(find_stretch_site("123"), None);
    }
}
