use std::collections::{HashMap, HashSet};

use regex::Regex;
use stop_words::{get, LANGUAGE};

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "thousand", "million", "billion", "trillion",
];

/// Maps an inflected, lowercase word to its dictionary form.
pub trait Lemmatizer {
    fn lemma(&self, word: &str) -> String;
}

/// English lemmatizer for the vocabulary of scientific abstracts: an
/// irregular-form table, plural suffix rules and -ed/-ing rules that undo a
/// doubled final consonant ("running") or restore a dropped final e
/// ("measured").
pub struct RuleLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Default for RuleLemmatizer {
    fn default() -> Self {
        let irregular = [
            ("children", "child"), ("people", "person"), ("men", "man"), ("women", "woman"),
            ("mice", "mouse"), ("feet", "foot"), ("teeth", "tooth"), ("geese", "goose"),
            ("analyses", "analysis"), ("hypotheses", "hypothesis"), ("theses", "thesis"),
            ("diagnoses", "diagnosis"), ("syntheses", "synthesis"), ("meta-analyses", "meta-analysis"),
            ("criteria", "criterion"), ("phenomena", "phenomenon"), ("indices", "index"),
            ("matrices", "matrix"), ("stimuli", "stimulus"), ("nuclei", "nucleus"),
            ("loci", "locus"), ("foci", "focus"), ("cortices", "cortex"), ("vertices", "vertex"),
            ("appendices", "appendix"), ("bases", "basis"),
            ("found", "find"), ("shown", "show"), ("showed", "show"), ("known", "know"),
            ("taken", "take"), ("given", "give"), ("made", "make"), ("led", "lead"),
            ("held", "hold"), ("thought", "think"), ("brought", "bring"), ("seen", "see"),
            ("chosen", "choose"), ("drawn", "draw"), ("written", "write"), ("left", "leave"),
            ("better", "well"), ("best", "well"), ("worse", "bad"), ("worst", "bad"),
            ("focused", "focus"), ("focusing", "focus"), ("biased", "bias"), ("agreed", "agree"),
            ("created", "create"), ("creating", "create"), ("guided", "guide"), ("guiding", "guide"),
            ("interfered", "interfere"), ("interfering", "interfere"), ("explored", "explore"),
            ("exploring", "explore"), ("controlled", "control"), ("controlling", "control"),
            ("labelled", "label"), ("labelling", "label"), ("modelled", "model"), ("modelling", "model"),
            ("cited", "cite"), ("citing", "cite"), ("writing", "write"), ("underlying", "underlie"),
        ]
        .into_iter()
        .collect();

        let invariant = [
            "bias", "alias", "atlas", "lens", "gas", "news", "series", "species", "diabetes",
            "mathematics", "physics", "economics", "ethics", "genetics", "linguistics",
            "politics", "statistics", "always", "perhaps", "whereas", "thus", "various",
            "across", "less", "unless", "yes", "its", "this", "was", "has", "does", "is",
            "corpus", "status", "virus", "focus", "consensus", "stimulus", "apparatus",
            "analysis", "basis", "thesis", "axis", "crisis", "emphasis", "hypothesis",
            "diagnosis", "synthesis", "prognosis", "dyslexia", "aphasia", "ataxia",
            "during", "morning", "evening", "ceiling", "sibling", "nothing", "something",
            "anything", "everything", "ongoing", "spring", "hundred", "kindred", "sacred",
            "naked", "wicked",
        ]
        .into_iter()
        .collect();

        RuleLemmatizer { irregular, invariant }
    }
}

impl Lemmatizer for RuleLemmatizer {
    fn lemma(&self, word: &str) -> String {
        if let Some(lemma) = self.irregular.get(word) {
            return lemma.to_string();
        }
        if self.invariant.contains(word) || word.chars().count() <= 3 {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
        if let Some(stem) = word.strip_suffix("ied") {
            return format!("{stem}y");
        }
        if let Some(stem) = word.strip_suffix("ing") {
            if stem.chars().count() >= 2 && has_vowel(stem) {
                return verb_base(stem);
            }
        }
        if let Some(stem) = word.strip_suffix("ed") {
            // "need", "speed", "agreed": nothing to undo after a double e.
            if stem.chars().count() >= 2 && has_vowel(stem) && !stem.ends_with('e') {
                return verb_base(stem);
            }
        }
        if word.ends_with("sses") || word.ends_with("ches") || word.ends_with("shes") || word.ends_with("xes") {
            return word[..word.len() - 2].to_string();
        }
        if word.ends_with('s')
            && !word.ends_with("ss")
            && !word.ends_with("us")
            && !word.ends_with("is")
            && !word.ends_with("ous")
        {
            return word[..word.len() - 1].to_string();
        }

        word.to_string()
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

fn has_vowel(stem: &str) -> bool {
    stem.chars().any(is_vowel)
}

/// Base form of a verb stem left after stripping -ed or -ing.
fn verb_base(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    let (last, prev) = (chars[n - 1], chars[n - 2]);
    let before = if n >= 3 { Some(chars[n - 3]) } else { None };

    if last == prev && !is_vowel(last) && !matches!(last, 'l' | 's' | 'f' | 'z') {
        // "add" keeps its double letter, "runn" and "stopp" lose one.
        return if n > 3 { chars[..n - 1].iter().collect() } else { stem.to_string() };
    }

    if restores_final_e(prev, last, before, n) {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

/// Whether a verb stem lost a silent e before its suffix ("increas", "requir",
/// "activat", "enabl").
fn restores_final_e(prev: char, last: char, before: Option<char>, len: usize) -> bool {
    let after_consonant = before.map_or(true, |c| !is_vowel(c));
    match (prev, last) {
        (_, 'u' | 'v' | 'z' | 'c') => true,
        (p, 's') => p != 's',
        ('a' | 'd', 'g') => true,
        ('n', 'g') => len >= 5 && matches!(before, Some('a' | 'e')),
        ('b' | 'p' | 't' | 'd' | 'k' | 'g' | 'z' | 'c', 'l') => true,
        ('u' | 'i', 'r') => !matches!(before, Some('a' | 'e' | 'o')),
        ('a', 'r') => after_consonant,
        ('o', 'r') => matches!(before, Some('c' | 'n')),
        ('a' | 'u' | 'o', 't') => after_consonant,
        ('e', 't') => before == Some('l'),
        ('i' | 'o' | 'u', 'd') => after_consonant,
        ('a' | 'u' | 'i', 'm') => after_consonant,
        ('i', 'n') => after_consonant,
        ('a' | 'o' | 'i', 'k') => after_consonant,
        ('i', 'b') => true,
        _ => false,
    }
}

/// Tokenizes, filters and lemmatizes raw document text.
pub struct Preprocessor {
    stop_words: HashSet<String>,
    lemmatizer: Box<dyn Lemmatizer + Send + Sync>,
    token_re: Regex,
}

impl Preprocessor {
    pub fn new(extra_stop_words: &[String]) -> Self {
        Self::with_lemmatizer(extra_stop_words, Box::new(RuleLemmatizer::default()))
    }

    pub fn with_lemmatizer(extra_stop_words: &[String], lemmatizer: Box<dyn Lemmatizer + Send + Sync>) -> Self {
        let mut stop_words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        stop_words.extend(extra_stop_words.iter().map(|w| w.to_lowercase()));

        // Letter/digit runs, clitics such as 's, or a single symbol.
        let token_re = Regex::new(r"'\p{L}+|[\p{L}\p{N}]+|[^\s\p{L}\p{N}]").expect("valid token regex");

        Preprocessor { stop_words, lemmatizer, token_re }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.token_re.find_iter(text).map(|m| m.as_str())
    }

    pub fn clean(&self, text: &str) -> Vec<String> {
        self.tokenize(text)
            .filter_map(|token| {
                let lower = token.to_lowercase();
                if !is_alpha(token) || self.is_stop_word(&lower) || like_num(&lower) {
                    return None;
                }
                let lemma = self.lemmatizer.lemma(&lower);
                let lemma = lemma.trim();
                if lemma.is_empty() {
                    None
                } else {
                    Some(lemma.to_string())
                }
            })
            .collect()
    }

    pub fn clean_all(&self, texts: &[String]) -> Vec<Vec<String>> {
        texts.iter().map(|text| self.clean(text)).collect()
    }
}

fn is_alpha(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

fn like_num(lower: &str) -> bool {
    let digits: String = lower.chars().filter(|c| *c != ',' && *c != '.').collect();
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    NUMBER_WORDS.contains(&lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(&["study".to_string(), "task".to_string(), "test".to_string()])
    }

    #[test]
    fn lemmatizes_plurals() {
        let lem = RuleLemmatizer::default();
        assert_eq!(lem.lemma("studies"), "study");
        assert_eq!(lem.lemma("processes"), "process");
        assert_eq!(lem.lemma("tasks"), "task");
        assert_eq!(lem.lemma("children"), "child");
        assert_eq!(lem.lemma("stimuli"), "stimulus");
    }

    #[test]
    fn keeps_invariant_words() {
        let lem = RuleLemmatizer::default();
        assert_eq!(lem.lemma("analysis"), "analysis");
        assert_eq!(lem.lemma("bias"), "bias");
        assert_eq!(lem.lemma("previous"), "previous");
        assert_eq!(lem.lemma("class"), "class");
    }

    #[test]
    fn lemmatizes_regular_verb_forms() {
        let lem = RuleLemmatizer::default();
        let cases = [
            ("measured", "measure"),
            ("measuring", "measure"),
            ("increased", "increase"),
            ("increasing", "increase"),
            ("performed", "perform"),
            ("performing", "perform"),
            ("running", "run"),
            ("stopped", "stop"),
            ("activated", "activate"),
            ("required", "require"),
            ("enabled", "enable"),
            ("included", "include"),
            ("changed", "change"),
            ("combined", "combine"),
            ("completed", "complete"),
            ("continued", "continue"),
            ("reduced", "reduce"),
            ("studying", "study"),
            ("studied", "study"),
            ("naming", "name"),
            ("adding", "add"),
            ("impaired", "impair"),
            ("monitored", "monitor"),
            ("inhibited", "inhibit"),
            ("focused", "focus"),
        ];
        for (word, lemma) in cases {
            assert_eq!(lem.lemma(word), lemma, "lemma of {word}");
        }
    }

    #[test]
    fn leaves_ing_and_ed_nouns_alone() {
        let lem = RuleLemmatizer::default();
        for word in ["during", "morning", "string", "thing", "speed", "need", "hundred", "sibling"] {
            assert_eq!(lem.lemma(word), word);
        }
    }

    #[test]
    fn verb_forms_share_a_vocabulary_entry() {
        let p = preprocessor();
        let cleaned = p.clean(
            "Participants measured responses, measuring inhibition; reaction times increased while performing studies",
        );
        assert_eq!(
            cleaned,
            vec![
                "participant", "measure", "response", "measure", "inhibition", "reaction", "time", "increase",
                "perform", "study"
            ]
        );
    }

    #[test]
    fn drops_punctuation_numbers_and_stop_words() {
        let p = preprocessor();
        let cleaned = p.clean("The Stroop test measured 120 participants, in three sessions (2019).");
        assert!(cleaned.contains(&"stroop".to_string()));
        assert!(cleaned.contains(&"participant".to_string()));
        assert!(cleaned.contains(&"session".to_string()));
        assert!(!cleaned.iter().any(|w| w == "the" || w == "test" || w == "three"));
        assert!(!cleaned.iter().any(|w| w.chars().any(|c| !c.is_alphabetic())));
    }

    #[test]
    fn stop_check_uses_surface_form() {
        // "tasks" is not itself a stop word; its lemma is removed later by the dictionary.
        let p = preprocessor();
        assert_eq!(p.clean("tasks"), vec!["task"]);
    }

    #[test]
    fn splits_hyphens_and_clitics() {
        let p = preprocessor();
        let cleaned = p.clean("prefrontal-cortex inhibition's latencies");
        assert_eq!(cleaned, vec!["prefrontal", "cortex", "inhibition", "latency"]);
    }

    #[test]
    fn number_like_tokens() {
        assert!(like_num("1,000"));
        assert!(like_num("twenty"));
        assert!(!like_num("memory"));
    }
}
