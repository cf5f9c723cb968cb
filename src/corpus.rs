
// imports
use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};


// defines the behavior needed for tokenizing a corpus
pub trait Tokenizer {
    fn tokenize(text: &str) -> Vec<String>;
}

/// Lower cases, keeps only ascii letters and spaces, then splits on whitespace.
pub struct LetterTokenizer;

impl Tokenizer for LetterTokenizer {
    fn tokenize(text: &str) -> Vec<String> {
        let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ')
        .collect();

        cleaned.split_whitespace().map(|x| x.to_string()).collect()
    }
}

// all texts are joined into one token stream, the window is allowed to cross text boundaries
pub fn tokenize_texts<T: Tokenizer, S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    texts.iter().flat_map(|text| T::tokenize(text.as_ref())).collect()
}

pub fn read_lines(file_path: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let f = File::open(file_path).map_err(|e| format!("cannot open corpus file {}: {}", file_path, e))?;
    let lines = io::BufReader::new(f).lines().collect::<Result<Vec<String>, io::Error>>()?;
    Ok(lines)
}


#[derive(Clone, Debug)]
pub struct Vocab {
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
}

impl Vocab {

    /// Builds the vocabulary once from the token stream.
    ///
    /// Indices follow the order in which tokens first appear. Tokens seen fewer than
    /// `min_count` times are left out and the remaining ones are indexed densely.
    pub fn build(tokens: &[String], min_count: usize) -> Vocab {

        // count occurrences and remember the order of first appearance
        let mut token2count: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for tok in tokens {
            let val = token2count.entry(tok.as_str()).or_insert_with(|| {
                order.push(tok.as_str());
                0
            });
            *val += 1;
        }

        let i2t: Vec<String> = order
        .into_iter()
        .filter(|tok| token2count[tok] >= min_count)
        .map(|tok| tok.to_owned())
        .collect();

        let t2i = i2t.iter().enumerate().map(|(i, tok)| (tok.to_owned(), i)).collect();

        if i2t.len() < token2count.len() {
            println!("using {} tokens out of {} (min_count = {})", i2t.len(), token2count.len(), min_count);
        }

        Self {
            t2i,
            i2t
        }
    }

    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2t.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.t2i.get(token).copied()
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.i2t.get(index).map(|x| x.as_str())
    }

    pub fn tokens(&self) -> &[String] {
        &self.i2t
    }

    pub fn to_index_map(&self) -> HashMap<String, usize> {
        self.t2i.clone()
    }
}


pub fn build_training_pairs(tokens: &[String], window_size: usize, vocab: &Vocab) -> Vec<(usize, usize)> {

    // every position is a target, every non zero offset within the window that stays inside
    // the sequence is a context. pairs touching a token outside the vocabulary are dropped.
    let n = tokens.len() as i64;
    let window = window_size as i64;
    let mut pairs = Vec::new();

    for i in 0..n {

        let target = match vocab.index_of(&tokens[i as usize]) {
            Some(target) => target,
            None => continue
        };

        for offset in -window..=window {

            let j = i + offset;
            if offset == 0 || j < 0 || j >= n { continue }

            if let Some(context) = vocab.index_of(&tokens[j as usize]) {
                pairs.push((target, context));
            }
        }
    }

    pairs
}
