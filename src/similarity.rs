
use std::{error::Error, collections::HashMap};
use ndarray::prelude::*;


pub struct Similarity {
    w: Array2<f32>,
    t2i: HashMap<String, usize>,
    i2t: HashMap<usize, String>
}

impl Similarity {

    pub fn new(w: &Array2<f32>, t2i: HashMap<String, usize>) -> Result<Similarity, Box<dyn Error>> {

        if w.dim().0 != t2i.len() {
            return Err(format!("inconsistent number of entries in w ({}) and tokens ({})", w.dim().0, t2i.len()).into());
        }

        // normalize w so each row has an l2 norm of 1, dot products become cosine similarities
        let mut w = w.to_owned();
        for mut row in w.axis_iter_mut(Axis(0)) {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|a| a / norm);
            }
        }

        let mut i2t: HashMap<usize, String> = HashMap::new();
        for (t, i) in &t2i {
            if *i >= w.dim().0 {
                return Err(format!("token {} has index {} outside of w", t, i).into());
            }
            i2t.entry(*i).or_insert(t.to_owned());
        }
        if i2t.len() != t2i.len() {
            return Err("several tokens share the same index".into());
        }

        Ok(
            Self {
                w,
                t2i,
                i2t
            }
        )
    }

    pub fn extract_vec_from_word(&self, token: &str) -> Result<Array1<f32>, Box<dyn Error>> {
        match self.t2i.get(token) {
            Some(i) => Ok(self.w.slice(s![*i, ..]).to_owned()),
            None => Err(format!("token: {} is not in the vocabulary", token).into())
        }
    }

    pub fn extract_analogy_vec(&self, inputs: [&str; 3]) -> Result<Array1<f32>, Box<dyn Error>> {

        let a = self.extract_vec_from_word(inputs[0])?;
        let b = self.extract_vec_from_word(inputs[1])?;
        let c = self.extract_vec_from_word(inputs[2])?;

        // a is to b as c is to ?, translates to b - a + c
        Ok(b - a + c)
    }

    pub fn extract_analogies(&self, inputs: [&str; 3], k: usize) -> Result<Vec<(String, f32)>, Box<dyn Error>> {
        let analogy = self.extract_analogy_vec(inputs)?;
        self.find_k_most_similar(&analogy, k)
    }

    /// The `k` tokens whose vectors have the highest cosine similarity with `vec`, best first.
    pub fn find_k_most_similar(&self, vec: &Array1<f32>, k: usize) -> Result<Vec<(String, f32)>, Box<dyn Error>> {
        self.rank(vec, k, None)
    }

    /// Like [`Similarity::find_k_most_similar`] for a known token, leaving the token itself out.
    pub fn most_similar_to_word(&self, token: &str, k: usize) -> Result<Vec<(String, f32)>, Box<dyn Error>> {
        let vec = self.extract_vec_from_word(token)?;
        self.rank(&vec, k, Some(self.t2i[token]))
    }

    fn rank(&self, vec: &Array1<f32>, k: usize, skip: Option<usize>) -> Result<Vec<(String, f32)>, Box<dyn Error>> {

        if vec.len() != self.w.dim().1 {
            return Err(format!("query vector has {} entries, embeddings have {}", vec.len(), self.w.dim().1).into());
        }

        let norm = vec.dot(vec).sqrt();
        let norm = if norm > 0.0 { norm } else { 1.0 };

        // multiply all vectors by the query vector
        let scores = self.w.dot(vec) / norm;
        let mut indexed_scores: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .collect();

        // sort by most similar in descending order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));

        // get k most similar tokens, the vocabulary may be smaller than k
        let sim_tokens = indexed_scores
        .into_iter()
        .take(k)
        .map(|(index, score)| (self.i2t[&index].to_owned(), score))
        .collect();

        Ok(sim_tokens)
    }

}


#[cfg(test)]
mod tests {

    use std::collections::HashMap;
    use crate::similarity::Similarity;
    use ndarray::{array, Array2};

    fn toy_similarity() -> Similarity {
        let w: Array2<f32> = array![
            [1.0, 0.0],
            [0.9, 0.1],
            [0.0, 2.0],
            [-1.0, 0.0]
        ];
        let t2i: HashMap<String, usize> = ["king", "queen", "apple", "pauper"]
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();
        Similarity::new(&w, t2i).unwrap()
    }

    #[test]
    fn identical_vector_ranks_first() {
        let sim_obj = toy_similarity();
        let vec = sim_obj.extract_vec_from_word("apple").unwrap();
        let similar = sim_obj.find_k_most_similar(&vec, 2).unwrap();
        assert_eq!(similar[0].0, "apple");
        assert!((similar[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(similar.len(), 2);
    }

    #[test]
    fn most_similar_to_word_excludes_the_word() {
        let sim_obj = toy_similarity();
        let similar = sim_obj.most_similar_to_word("king", 10).unwrap();
        let tokens: Vec<&str> = similar.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, vec!["queen", "apple", "pauper"]);
        assert!((similar[2].1 + 1.0).abs() < 1e-6);
    }

    #[test]
    fn analogy_combines_vectors() {
        let sim_obj = toy_similarity();
        // queen - king + pauper points away from king
        let analogies = sim_obj.extract_analogies(["king", "queen", "pauper"], 1).unwrap();
        assert_eq!(analogies[0].0, "pauper");
    }

    #[test]
    fn unknown_tokens_and_bad_shapes_are_errors() {
        let sim_obj = toy_similarity();
        assert!(sim_obj.extract_vec_from_word("prince").is_err());
        assert!(sim_obj.most_similar_to_word("prince", 3).is_err());
        assert!(sim_obj.find_k_most_similar(&array![1.0, 0.0, 0.0], 3).is_err());

        let w: Array2<f32> = Array2::zeros((2, 2));
        let mut t2i = HashMap::new();
        t2i.insert("only".to_string(), 0);
        assert!(Similarity::new(&w, t2i).is_err());
    }
}
