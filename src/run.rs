

use crate::config::{Config, RunParams, Source};
use crate::corpus::{self, LetterTokenizer, Vocab};
use crate::files_handling;
use crate::news::NewsClient;
use crate::similarity::Similarity;
use crate::train::{Sweep, SweepOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::error::Error;
use std::time::Instant;

// with a window of one this gives the six pairs of the classic toy example
pub const TOY_CORPUS: &str = "I like deep learning";

pub struct RunOutput {
    pub vocab: Vocab,
    pub best: SweepOutcome,
}

pub struct Run {}

impl Run {

    // runs the main procedure:
    // -> configuration of arguments
    // -> gathering texts and building the vocabulary
    // -> training (one run per sweep combination)
    // -> reporting, saving and querying the best embeddings

    pub fn run() -> Result<(), Box<dyn Error>> {

        println!("entering program...");
        let args: Vec<String> = env::args().collect();

        println!("building parameters...");
        let params = Config::new(&args)?.get_params();
        println!("{}", params);

        Run::run_with(&params)?;
        Ok(())
    }

    pub fn run_with(params: &RunParams) -> Result<RunOutput, Box<dyn Error>> {

        let my_time = Instant::now();
        let texts = Run::gather_texts(params)?;
        println!("gathered {} texts", texts.len());

        let tokens = corpus::tokenize_texts::<LetterTokenizer, _>(&texts);
        if tokens.is_empty() {
            return Err("no words extracted from the texts. Training aborted.".into());
        }

        let vocab = Vocab::build(&tokens, params.train.min_count);
        if vocab.is_empty() {
            return Err(format!("no token appears at least {} times. Training aborted.", params.train.min_count).into());
        }
        println!("{} tokens, vocabulary of {}", tokens.len(), vocab.len());

        let mut rng = match params.train.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy()
        };

        println!("starting training part...");
        let sweep = Sweep::run(&tokens, &vocab, &params.train, &mut rng)?;
        let best = sweep.into_best().ok_or("the sweep produced no model")?;
        println!("finished training, best window_size {} and embedding_dim {} with loss {}, took {} seconds ...",
            best.window_size, best.embedding_dim, best.final_loss(), my_time.elapsed().as_secs());

        let output = RunOutput { vocab, best };
        Run::report(&output, params)?;
        Ok(output)
    }

    fn gather_texts(params: &RunParams) -> Result<Vec<String>, Box<dyn Error>> {

        match &params.source {
            Source::News => {
                let news = params.news.as_ref().ok_or("news source without news parameters")?;
                let client = NewsClient::new(&news.endpoint, &news.api_key, news.timeout);
                client.fetch_titles(&news.query, news.page_size)
            },
            Source::File(corpus_file) => corpus::read_lines(corpus_file),
            Source::Toy => Ok(vec![TOY_CORPUS.to_string()])
        }
    }

    fn report(output: &RunOutput, params: &RunParams) -> Result<(), Box<dyn Error>> {

        let model = output.best.trainer.model();

        // the learned representation of token i is row i of w1
        if params.print_embeddings {
            for (i, token) in output.vocab.tokens().iter().enumerate() {
                println!("{}: {}", token, model.embedding(i));
            }
        }

        if let Some(output_dir) = &params.output_dir {
            files_handling::save_output(output_dir, "vecs", &model.embeddings())?;
            files_handling::save_output(output_dir, "words", &output.vocab.to_index_map())?;
            println!("saved vecs.npy and words.txt to {}", output_dir);
        }

        if !params.query_words.is_empty() {
            let sim_obj = Similarity::new(&model.embeddings(), output.vocab.to_index_map())?;
            for word in &params.query_words {
                match sim_obj.most_similar_to_word(word, params.top_k) {
                    Ok(similar) => {
                        println!("searching {} most similar words to {}", params.top_k, word);
                        for (i, (similar_token, score)) in similar.iter().enumerate() {
                            println!("{} : {} ? {} = {}", i, word, similar_token, score);
                        }
                    },
                    Err(e) => eprintln!("{}", e)
                }
            }
        }

        Ok(())
    }
}
