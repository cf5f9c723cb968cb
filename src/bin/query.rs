
use std::{collections::HashMap, env, error::Error, fs::File, io::{self, BufRead}, process};
use ndarray::Array2;
use skipgram_trainer::{read_input, Similarity};


// checks on trained vectors saved by the trainer:
// the K most similar words to a given word,
// the K most similar words to an analogy of three words.
// treated as binary executable so it can be ran independently from main

const K: usize = 10;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {

    // arguments to this executable should be:
    // a letter selector: "a" for analogies, "b" for word similarity
    // path to input based on selector (quads or singles)
    // path to trained vecs (npy)
    // path to tokens (txt)
    // example: ... a Input/analogies.txt Output/vecs.npy Output/words.txt
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        return Err("usage: query <a|b> <inputs file> <vecs.npy> <words.txt>".into());
    }
    let selector = args[1].as_str();
    if !["a", "b"].contains(&selector) {
        return Err(format!("unrecognized pattern in first argument {}", selector).into());
    }

    // read inputs file, blank lines are skipped
    let in_file = File::open(&args[2]).map_err(|e| format!("could not open input file {}: {}", &args[2], e))?;
    let lines = io::BufReader::new(in_file)
    .lines()
    .collect::<Result<Vec<String>, io::Error>>()?
    .into_iter()
    .map(|line| line.trim().to_lowercase())
    .filter(|line| !line.is_empty())
    .collect::<Vec<String>>();

    // read in trained vecs and tokens
    let w = read_input::<Array2<f32>>(&args[3])?;
    let t2i = read_input::<HashMap<String, usize>>(&args[4])?;
    let sim_obj = Similarity::new(&w, t2i)?;

    if selector == "a" {
        // each line holds a quartet separated by spaces, for example:
        // king queen man woman
        let inputs = lines
        .iter()
        .map(|line| line.split_whitespace().map(|x| x.to_string()).collect::<Vec<String>>())
        .collect::<Vec<Vec<String>>>();
        run_analogies(&inputs, K, &sim_obj)
    } else {
        // each line holds one token
        run_similarity(&lines, K, &sim_obj)
    }
}


fn run_analogies(inputs: &[Vec<String>], k: usize, similarity_object: &Similarity) -> Result<(), Box<dyn Error>> {

    // a is to b as c is to ?, translates to b - a + c, in hope that it matches d

    for input in inputs {

        if input.len() != 4 {
            eprintln!("skipping '{}', expected 4 tokens", input.join(" "));
            continue;
        }

        let source = [input[0].as_str(), input[1].as_str(), input[2].as_str()];
        let target = input[3].as_str();

        let analogies = match similarity_object.extract_analogies(source, k) {
            Ok(analogies) => analogies,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        let mut found_target = false;
        for (i, (analogy, score)) in analogies.iter().enumerate() {
            println!("{} : {} - {} + {} ? {} = {}", i, source[1], source[0], source[2], analogy, score);
            if analogy == target {
                found_target = true;
                println!("found target '{}' analogy in place {}", target, 1 + i);
            }
        }

        if !found_target {
            println!("target '{}' was not found within the first {} analogies", target, k);
        }

        println!();
    }
    Ok(())
}

fn run_similarity(inputs: &[String], k: usize, similarity_object: &Similarity) -> Result<(), Box<dyn Error>> {

    // finding the k most similar words to each of the input tokens

    for token in inputs {

        println!("searching {} most similar words to {}", k, token);
        let similarities = match similarity_object.most_similar_to_word(token, k) {
            Ok(similarities) => similarities,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        for (i, (similar_token, score)) in similarities.iter().enumerate() {
            println!("{} : {} ? {} = {}", i, token, similar_token, score);
        }
        println!();
    }

    Ok(())
}
