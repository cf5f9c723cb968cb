
mod run;
mod config;
mod corpus;
mod model;
mod train;
mod news;
mod similarity;
mod files_handling;

pub use run::{Run, RunOutput, TOY_CORPUS};
pub use config::{Config, RunParams, TrainParams, NewsParams, Source};
pub use corpus::{Tokenizer, LetterTokenizer, Vocab, build_training_pairs, tokenize_texts};
pub use model::{SkipGram, Gradients};
pub use train::{Train, Sweep, SweepOutcome};
pub use news::{NewsClient, parse_titles};
pub use similarity::Similarity;
pub use files_handling::{read_input, save_output, ReadFile, SaveFile};
