

use crate::config::TrainParams;
use crate::corpus::{build_training_pairs, Vocab};
use crate::model::SkipGram;
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::time::Instant;


pub struct Train {
    model: SkipGram,
    losses: Vec<f32>, // average loss of every epoch
}

struct DisplayProgress {
    epochs: usize,
    log_every: usize,
}

impl DisplayProgress {

    fn new(epochs: usize, log_every: usize) -> Self {
        Self {
            epochs,
            log_every
        }
    }

    // the last epoch is always shown
    fn report(&self, epoch: usize, avg_loss: f32) {
        if (epoch + 1) % self.log_every == 0 || epoch + 1 == self.epochs {
            println!("Epoch {}/{}, Loss: {}", epoch + 1, self.epochs, avg_loss);
        }
    }
}

impl Train {

    pub fn model(&self) -> &SkipGram {
        &self.model
    }

    pub fn into_model(self) -> SkipGram {
        self.model
    }

    pub fn losses(&self) -> &[f32] {
        &self.losses
    }

    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    pub fn embedding_dim(&self) -> usize {
        self.model.embedding_dim()
    }

    fn do_epoch<R: Rng + ?Sized>(&mut self,
            order: &mut [usize],
            pairs: &[(usize, usize)],
            learning_rate: f32,
            shuffle: bool,
            rng: &mut R,
        ) -> f32 {

            if shuffle {
                order.shuffle(rng);
            }

            let mut total_loss = 0.0;
            for &p in order.iter() {
                let (target, context) = pairs[p];
                total_loss += self.model.step(target, context, learning_rate);
            }

            total_loss / pairs.len() as f32
    }

    /// Trains a fresh model on index pairs over a vocabulary of `vocab_size` tokens with the
    /// given embedding size. An empty vocabulary or an empty pair set aborts the run.
    pub fn run<R: Rng + ?Sized>(pairs: &[(usize, usize)],
            vocab_size: usize,
            embedding_dim: usize,
            train_params: &TrainParams,
            rng: &mut R,
        ) -> Result<Train, Box<dyn Error>> {

        if vocab_size == 0 {
            return Err("vocabulary is empty. Training aborted.".into());
        }
        if pairs.is_empty() {
            return Err("no training pairs generated. Training aborted.".into());
        }
        if train_params.epochs == 0 {
            return Err("epochs should be at least 1. Training aborted.".into());
        }
        if train_params.log_every == 0 {
            return Err("log_every should be at least 1. Training aborted.".into());
        }
        if let Some((target, context)) = pairs.iter().find(|(t, c)| *t >= vocab_size || *c >= vocab_size) {
            return Err(format!("pair ({}, {}) is outside a vocabulary of {} tokens", target, context, vocab_size).into());
        }

        let mut trainer = Train {
            model: SkipGram::new(vocab_size, embedding_dim, rng),
            losses: Vec::with_capacity(train_params.epochs)
        };

        let progress = DisplayProgress::new(train_params.epochs, train_params.log_every);
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        let my_time = Instant::now();

        for epoch in 0..train_params.epochs {
            let avg_loss = trainer.do_epoch(&mut order, pairs, train_params.learning_rate, train_params.shuffle, rng);
            trainer.losses.push(avg_loss);
            progress.report(epoch, avg_loss);
        }

        println!("finished {} epochs on {} pairs, took {} ms...", train_params.epochs, pairs.len(), my_time.elapsed().as_millis());
        Ok(trainer)
    }
}


pub struct SweepOutcome {
    pub window_size: usize,
    pub embedding_dim: usize,
    pub n_pairs: usize,
    pub trainer: Train,
}

impl SweepOutcome {
    pub fn final_loss(&self) -> f32 {
        self.trainer.final_loss().unwrap_or(f32::INFINITY)
    }
}

pub struct Sweep {
    outcomes: Vec<SweepOutcome>,
}

impl Sweep {

    /// Trains one model per (window size, embedding dim) combination.
    ///
    /// A combination whose run aborts is reported and skipped. The sweep fails only when every
    /// combination aborted.
    pub fn run<R: Rng + ?Sized>(tokens: &[String], vocab: &Vocab, train_params: &TrainParams, rng: &mut R) -> Result<Sweep, Box<dyn Error>> {

        let mut outcomes = Vec::new();
        let mut last_error: Option<Box<dyn Error>> = None;

        for &window_size in &train_params.window_sizes {

            let pairs = build_training_pairs(tokens, window_size, vocab);

            for &embedding_dim in &train_params.embedding_dims {

                println!("training with window_size {} and embedding_dim {} on {} pairs...", window_size, embedding_dim, pairs.len());
                match Train::run(&pairs, vocab.len(), embedding_dim, train_params, rng) {
                    Ok(trainer) => outcomes.push(SweepOutcome {
                        window_size,
                        embedding_dim,
                        n_pairs: pairs.len(),
                        trainer
                    }),
                    Err(e) => {
                        eprintln!("window_size {}, embedding_dim {}: {}", window_size, embedding_dim, e);
                        last_error = Some(e);
                    }
                }
            }
        }

        if outcomes.is_empty() {
            return Err(last_error.unwrap_or_else(|| "nothing to train, the sweep is empty".into()));
        }

        let sweep = Sweep { outcomes };
        if sweep.outcomes.len() > 1 {
            sweep.print_summary();
        }
        Ok(sweep)
    }

    pub fn outcomes(&self) -> &[SweepOutcome] {
        &self.outcomes
    }

    pub fn best(&self) -> Option<&SweepOutcome> {
        self.outcomes.iter().min_by(|a, b| a.final_loss().total_cmp(&b.final_loss()))
    }

    pub fn into_best(self) -> Option<SweepOutcome> {
        self.outcomes.into_iter().min_by(|a, b| a.final_loss().total_cmp(&b.final_loss()))
    }

    fn print_summary(&self) {
        println!("sweep summary:");
        println!("{:>12} {:>14} {:>8} {:>12}", "window_size", "embedding_dim", "pairs", "final_loss");
        for outcome in &self.outcomes {
            println!("{:>12} {:>14} {:>8} {:>12.6}", outcome.window_size, outcome.embedding_dim, outcome.n_pairs, outcome.final_loss());
        }
    }
}
