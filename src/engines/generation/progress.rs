use super::evolution_engine::ProgressCallback;
use super::population::PopulationStats;

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_genome_evaluated(&mut self, evaluated: usize, total: usize, score: i64) {
        (**self).on_genome_evaluated(evaluated, total, score);
    }

    fn on_generation_complete(&mut self, stats: &PopulationStats) {
        (**self).on_generation_complete(stats);
    }
}

/// Ignores all progress.
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_genome_evaluated(&mut self, _evaluated: usize, _total: usize, _score: i64) {}

    fn on_generation_complete(&mut self, _stats: &PopulationStats) {}
}

/// Reports progress through the `log` facade.
pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::info!("Generation {:02} starting", generation);
    }

    fn on_genome_evaluated(&mut self, evaluated: usize, total: usize, score: i64) {
        log::debug!("  Rated {}/{}: {}", evaluated, total, score);
    }

    fn on_generation_complete(&mut self, stats: &PopulationStats) {
        log::info!(
            "Generation {:02} complete. Average: {:.2}, best: {} ({}), worst: {}",
            stats.generation,
            stats.average_fitness,
            stats.best_fitness,
            stats.best_genome,
            stats.worst_fitness
        );
    }
}

/// Prints a stats block per generation for interactive sessions.
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        println!("GENERATION {:02}", generation);
        println!("=============");
    }

    fn on_genome_evaluated(&mut self, evaluated: usize, total: usize, _score: i64) {
        if evaluated == total {
            println!("Rated {}/{}", evaluated, total);
        }
    }

    fn on_generation_complete(&mut self, stats: &PopulationStats) {
        println!("Avg. Fitness: {:.2}", stats.average_fitness);
        println!("Best: {} ({})", stats.best_genome, stats.best_fitness);
        println!("Worst fitness: {}", stats.worst_fitness);
        println!();
    }
}

// For running a session on a worker thread
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenomeEvaluated { evaluated: usize, total: usize, score: i64 },
    GenerationComplete(PopulationStats),
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_genome_evaluated(&mut self, evaluated: usize, total: usize, score: i64) {
        let _ = self.sender.send(ProgressMessage::GenomeEvaluated {
            evaluated,
            total,
            score,
        });
    }

    fn on_generation_complete(&mut self, stats: &PopulationStats) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete(stats.clone()));
    }
}
