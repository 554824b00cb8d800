//! The MAP-Elites loop: seed the archive, evolve it, write the results.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument};

use crate::archive::{Archive, Placement};
use crate::config::MapElitesConfig;
use crate::error::{ConfigError, MapElitesError, Result};
use crate::events::{Event, EventSink, LogFile, TracingSink};
use crate::feature::FeatureDimension;
use crate::persist::{self, RunDirectory};
use crate::plot;
use crate::selector::Selector;
use crate::{Genome, MapElitesProblem};

/// Statistics collected during the evolution process
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Evolution iterations completed (seeding excluded)
    pub iterations: usize,
    pub num_solutions: usize,
    /// Best performance in the archive, per the objective
    pub best_fitness: Option<f64>,
    pub coverage: f64,
    /// Placements that filled or improved a cell
    pub improvements: usize,
    pub rejections: usize,
    pub discarded: usize,
}

/// Outcome of [`MapElites::run`].
#[derive(Clone, Debug)]
pub struct RunReport {
    pub statistics: Statistics,
    /// Directory holding the persisted artifacts, when output is configured
    pub run_directory: Option<RunDirectory>,
}

pub struct MapElites<P: MapElitesProblem, S: EventSink = TracingSink> {
    problem: P,
    dimensions: Vec<FeatureDimension>,
    archive: Archive,
    selector: Selector,
    config: MapElitesConfig,
    rng: StdRng,
    sink: S,
    log: Option<LogFile>,
    stats: Statistics,
}

impl<P: MapElitesProblem> MapElites<P> {
    /// Create a new Map-Elites instance with default configuration
    pub fn new(problem: P) -> Result<Self> {
        Self::with_config(problem, MapElitesConfig::default())
    }

    /// Create a new Map-Elites instance with custom configuration
    pub fn with_config(problem: P, config: MapElitesConfig) -> Result<Self> {
        Self::with_sink(problem, config, TracingSink)
    }
}

impl<P: MapElitesProblem, S: EventSink> MapElites<P, S> {
    /// Create an instance reporting to `sink`.
    ///
    /// The configuration and the problem's feature dimensions are validated
    /// here, so a misconfigured run fails before any evaluation.
    pub fn with_sink(problem: P, config: MapElitesConfig, sink: S) -> Result<Self> {
        config.validate()?;

        let dimensions = problem.generate_feature_dimensions()?;
        if dimensions.is_empty() {
            return Err(ConfigError::NoFeatureDimensions.into());
        }

        let shape: Vec<usize> = dimensions.iter().map(FeatureDimension::len).collect();
        let archive = Archive::new(shape, config.objective())?;
        let selector = Selector::new(config.max_selection_attempts);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            shape = ?archive.shape(),
            objective = ?archive.objective(),
            mutation = config.mutation.name(),
            crossover = config.crossover.name(),
            "Configuration completed."
        );

        Ok(Self {
            problem,
            dimensions,
            archive,
            selector,
            config,
            rng,
            sink,
            log: None,
            stats: Statistics::default(),
        })
    }

    /// Seed, evolve and finalize.
    pub fn run(&mut self) -> Result<RunReport> {
        let run_directory = match &self.config.output {
            Some(output) => Some(RunDirectory::create(&output.directory)?),
            None => None,
        };
        if let Some(directory) = &run_directory {
            let path = directory.join(persist::LOG_FILE);
            let log = LogFile::create(&path).map_err(|err| MapElitesError::io(path, err))?;
            self.log = Some(log);
        }

        self.emit(Event::RunStarted {
            shape: self.archive.shape().to_vec(),
            iterations: self.config.iterations,
        });

        self.seed_archive()?;
        self.evolve()?;
        self.finalize(run_directory.as_ref())?;

        Ok(RunReport {
            statistics: self.stats.clone(),
            run_directory,
        })
    }

    /// Place `initial_population` random solutions.
    #[instrument(level = "debug", skip(self), fields(count = self.config.initial_population))]
    pub fn seed_archive(&mut self) -> Result<()> {
        info!("Generate initial population");
        for _ in 0..self.config.initial_population {
            let genome = self.problem.generate_random_solution(&mut self.rng);
            self.place(genome)?;
        }

        self.emit(Event::Seeded {
            count: self.config.initial_population,
            occupied: self.archive.occupied(),
        });
        Ok(())
    }

    /// Run the configured number of iterations, polling the stopping
    /// criteria before each one.
    pub fn evolve(&mut self) -> Result<()> {
        for index in 0..self.config.iterations {
            self.emit(Event::Iteration { index });
            if self.problem.stopping_criteria(&self.stats) {
                self.emit(Event::Stopped { iteration: index });
                break;
            }

            self.step()?;
            self.stats.iterations += 1;

            if self.config.log_interval > 0 && self.stats.iterations % self.config.log_interval == 0 {
                info!(
                    iteration = self.stats.iterations,
                    occupied = self.archive.occupied(),
                    coverage = self.stats.coverage,
                    best = ?self.stats.best_fitness,
                    "Iterations completed"
                );
            }
        }
        Ok(())
    }

    /// Select one elite, mutate it and place the offspring.
    pub fn step(&mut self) -> Result<Placement> {
        let parent = self
            .selector
            .sample(&self.archive, 1, &mut self.rng)?
            .pop()
            .ok_or(MapElitesError::SelectionExhausted {
                requested: 1,
                occupied: self.archive.occupied(),
            })?;

        let offspring = self
            .config
            .mutation
            .mutate(&parent, &mut self.rng)
            .into_iter()
            .next()
            .unwrap_or(parent);

        self.place(offspring)
    }

    /// Select two distinct elites and cross them over with the configured
    /// operator. The offspring are returned, not placed.
    pub fn recombine(&mut self) -> Result<Vec<Genome>> {
        let parents = self.selector.sample(&self.archive, 2, &mut self.rng)?;
        Ok(self.config.crossover.crossover(&parents[0], &parents[1], &mut self.rng))
    }

    /// Compute the cell and performance of `genome` and offer it to the
    /// archive.
    pub fn place(&mut self, genome: Genome) -> Result<Placement> {
        let cell = self.problem.map_x_to_b(&genome, &self.dimensions)?;
        let performance = self.problem.performance_measure(&genome);
        let placement = self.archive.place(&cell, genome.clone(), performance)?;

        let event = match placement {
            Placement::Placed { replaced } => {
                self.stats.improvements += 1;
                self.stats.num_solutions = self.archive.occupied();
                self.stats.coverage = self.archive.coverage();
                let objective = self.archive.objective();
                if self
                    .stats
                    .best_fitness
                    .map_or(true, |best| objective.better(performance, best))
                {
                    self.stats.best_fitness = Some(performance);
                }
                Event::Placed {
                    genome,
                    cell,
                    performance,
                    replaced,
                }
            }
            Placement::Rejected { incumbent } => {
                self.stats.rejections += 1;
                Event::Rejected {
                    genome,
                    cell,
                    performance,
                    incumbent,
                }
            }
            Placement::Discarded => {
                self.stats.discarded += 1;
                Event::Discarded {
                    genome,
                    cell,
                    performance,
                }
            }
        };
        self.emit(event);

        Ok(placement)
    }

    /// Close the event log and, when a run directory is given, write the
    /// archive grids, the configuration snapshot and the heatmap into it.
    pub fn finalize(&mut self, run_directory: Option<&RunDirectory>) -> Result<()> {
        self.emit(Event::Finished {
            statistics: self.stats.clone(),
        });

        let flushed = self.sink.finish();
        if let Some(mut log) = self.log.take() {
            log.finish().map_err(|err| MapElitesError::io(log.path(), err))?;
        }
        if let Err(err) = flushed {
            tracing::error!(error = %err, "failed to flush event sink");
        }

        let Some(directory) = run_directory else {
            return Ok(());
        };

        directory.save_archive(&self.archive)?;
        directory.write_text(persist::CONFIG_FILE, &self.config.to_toml()?)?;

        let heatmap = self.config.output.as_ref().map_or(false, |output| output.heatmap);
        if heatmap {
            plot::render_heatmap(&self.archive, &self.dimensions, &directory.join(persist::HEATMAP_FILE))?;
        }

        info!(directory = ?directory.path(), "Results saved");
        Ok(())
    }

    fn emit(&mut self, event: Event) {
        self.sink.record(&event);
        if let Some(log) = self.log.as_mut() {
            log.record(&event);
        }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn dimensions(&self) -> &[FeatureDimension] {
        &self.dimensions
    }

    pub fn config(&self) -> &MapElitesConfig {
        &self.config
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get the current statistics
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }
}
